//! Error types for request building, response decoding and expectations.
//!
//! # Design
//! `FormatError` is kept separate from `SpecError` because media types are
//! parsed lazily and the parse result is memoized on `ResponseSpec`; it has
//! to be `Clone`. Transport failures are boxed and passed through untouched.
//! Expectation failures are collected per response and only become an error
//! when the caller asks for verification.

use std::fmt;

use thiserror::Error;

use crate::expect::Failure;

/// A media type string that does not follow `type "/" subtype *(";" name "=" value)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid media type {input:?}: {reason}")]
pub struct FormatError {
    pub input: String,
    pub reason: &'static str,
}

impl FormatError {
    pub(crate) fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Opaque failure reported by a `Transport` implementation.
#[derive(Debug)]
pub struct TransportError(Box<dyn std::error::Error + Send + Sync>);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for TransportError {
    fn from(source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self(source)
    }
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }

    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.0
    }
}

/// Errors surfaced by `RequestSpec`, `ResponseSpec` and `ResponseExpectations`.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A declared or received `Content-Type` could not be parsed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The charset named by a content type or config is not one we can transcode.
    #[error("unsupported charset {0:?}")]
    UnsupportedCharset(String),

    /// The transport failed to deliver the request or read the response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// One or more registered expectations did not hold.
    #[error("{}", join_messages(.0))]
    ExpectationsFailed(Vec<Failure>),
}

fn join_messages(failures: &[Failure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
