//! Expectations over a received response.
//!
//! # Design
//! An expectation pairs a `Selector` (which value of the response to look
//! at) with an `Expected` (a literal or a `Matcher`). Literals are just
//! `EqualTo` matchers tagged as literal, so every failure message is built
//! from `Matcher::describe`.
//!
//! `ResponseExpectations::evaluate_all` runs every registered expectation and
//! collects all failures rather than stopping at the first one. Errors raised
//! while resolving an actual value (a malformed `Content-Type` when decoding
//! the body, an unknown charset) abort evaluation immediately.
//!
//! Content-type expectations compare against the raw header text. Nothing is
//! parsed or normalized, so parameter order and spacing matter.

use std::fmt;

use thiserror::Error;
use tracing::{debug, trace};

use crate::error::SpecError;
use crate::matchers::{
    equal_to, quoted, AllOf, AnyOf, EqualTo, Is, Matcher, Not, Predicate, TextMatcher,
};
use crate::response::ResponseSpec;

/// Which part of the response an expectation inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    StatusCode,
    ContentType,
    Header(String),
    Body,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::StatusCode => f.write_str("status code"),
            Selector::ContentType => f.write_str("content-type"),
            Selector::Header(name) => write!(f, "header {}", quoted(name)),
            Selector::Body => f.write_str("body"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    Literal,
    Predicate,
}

/// The expected side of an expectation.
pub struct Expected<T: ?Sized> {
    matcher: Box<dyn Matcher<T>>,
    kind: ExpectedKind,
}

impl<T: ?Sized> Expected<T> {
    pub fn predicate(matcher: impl Matcher<T> + 'static) -> Self {
        Self {
            matcher: Box::new(matcher),
            kind: ExpectedKind::Predicate,
        }
    }

    pub fn kind(&self) -> ExpectedKind {
        self.kind
    }

    pub fn matches(&self, actual: &T) -> bool {
        self.matcher.matches(actual)
    }

    pub fn describe(&self) -> String {
        self.matcher.describe()
    }
}

impl Expected<str> {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            matcher: Box::new(equal_to(value.into())),
            kind: ExpectedKind::Literal,
        }
    }
}

impl Expected<u16> {
    pub fn literal(value: u16) -> Self {
        Self {
            matcher: Box::new(equal_to(value)),
            kind: ExpectedKind::Literal,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Expected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expected")
            .field("kind", &self.kind)
            .field("description", &self.describe())
            .finish()
    }
}

impl From<&str> for Expected<str> {
    fn from(value: &str) -> Self {
        Expected::<str>::literal(value)
    }
}

impl From<String> for Expected<str> {
    fn from(value: String) -> Self {
        Expected::<str>::literal(value)
    }
}

impl From<u16> for Expected<u16> {
    fn from(value: u16) -> Self {
        Expected::<u16>::literal(value)
    }
}

// One impl per matcher type rather than a blanket over `Matcher`, so that
// integer literals still infer as `u16` in `status_code(404)`.
macro_rules! predicate_from {
    ($($matcher:ty => [$($param:ident),*]),* $(,)?) => {$(
        impl<T: ?Sized + 'static, $($param: 'static),*> From<$matcher> for Expected<T>
        where
            $matcher: Matcher<T>,
        {
            fn from(matcher: $matcher) -> Self {
                Expected::predicate(matcher)
            }
        }
    )*};
}

predicate_from!(
    EqualTo<V> => [V],
    Is<M> => [M],
    Not<M> => [M],
    AnyOf<A, B> => [A, B],
    AllOf<A, B> => [A, B],
    Predicate<F> => [F],
);

impl From<TextMatcher> for Expected<str> {
    fn from(matcher: TextMatcher) -> Self {
        Expected::predicate(matcher)
    }
}

impl<T: ?Sized + 'static> From<Box<dyn Matcher<T>>> for Expected<T> {
    fn from(matcher: Box<dyn Matcher<T>>) -> Self {
        Self {
            matcher,
            kind: ExpectedKind::Predicate,
        }
    }
}

/// One unmet expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    pub selector: Selector,
    pub expected: String,
    pub actual: String,
    pub message: String,
}

#[derive(Debug)]
enum Check {
    Status(Expected<u16>),
    Text(Expected<str>),
}

#[derive(Debug)]
pub struct Expectation {
    selector: Selector,
    check: Check,
}

impl Expectation {
    pub fn new(selector: Selector, expected: impl Into<Expected<str>>) -> Self {
        Self {
            selector,
            check: Check::Text(expected.into()),
        }
    }

    pub fn status_code(expected: impl Into<Expected<u16>>) -> Self {
        Self {
            selector: Selector::StatusCode,
            check: Check::Status(expected.into()),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Evaluate against `response`; `Ok(None)` when the expectation holds.
    pub fn evaluate(&self, response: &ResponseSpec) -> Result<Option<Failure>, SpecError> {
        let (expected, actual, holds) = match &self.check {
            Check::Status(expected) => {
                let status = response.status();
                (expected.describe(), Some(status.to_string()), expected.matches(&status))
            }
            Check::Text(expected) => {
                let actual = match &self.selector {
                    Selector::StatusCode => Some(response.status().to_string()),
                    Selector::ContentType => {
                        Some(response.header("content-type").unwrap_or_default().to_string())
                    }
                    Selector::Header(name) => response.header(name).map(str::to_string),
                    Selector::Body => Some(response.body_as_text()?.to_string()),
                };
                let holds = actual.as_deref().is_some_and(|a| expected.matches(a));
                (expected.describe(), actual, holds)
            }
        };

        if holds {
            trace!(selector = %self.selector, expected = %expected, "expectation holds");
            return Ok(None);
        }

        let failure = self.failure(expected, actual.as_deref());
        debug!(
            selector = %failure.selector,
            expected = %failure.expected,
            actual = %failure.actual,
            "expectation failed"
        );
        Ok(Some(failure))
    }

    fn failure(&self, expected: String, actual: Option<&str>) -> Failure {
        let (actual, message) = match &self.selector {
            Selector::StatusCode => {
                let actual = format!("<{}>", actual.unwrap_or_default());
                let message = format!(
                    "Expected status code {expected} doesn't match actual status code {actual}."
                );
                (actual, message)
            }
            Selector::ContentType => {
                let actual = quoted(actual.unwrap_or_default());
                let message = format!(
                    "Expected content-type {expected} doesn't match actual content-type {actual}."
                );
                (actual, message)
            }
            Selector::Header(name) => match actual {
                Some(actual) => {
                    let actual = quoted(actual);
                    let message = format!(
                        "Expected header {} was not {expected}, was {actual}.",
                        quoted(name)
                    );
                    (actual, message)
                }
                None => {
                    let message = format!(
                        "Expected header {} was not {expected}, header was not present.",
                        quoted(name)
                    );
                    ("not present".to_string(), message)
                }
            },
            Selector::Body => {
                let actual = actual.unwrap_or_default().to_string();
                let message = format!(
                    "Response body doesn't match expectation.\nExpected: {expected}\n  Actual: {actual}"
                );
                (actual, message)
            }
        };
        Failure {
            selector: self.selector.clone(),
            expected,
            actual,
            message,
        }
    }
}

/// An ordered set of expectations evaluated together against one response.
#[derive(Debug, Default)]
pub struct ResponseExpectations {
    expectations: Vec<Expectation>,
}

impl ResponseExpectations {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn expect(mut self, selector: Selector, expected: impl Into<Expected<str>>) -> Self {
        self.expectations.push(Expectation::new(selector, expected));
        self
    }

    #[must_use]
    pub fn status_code(mut self, expected: impl Into<Expected<u16>>) -> Self {
        self.expectations.push(Expectation::status_code(expected));
        self
    }

    #[must_use]
    pub fn content_type(self, expected: impl Into<Expected<str>>) -> Self {
        self.expect(Selector::ContentType, expected)
    }

    #[must_use]
    pub fn header(self, name: impl Into<String>, expected: impl Into<Expected<str>>) -> Self {
        self.expect(Selector::Header(name.into()), expected)
    }

    #[must_use]
    pub fn body(self, expected: impl Into<Expected<str>>) -> Self {
        self.expect(Selector::Body, expected)
    }

    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Evaluate every expectation in registration order and collect failures.
    pub fn evaluate_all(&self, response: &ResponseSpec) -> Result<Vec<Failure>, SpecError> {
        let mut failures = Vec::new();
        for expectation in &self.expectations {
            if let Some(failure) = expectation.evaluate(response)? {
                failures.push(failure);
            }
        }
        Ok(failures)
    }

    /// Like `evaluate_all`, but any failure becomes `SpecError::ExpectationsFailed`.
    pub fn verify(&self, response: &ResponseSpec) -> Result<(), SpecError> {
        let failures = self.evaluate_all(response)?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(SpecError::ExpectationsFailed(failures))
        }
    }
}

/// Fluent expectations bound to a response, created by `ResponseSpec::then`.
#[derive(Debug)]
pub struct Then<'a> {
    response: &'a ResponseSpec,
    expectations: ResponseExpectations,
}

impl<'a> Then<'a> {
    pub(crate) fn new(response: &'a ResponseSpec) -> Self {
        Self {
            response,
            expectations: ResponseExpectations::new(),
        }
    }

    #[must_use]
    pub fn status_code(mut self, expected: impl Into<Expected<u16>>) -> Self {
        self.expectations = self.expectations.status_code(expected);
        self
    }

    #[must_use]
    pub fn content_type(mut self, expected: impl Into<Expected<str>>) -> Self {
        self.expectations = self.expectations.content_type(expected);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, expected: impl Into<Expected<str>>) -> Self {
        self.expectations = self.expectations.header(name, expected);
        self
    }

    #[must_use]
    pub fn body(mut self, expected: impl Into<Expected<str>>) -> Self {
        self.expectations = self.expectations.body(expected);
        self
    }

    pub fn failures(&self) -> Result<Vec<Failure>, SpecError> {
        self.expectations.evaluate_all(self.response)
    }

    pub fn verify(self) -> Result<(), SpecError> {
        self.expectations.verify(self.response)
    }
}
