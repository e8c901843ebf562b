//! Request content negotiation and response assertions for HTTP exchanges.
//!
//! # Overview
//! Callers declare a request with `RequestSpec` (content type, body, charset
//! policy), execute it through any `Transport`, and check the resulting
//! `ResponseSpec` against literal or matcher-based expectations. The crate
//! never touches the network itself (host-does-IO pattern).
//!
//! # Design
//! - `EncoderConfig` decides which charset, if any, is appended to an
//!   outgoing `Content-Type`; `DecoderConfig` decides how a response body
//!   without a declared charset is decoded. Both are immutable and shared
//!   through `RestConfig`.
//! - `ResponseSpec` parses its content type and decodes its body lazily and
//!   at most once.
//! - `ResponseExpectations` evaluates every expectation and reports all
//!   failures together, like an assertion suite.

pub mod charset;
pub mod client;
pub mod config;
pub mod error;
pub mod expect;
pub mod http;
pub mod matchers;
pub mod media_type;
pub mod negotiation;
pub mod request;
pub mod response;
pub mod transport;

pub use charset::Charset;
pub use client::RestClient;
pub use config::{DecoderConfig, EncoderConfig, RestConfig};
pub use error::{FormatError, SpecError, TransportError};
pub use expect::{Expectation, Expected, ExpectedKind, Failure, ResponseExpectations, Selector, Then};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use matchers::Matcher;
pub use media_type::{ContentType, MediaType};
pub use negotiation::{resolve_body_charset, resolve_outgoing_content_type};
pub use request::{DeclaredContentType, RequestSpec};
pub use response::ResponseSpec;
pub use transport::Transport;
