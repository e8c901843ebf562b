//! The one place a request leaves the process.
//!
//! Nothing in this crate opens a connection. A `Transport` executes an
//! `HttpRequest` and returns the raw response, or an opaque
//! `TransportError` that is surfaced to the caller unchanged. Closures
//! implement the trait, which is what most tests use.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}
