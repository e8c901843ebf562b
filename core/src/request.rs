//! Fluent request declaration.
//!
//! # Design
//! `RequestSpec` accumulates what the caller declared (config, content type,
//! body, extra headers) and resolves the outgoing `Content-Type` only when the
//! request is built. A content type given as a string is parsed at that
//! point, so a malformed declaration surfaces as a `FormatError` from
//! `build`/`build_outgoing_headers`, never from the setter.
//!
//! A body without a declared content type gets the default a transport would
//! pick (`application/octet-stream` for bytes, `text/plain` for text) and
//! that default goes through the same charset resolution as a declared one.

use std::sync::Arc;

use tracing::debug;

use crate::charset::Charset;
use crate::config::{DecoderConfig, EncoderConfig, RestConfig};
use crate::error::{FormatError, SpecError};
use crate::http::{HttpMethod, HttpRequest};
use crate::media_type::{ContentType, MediaType};
use crate::negotiation::resolve_outgoing_content_type;
use crate::response::ResponseSpec;
use crate::transport::Transport;

/// A content type as the caller declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredContentType {
    Media(MediaType),
    Raw(String),
}

impl DeclaredContentType {
    fn parse(&self) -> Result<MediaType, FormatError> {
        match self {
            DeclaredContentType::Media(mt) => Ok(mt.clone()),
            DeclaredContentType::Raw(raw) => MediaType::parse(raw),
        }
    }
}

impl From<MediaType> for DeclaredContentType {
    fn from(value: MediaType) -> Self {
        DeclaredContentType::Media(value)
    }
}

impl From<ContentType> for DeclaredContentType {
    fn from(value: ContentType) -> Self {
        DeclaredContentType::Media(value.media_type())
    }
}

impl From<&str> for DeclaredContentType {
    fn from(value: &str) -> Self {
        DeclaredContentType::Raw(value.to_string())
    }
}

impl From<String> for DeclaredContentType {
    fn from(value: String) -> Self {
        DeclaredContentType::Raw(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Bytes(Vec<u8>),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    config: RestConfig,
    base_url: String,
    content_type: Option<DeclaredContentType>,
    body: Option<Body>,
    headers: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn for_client(base_url: &str, config: RestConfig) -> Self {
        Self {
            config,
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(mut self, config: RestConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn encoder_config(mut self, encoder: EncoderConfig) -> Self {
        self.config = self.config.with_encoder_config(encoder);
        self
    }

    #[must_use]
    pub fn decoder_config(mut self, decoder: DecoderConfig) -> Self {
        self.config = self.config.with_decoder_config(decoder);
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<DeclaredContentType>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Raw bytes, sent untouched.
    #[must_use]
    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Bytes(bytes.into()));
        self
    }

    /// Text, encoded with the resolved charset when the request is built.
    #[must_use]
    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(Body::Text(text.into()));
        self
    }

    /// Add a request header. `Content-Type` is treated as a content type
    /// declaration and replaces any earlier one.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name.eq_ignore_ascii_case("content-type") {
            return self.content_type(value.into());
        }
        self.headers.push((name, value.into()));
        self
    }

    pub fn rest_config(&self) -> &RestConfig {
        &self.config
    }

    /// The declared type, or the transport default when only a body was given.
    pub fn effective_content_type(&self) -> Result<Option<MediaType>, FormatError> {
        if let Some(declared) = &self.content_type {
            return declared.parse().map(Some);
        }
        Ok(match &self.body {
            Some(Body::Bytes(_)) => Some(ContentType::Binary.media_type()),
            Some(Body::Text(_)) => Some(ContentType::Text.media_type()),
            None => None,
        })
    }

    /// The `Content-Type` the request will carry, charset included.
    pub fn resolved_content_type(&self) -> Result<Option<MediaType>, FormatError> {
        let effective = self.effective_content_type()?;
        Ok(resolve_outgoing_content_type(
            effective.as_ref(),
            self.body.is_some(),
            self.config.encoder(),
        ))
    }

    /// Extra headers followed by the resolved `Content-Type`, if any.
    pub fn build_outgoing_headers(&self) -> Result<Vec<(String, String)>, FormatError> {
        let content_type = self.resolved_content_type()?;
        Ok(self.headers_with(content_type.as_ref()))
    }

    /// Build the plain-data request for `method` and `path`.
    pub fn build(&self, method: HttpMethod, path: &str) -> Result<HttpRequest, SpecError> {
        let content_type = self.resolved_content_type()?;
        let body = match &self.body {
            None => None,
            Some(Body::Bytes(bytes)) => Some(bytes.clone()),
            Some(Body::Text(text)) => {
                let name = content_type
                    .as_ref()
                    .and_then(MediaType::charset)
                    .unwrap_or(&self.config.encoder().default_content_charset);
                let charset = Charset::for_name(name)?;
                Some(charset.encode(text))
            }
        };
        Ok(HttpRequest {
            method,
            path: join_url(&self.base_url, path),
            headers: self.headers_with(content_type.as_ref()),
            body,
        })
    }

    /// Build the request, hand it to `transport` and wrap the response.
    pub fn send<T: Transport + ?Sized>(
        self,
        transport: &T,
        method: HttpMethod,
        path: &str,
    ) -> Result<ResponseSpec, SpecError> {
        let request = self.build(method, path)?;
        debug!(
            method = %request.method,
            path = request.path.as_str(),
            content_type = request.header("content-type").unwrap_or_default(),
            "sending request"
        );
        let response = transport.send(&request)?;
        debug!(status = response.status, len = response.body.len(), "received response");
        Ok(ResponseSpec::from_response(response, Arc::clone(self.config.decoder())))
    }

    pub fn get<T: Transport + ?Sized>(self, transport: &T, path: &str) -> Result<ResponseSpec, SpecError> {
        self.send(transport, HttpMethod::Get, path)
    }

    pub fn post<T: Transport + ?Sized>(self, transport: &T, path: &str) -> Result<ResponseSpec, SpecError> {
        self.send(transport, HttpMethod::Post, path)
    }

    pub fn put<T: Transport + ?Sized>(self, transport: &T, path: &str) -> Result<ResponseSpec, SpecError> {
        self.send(transport, HttpMethod::Put, path)
    }

    pub fn patch<T: Transport + ?Sized>(self, transport: &T, path: &str) -> Result<ResponseSpec, SpecError> {
        self.send(transport, HttpMethod::Patch, path)
    }

    pub fn delete<T: Transport + ?Sized>(self, transport: &T, path: &str) -> Result<ResponseSpec, SpecError> {
        self.send(transport, HttpMethod::Delete, path)
    }

    fn headers_with(&self, content_type: Option<&MediaType>) -> Vec<(String, String)> {
        let mut headers = self.headers.clone();
        if let Some(ct) = content_type {
            headers.push(("Content-Type".to_string(), ct.render()));
        }
        headers
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    if base_url.is_empty() {
        return path.to_string();
    }
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base_url.to_string()
    } else {
        format!("{base_url}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpResponse;

    fn streaming(append: bool) -> EncoderConfig {
        EncoderConfig::default().with_append_charset_for_streaming_content_if_undefined(append)
    }

    fn content_type_header(spec: &RequestSpec) -> Option<String> {
        spec.build_outgoing_headers()
            .unwrap()
            .into_iter()
            .find(|(n, _)| n == "Content-Type")
            .map(|(_, v)| v)
    }

    #[test]
    fn bytes_without_content_type_default_to_octet_stream() {
        let spec = RequestSpec::new().encoder_config(streaming(false)).body([42u8]);
        assert_eq!(content_type_header(&spec).as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn explicit_streaming_type_without_append() {
        let spec = RequestSpec::new()
            .encoder_config(streaming(false))
            .content_type("application/zip")
            .body([42u8]);
        assert_eq!(content_type_header(&spec).as_deref(), Some("application/zip"));
    }

    #[test]
    fn explicit_streaming_type_with_append() {
        let spec = RequestSpec::new()
            .encoder_config(streaming(true).with_default_content_charset("UTF-8"))
            .content_type("application/zip")
            .body([42u8]);
        assert_eq!(content_type_header(&spec).as_deref(), Some("application/zip; charset=UTF-8"));
    }

    #[test]
    fn default_type_gets_streaming_charset() {
        let spec = RequestSpec::new()
            .encoder_config(streaming(true).with_default_streaming_content_charset("ISO-8859-1"))
            .body([42u8]);
        assert_eq!(
            content_type_header(&spec).as_deref(),
            Some("application/octet-stream; charset=ISO-8859-1")
        );
    }

    #[test]
    fn no_body_no_type_no_header() {
        let spec = RequestSpec::new().header("Accept", "application/json");
        assert_eq!(
            spec.build_outgoing_headers().unwrap(),
            vec![("Accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn content_type_header_is_a_declaration() {
        let spec = RequestSpec::new()
            .content_type(ContentType::Json)
            .header("content-type", "text/csv; charset=UTF-8");
        assert_eq!(content_type_header(&spec).as_deref(), Some("text/csv; charset=UTF-8"));
        assert_eq!(spec.build_outgoing_headers().unwrap().len(), 1);
    }

    #[test]
    fn malformed_declaration_fails_at_build() {
        let spec = RequestSpec::new().content_type("nonsense").body([1u8]);
        assert!(spec.build_outgoing_headers().is_err());
        assert!(matches!(
            spec.build(HttpMethod::Post, "/x"),
            Err(SpecError::Format(_))
        ));
    }

    #[test]
    fn text_body_encoded_with_resolved_charset() {
        let req = RequestSpec::new()
            .body_text("Grüß")
            .build(HttpMethod::Post, "/echo")
            .unwrap();
        assert_eq!(req.header("content-type"), Some("text/plain; charset=ISO-8859-1"));
        assert_eq!(req.body, Some(vec![0x47, 0x72, 0xFC, 0xDF]));

        let req = RequestSpec::new()
            .content_type("application/json; charset=UTF-8")
            .body_text("\"ü\"")
            .build(HttpMethod::Post, "/echo")
            .unwrap();
        assert_eq!(req.body, Some("\"ü\"".as_bytes().to_vec()));
    }

    #[test]
    fn text_body_without_charset_uses_default_content_charset() {
        let req = RequestSpec::new()
            .encoder_config(EncoderConfig::default().with_default_content_charset("UTF-8"))
            .content_type("application/zip")
            .body_text("ü")
            .build(HttpMethod::Put, "/")
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/zip"));
        assert_eq!(req.body, Some("ü".as_bytes().to_vec()));
    }

    #[test]
    fn unsupported_charset_fails_text_body() {
        let result = RequestSpec::new()
            .content_type("text/plain; charset=x-unknown")
            .body_text("a")
            .build(HttpMethod::Post, "/");
        assert!(matches!(result, Err(SpecError::UnsupportedCharset(_))));
    }

    #[test]
    fn base_url_is_joined() {
        let spec = RequestSpec::for_client("http://localhost:8080", RestConfig::default());
        assert_eq!(
            spec.build(HttpMethod::Get, "/hello").unwrap().path,
            "http://localhost:8080/hello"
        );
        assert_eq!(join_url("", "/hello"), "/hello");
        assert_eq!(join_url("http://h", ""), "http://h");
    }

    #[test]
    fn send_passes_request_to_transport_and_wraps_response() {
        let echo_content_type = |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                headers: vec![("Content-Type".to_string(), "text/plain; charset=UTF-8".to_string())],
                body: req.header("content-type").unwrap_or_default().as_bytes().to_vec(),
            })
        };
        let response = RequestSpec::new()
            .content_type("application/zip")
            .body([42u8])
            .post(&echo_content_type, "/returnContentTypeAsBody")
            .unwrap();
        assert_eq!(response.body_as_text().unwrap(), "application/zip");
    }

    #[test]
    fn transport_errors_pass_through() {
        let failing = |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Err(TransportError::new("connection refused"))
        };
        let err = RequestSpec::new().get(&failing, "/hello").unwrap_err();
        assert!(matches!(err, SpecError::Transport(_)));
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn decoder_override_applies_to_response() {
        let latin1 = |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
                body: "ü".as_bytes().to_vec(),
            })
        };
        let response = RequestSpec::new()
            .decoder_config(DecoderConfig::default().with_default_content_charset("UTF-8"))
            .get(&latin1, "/")
            .unwrap();
        assert_eq!(response.body_as_text().unwrap(), "ü");
    }
}
