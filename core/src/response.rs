//! Immutable view over a received response.
//!
//! # Design
//! `ResponseSpec` wraps the raw `HttpResponse` a transport returned. The
//! content type and decoded text body are derived on first use and cached in
//! `OnceLock`s, so a malformed `Content-Type` header is only reported when
//! someone actually asks for it. Raw body bytes are never transcoded.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::charset::Charset;
use crate::config::DecoderConfig;
use crate::error::{FormatError, SpecError};
use crate::expect::Then;
use crate::http::{find_header, HttpResponse};
use crate::media_type::MediaType;
use crate::negotiation::resolve_body_charset;

#[derive(Debug)]
pub struct ResponseSpec {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    decoder: Arc<DecoderConfig>,
    content_type: OnceLock<Result<Option<MediaType>, FormatError>>,
    body_text: OnceLock<String>,
}

impl ResponseSpec {
    pub fn from_response(response: HttpResponse, decoder: Arc<DecoderConfig>) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
            decoder,
            content_type: OnceLock::new(),
            body_text: OnceLock::new(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// First header named `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Every value of a repeated header, in received order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn decoder_config(&self) -> &DecoderConfig {
        &self.decoder
    }

    /// The parsed `Content-Type`, or `None` when the header is absent.
    pub fn content_type(&self) -> Result<Option<&MediaType>, FormatError> {
        self.content_type
            .get_or_init(|| self.header("content-type").map(MediaType::parse).transpose())
            .as_ref()
            .map(Option::as_ref)
            .map_err(Clone::clone)
    }

    /// Charset the body is decoded with when read as text.
    pub fn charset(&self) -> Result<String, FormatError> {
        Ok(resolve_body_charset(self.content_type()?, &self.decoder))
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body decoded with the resolved charset.
    pub fn body_as_text(&self) -> Result<&str, SpecError> {
        if let Some(text) = self.body_text.get() {
            return Ok(text);
        }
        let charset_name = self.charset()?;
        let charset = Charset::for_name(&charset_name)?;
        debug!(charset = charset.name(), len = self.body.len(), "decoding response body");
        let text = charset.decode(&self.body);
        Ok(self.body_text.get_or_init(|| text))
    }

    /// Start declaring expectations against this response.
    pub fn then(&self) -> Then<'_> {
        Then::new(self)
    }
}
