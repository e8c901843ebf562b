//! Entry point tying a base URL to a shared configuration.
//!
//! # Design
//! `RestClient` holds only a `base_url` and a `RestConfig` and never mutates
//! either. `given` hands out a fresh `RequestSpec` seeded with both; the
//! request can still override the config for itself. `parse` wraps a raw
//! response for callers that execute requests themselves instead of going
//! through a `Transport`.

use std::sync::Arc;

use crate::config::RestConfig;
use crate::http::HttpResponse;
use crate::request::RequestSpec;
use crate::response::ResponseSpec;

#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    config: RestConfig,
}

impl RestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            config: RestConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: RestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Start declaring a request.
    pub fn given(&self) -> RequestSpec {
        RequestSpec::for_client(&self.base_url, self.config.clone())
    }

    /// Wrap a response the caller obtained on its own.
    pub fn parse(&self, response: HttpResponse) -> ResponseSpec {
        ResponseSpec::from_response(response, Arc::clone(self.config.decoder()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecoderConfig, EncoderConfig};
    use crate::http::HttpMethod;

    fn client() -> RestClient {
        RestClient::new("http://localhost:8080")
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RestClient::new("http://localhost:8080/");
        let req = client.given().build(HttpMethod::Get, "/hello").unwrap();
        assert_eq!(req.path, "http://localhost:8080/hello");
    }

    #[test]
    fn given_starts_from_client_config() {
        let config = RestConfig::default().with_encoder_config(
            EncoderConfig::default().with_append_charset_for_streaming_content_if_undefined(true),
        );
        let client = client().with_config(config);
        let req = client
            .given()
            .body([42u8])
            .build(HttpMethod::Post, "/returnContentTypeAsBody")
            .unwrap();
        assert_eq!(
            req.header("content-type"),
            Some("application/octet-stream; charset=ISO-8859-1")
        );
        assert!(Arc::ptr_eq(client.config().encoder(), client.given().rest_config().encoder()));
    }

    #[test]
    fn request_override_does_not_leak_into_client() {
        let client = client();
        let req = client
            .given()
            .encoder_config(EncoderConfig::default().with_default_content_charset("UTF-8"))
            .content_type("text/plain")
            .build(HttpMethod::Post, "/")
            .unwrap();
        assert_eq!(req.header("content-type"), Some("text/plain; charset=UTF-8"));

        let req = client
            .given()
            .content_type("text/plain")
            .build(HttpMethod::Post, "/")
            .unwrap();
        assert_eq!(req.header("content-type"), Some("text/plain; charset=ISO-8859-1"));
    }

    #[test]
    fn parse_uses_client_decoder() {
        let client = client().with_config(
            RestConfig::default()
                .with_decoder_config(DecoderConfig::default().with_default_content_charset("UTF-8")),
        );
        let response = client.parse(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "ü".as_bytes().to_vec(),
        });
        assert_eq!(response.charset().unwrap(), "UTF-8");
        assert_eq!(response.body_as_text().unwrap(), "ü");
    }
}
