//! Encoder and decoder charset policies.
//!
//! # Design
//! Both configs are immutable values. `with_*` methods consume the value and
//! return the derived copy; clone first to keep the original around.
//! `RestConfig` bundles them behind `Arc`s so a single configuration can be
//! shared by any number of in-flight requests without locking.
//!
//! All fields have serde defaults so a partial JSON document such as
//! `{"append_charset_for_streaming_content_if_undefined": true}` yields a
//! complete config.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::media_type::MediaType;

pub const ISO_8859_1: &str = "ISO-8859-1";

/// Policy for the charset appended to an outgoing `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub default_content_charset: String,
    /// Charset appended to streaming content. Falls back to
    /// `default_content_charset` when unset.
    pub default_streaming_content_charset: Option<String>,
    pub append_charset_for_textual_content_if_undefined: bool,
    pub append_charset_for_streaming_content_if_undefined: bool,
    /// `type/subtype` patterns classifying a media type as textual. Either
    /// side may be `*`; a subtype of `*+json` matches any `+json` suffix.
    pub textual_types: Vec<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            default_content_charset: ISO_8859_1.to_string(),
            default_streaming_content_charset: None,
            append_charset_for_textual_content_if_undefined: true,
            append_charset_for_streaming_content_if_undefined: false,
            textual_types: [
                "text/*",
                "application/json",
                "application/xml",
                "application/x-www-form-urlencoded",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl EncoderConfig {
    #[must_use]
    pub fn with_default_content_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_content_charset = charset.into();
        self
    }

    #[must_use]
    pub fn with_default_streaming_content_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_streaming_content_charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn with_append_charset_for_textual_content_if_undefined(mut self, append: bool) -> Self {
        self.append_charset_for_textual_content_if_undefined = append;
        self
    }

    #[must_use]
    pub fn with_append_charset_for_streaming_content_if_undefined(mut self, append: bool) -> Self {
        self.append_charset_for_streaming_content_if_undefined = append;
        self
    }

    /// Classify an additional pattern as textual.
    #[must_use]
    pub fn with_textual_type(mut self, pattern: impl Into<String>) -> Self {
        self.textual_types.push(pattern.into());
        self
    }

    /// Replace the textual pattern list entirely.
    #[must_use]
    pub fn with_textual_types<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.textual_types = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_textual(&self, media_type: &MediaType) -> bool {
        self.textual_types
            .iter()
            .any(|pattern| pattern_matches(pattern, media_type))
    }

    /// Charset appended to streaming content when the streaming flag is on.
    pub fn streaming_content_charset(&self) -> &str {
        self.default_streaming_content_charset
            .as_deref()
            .unwrap_or(&self.default_content_charset)
    }
}

/// Policy for decoding a response body whose `Content-Type` names no charset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub default_content_charset: String,
    /// Per-`type/subtype` defaults consulted before `default_content_charset`.
    pub content_type_charsets: Vec<(String, String)>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            default_content_charset: ISO_8859_1.to_string(),
            content_type_charsets: Vec::new(),
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_default_content_charset(mut self, charset: impl Into<String>) -> Self {
        self.default_content_charset = charset.into();
        self
    }

    #[must_use]
    pub fn with_default_charset_for_content_type(
        mut self,
        content_type: &str,
        charset: impl Into<String>,
    ) -> Self {
        let essence = content_type.trim().to_ascii_lowercase();
        let charset = charset.into();
        match self
            .content_type_charsets
            .iter_mut()
            .find(|(ct, _)| ct.trim().eq_ignore_ascii_case(&essence))
        {
            Some(slot) => slot.1 = charset,
            None => self.content_type_charsets.push((essence, charset)),
        }
        self
    }

    /// Keys are compared ignoring ASCII case, so entries loaded from JSON
    /// need not be lowercase.
    pub fn default_charset_for(&self, media_type: &MediaType) -> Option<&str> {
        let essence = media_type.essence();
        self.content_type_charsets
            .iter()
            .find(|(ct, _)| ct.trim().eq_ignore_ascii_case(&essence))
            .map(|(_, cs)| cs.as_str())
    }
}

/// Encoder and decoder policy for one client or one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestConfig {
    encoder: Arc<EncoderConfig>,
    decoder: Arc<DecoderConfig>,
}

impl RestConfig {
    pub fn new(encoder: EncoderConfig, decoder: DecoderConfig) -> Self {
        Self {
            encoder: Arc::new(encoder),
            decoder: Arc::new(decoder),
        }
    }

    pub fn encoder(&self) -> &Arc<EncoderConfig> {
        &self.encoder
    }

    pub fn decoder(&self) -> &Arc<DecoderConfig> {
        &self.decoder
    }

    #[must_use]
    pub fn with_encoder_config(mut self, encoder: EncoderConfig) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    #[must_use]
    pub fn with_decoder_config(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }
}

fn pattern_matches(pattern: &str, media_type: &MediaType) -> bool {
    let Some((type_, subtype)) = pattern.trim().split_once('/') else {
        return false;
    };
    let type_ok = type_ == "*" || type_.eq_ignore_ascii_case(media_type.type_());
    let subtype_ok = if subtype == "*" {
        true
    } else if let Some(suffix) = subtype.strip_prefix("*+") {
        media_type
            .subtype()
            .rsplit_once('+')
            .is_some_and(|(_, s)| s.eq_ignore_ascii_case(suffix))
    } else {
        subtype.eq_ignore_ascii_case(media_type.subtype())
    };
    type_ok && subtype_ok
}
