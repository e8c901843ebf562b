//! Charset negotiation for outgoing and incoming bodies.
//!
//! # Design
//! Outgoing precedence is fixed: a charset the caller wrote into the content
//! type always wins, then the append flag for the type's category (textual or
//! streaming), then that category's default charset. Resolving a type that
//! already carries a charset is therefore a no-op, whatever the config.
//!
//! Incoming precedence: the response's charset parameter, then a per-type
//! default from `DecoderConfig`, then its `default_content_charset`.

use tracing::debug;

use crate::config::{DecoderConfig, EncoderConfig};
use crate::media_type::MediaType;

/// Resolve the `Content-Type` a request will actually carry.
///
/// `explicit` is the declared type or the effective default the request
/// builder picked for a body without one. Returns `None` only when
/// `explicit` is `None`.
pub fn resolve_outgoing_content_type(
    explicit: Option<&MediaType>,
    has_body: bool,
    cfg: &EncoderConfig,
) -> Option<MediaType> {
    let explicit = explicit?;
    let textual = cfg.is_textual(explicit);

    if let Some(charset) = explicit.charset() {
        debug!(content_type = %explicit, charset, "explicit charset kept");
        return Some(explicit.clone());
    }

    let appended = if textual && cfg.append_charset_for_textual_content_if_undefined {
        Some(cfg.default_content_charset.as_str())
    } else if !textual && cfg.append_charset_for_streaming_content_if_undefined {
        Some(cfg.streaming_content_charset())
    } else {
        None
    };

    match appended {
        Some(charset) => {
            debug!(content_type = %explicit, charset, textual, has_body, "appending default charset");
            Some(explicit.clone().with_charset(charset))
        }
        None => {
            debug!(content_type = %explicit, textual, has_body, "no charset appended");
            Some(explicit.clone())
        }
    }
}

/// Resolve the charset used to decode a response body as text.
pub fn resolve_body_charset(content_type: Option<&MediaType>, cfg: &DecoderConfig) -> String {
    if let Some(mt) = content_type {
        if let Some(charset) = mt.charset() {
            return charset.to_string();
        }
        if let Some(charset) = cfg.default_charset_for(mt) {
            return charset.to_string();
        }
    }
    cfg.default_content_charset.clone()
}
