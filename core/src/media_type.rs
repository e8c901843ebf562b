//! `type/subtype` media types with ordered parameters.
//!
//! # Design
//! `MediaType` is an immutable value. Every transformation returns a new
//! value, so a parsed content type can be memoized and shared freely.
//! Parameter order is preserved exactly as parsed or inserted because the
//! rendered form is compared as a plain string by content-type expectations.
//!
//! Type and subtype are lowercased. Parameter names keep their case except
//! `charset`, which is always stored and rendered lowercase; parameter values
//! are never case-folded.

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

const CHARSET: &str = "charset";

/// A parsed `Content-Type` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    type_: String,
    subtype: String,
    parameters: Vec<(String, String)>,
}

impl MediaType {
    /// Build `type/subtype` with no parameters.
    ///
    /// Both parts must be non-empty HTTP tokens, the same rule `parse`
    /// applies, so every constructed value renders to something `parse`
    /// accepts.
    pub fn new(type_: &str, subtype: &str) -> Result<Self, FormatError> {
        let (type_, subtype) = (type_.trim(), subtype.trim());
        if type_.is_empty() || subtype.is_empty() {
            return Err(FormatError::new(&format!("{type_}/{subtype}"), "empty type or subtype"));
        }
        if !is_token(type_) || !is_token(subtype) {
            return Err(FormatError::new(
                &format!("{type_}/{subtype}"),
                "invalid character in type or subtype",
            ));
        }
        Ok(Self::from_parts(type_, subtype))
    }

    /// Unchecked constructor for the well-known types in this crate.
    pub(crate) fn from_parts(type_: &str, subtype: &str) -> Self {
        Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    /// Parse `type/subtype` followed by any number of `; name=value` pairs.
    ///
    /// Empty parameter segments (`text/plain;`) are ignored. Quoted values
    /// are unquoted. Anything else that does not fit the header grammar is a
    /// `FormatError`.
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let trimmed = raw.trim();
        let (essence, rest) = match trimmed.find(';') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
            None => (trimmed, ""),
        };

        let (type_, subtype) = essence
            .split_once('/')
            .ok_or_else(|| FormatError::new(raw, "missing '/' between type and subtype"))?;
        let (type_, subtype) = (type_.trim(), subtype.trim());
        if type_.is_empty() || subtype.is_empty() {
            return Err(FormatError::new(raw, "empty type or subtype"));
        }
        if !is_token(type_) || !is_token(subtype) {
            return Err(FormatError::new(raw, "invalid character in type or subtype"));
        }

        let mut media_type = MediaType::from_parts(type_, subtype);
        for segment in split_parameters(raw, rest)? {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| FormatError::new(raw, "parameter without '='"))?;
            let name = name.trim();
            if !is_token(name) {
                return Err(FormatError::new(raw, "invalid parameter name"));
            }
            let value = unquote(raw, value.trim())?;
            media_type.set_parameter(name, value);
        }
        Ok(media_type)
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Look up a parameter by name, ignoring ASCII case.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a parameter. An existing parameter with the same name (ignoring
    /// case) is replaced in place; otherwise the parameter is appended.
    ///
    /// The name must be a non-empty HTTP token. Any value is accepted and is
    /// quoted on render when it is not a token.
    pub fn with_parameter(
        mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Self, FormatError> {
        let name = name.trim();
        if !is_token(name) {
            return Err(FormatError::new(name, "invalid parameter name"));
        }
        self.set_parameter(name, value.into());
        Ok(self)
    }

    fn set_parameter(&mut self, name: &str, value: String) {
        match self
            .parameters
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.parameters.push((normalize_name(name), value)),
        }
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter(CHARSET)
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.set_parameter(CHARSET, charset.into());
        self
    }

    #[must_use]
    pub fn without_charset(mut self) -> Self {
        self.parameters.retain(|(n, _)| !n.eq_ignore_ascii_case(CHARSET));
        self
    }

    /// Canonical header form: `type/subtype; name=value; ...`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.parameters {
            if is_token(value) {
                write!(f, "; {name}={value}")?;
            } else {
                write!(f, "; {name}=\"")?;
                for c in value.chars() {
                    if c == '"' || c == '\\' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, "\"")?;
            }
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s)
    }
}

/// Well-known media types for request declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Any,
    Text,
    Json,
    Xml,
    Html,
    UrlEnc,
    Binary,
}

impl ContentType {
    pub fn media_type(self) -> MediaType {
        match self {
            ContentType::Any => MediaType::from_parts("*", "*"),
            ContentType::Text => MediaType::from_parts("text", "plain"),
            ContentType::Json => MediaType::from_parts("application", "json"),
            ContentType::Xml => MediaType::from_parts("application", "xml"),
            ContentType::Html => MediaType::from_parts("text", "html"),
            ContentType::UrlEnc => MediaType::from_parts("application", "x-www-form-urlencoded"),
            ContentType::Binary => MediaType::from_parts("application", "octet-stream"),
        }
    }
}

impl From<ContentType> for MediaType {
    fn from(value: ContentType) -> Self {
        value.media_type()
    }
}

/// RFC 9110 `tchar`.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

fn normalize_name(name: &str) -> String {
    if name.eq_ignore_ascii_case(CHARSET) {
        CHARSET.to_string()
    } else {
        name.to_string()
    }
}

/// Split the parameter section on `;`, ignoring separators inside quotes.
fn split_parameters<'a>(raw: &str, rest: &'a str) -> Result<Vec<&'a str>, FormatError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&rest[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(FormatError::new(raw, "unterminated quoted parameter value"));
    }
    segments.push(&rest[start..]);
    Ok(segments)
}

fn unquote(raw: &str, value: &str) -> Result<String, FormatError> {
    let Some(inner) = value.strip_prefix('"') else {
        return Ok(value.to_string());
    };
    let inner = inner
        .strip_suffix('"')
        .ok_or_else(|| FormatError::new(raw, "unterminated quoted parameter value"))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}
