//! Data URI encoding strategies.
//!
//! The exporter feeds markup to the image decoder as a `data:` URI. Two
//! encodings are tried in order: percent-encoding keeps ASCII-heavy markup
//! compact, base64 bounds the growth of non-ASCII text at 4/3.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

/// Characters escaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const PERCENT_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";
const BASE64_PREFIX: &str = "data:image/svg+xml;base64,";

/// Why one strategy could not encode the markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("data URI would be {length} bytes, the limit is {max}")]
    TooLong { length: usize, max: usize },

    #[error("{0}")]
    Unsupported(String),
}

/// One way of embedding markup in a `data:` URI.
pub trait UriEncoder: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Encodes `markup`, refusing to produce a URI longer than `max_len`.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] if this strategy cannot encode the markup.
    fn encode(&self, markup: &str, max_len: usize) -> Result<String, StrategyError>;
}

impl fmt::Debug for dyn UriEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `encodeURIComponent`-style percent-encoding of the UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentEncoder;

impl UriEncoder for PercentEncoder {
    fn name(&self) -> &'static str {
        "percent-encoding"
    }

    fn encode(&self, markup: &str, max_len: usize) -> Result<String, StrategyError> {
        let mut uri = String::with_capacity(PERCENT_PREFIX.len() + markup.len());
        uri.push_str(PERCENT_PREFIX);

        for chunk in utf8_percent_encode(markup, URI_COMPONENT) {
            uri.push_str(chunk);
            if uri.len() > max_len {
                // Finish counting so the error reports the real length.
                let rest: usize = utf8_percent_encode(markup, URI_COMPONENT)
                    .map(str::len)
                    .sum();
                return Err(StrategyError::TooLong {
                    length: PERCENT_PREFIX.len() + rest,
                    max: max_len,
                });
            }
        }

        Ok(uri)
    }
}

/// Standard base64 of the UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Encoder;

impl UriEncoder for Base64Encoder {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encode(&self, markup: &str, max_len: usize) -> Result<String, StrategyError> {
        let length = BASE64_PREFIX.len() + markup.len().div_ceil(3) * 4;
        if length > max_len {
            return Err(StrategyError::TooLong {
                length,
                max: max_len,
            });
        }

        let mut uri = String::with_capacity(length);
        uri.push_str(BASE64_PREFIX);
        STANDARD.encode_string(markup.as_bytes(), &mut uri);
        Ok(uri)
    }
}

/// The default strategy order.
pub fn default_encoders() -> Vec<Box<dyn UriEncoder>> {
    vec![Box::new(PercentEncoder), Box::new(Base64Encoder)]
}
