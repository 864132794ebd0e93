//! File content encoding.
//!
//! The contents API returns file bodies tagged with an encoding, normally
//! base64 wrapped at 60 columns. Outgoing content is always standard base64.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// Why a file body could not be turned into text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The encoding tag is not one we know how to decode.
    #[error("unsupported content encoding \"{0}\"")]
    UnsupportedEncoding(String),

    /// The body is not valid base64.
    #[error("invalid base64 content: {0}")]
    InvalidBase64(String),

    /// The decoded bytes are not UTF-8 text.
    #[error("content is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Decode a file body using the encoding tag sent with it.
///
/// # Errors
///
/// Returns a [`DecodeError`] for unknown encodings, malformed base64, or
/// binary (non UTF-8) content.
pub fn decode(content: &str, encoding: &str) -> Result<String, DecodeError> {
    match encoding.to_ascii_lowercase().as_str() {
        "base64" => {
            let compact: String = content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = BASE64
                .decode(compact)
                .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))
        }
        "utf-8" | "utf8" => Ok(content.to_string()),
        other => Err(DecodeError::UnsupportedEncoding(other.to_string())),
    }
}

/// Encode text for a write request.
#[must_use]
pub fn encode(text: &str) -> String {
    BASE64.encode(text.as_bytes())
}
