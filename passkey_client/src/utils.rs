use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use thiserror::Error;

/// Decodes base64url text into bytes.
///
/// Trailing padding and the standard `+`/`/` characters are accepted.
pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let normalized: String = input
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    URL_SAFE_NO_PAD
        .decode(normalized)
        .map_err(|e| UtilError::Format(format!("Failed to decode base64url: {e}")))
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn bytes_to_utf8(input: &[u8]) -> Result<String, UtilError> {
    String::from_utf8(input.to_vec())
        .map_err(|e| UtilError::Format(format!("Invalid UTF-8: {e}")))
}

/// Errors from the codec helpers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UtilError {
    #[error("Invalid format: {0}")]
    Format(String),
}
