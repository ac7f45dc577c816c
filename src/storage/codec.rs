//! Body codec: decides whether a body is stored as base64 or plain text

use base64::{engine::general_purpose::STANDARD as BASE64, DecodeError, Engine};
use bytes::Bytes;

use super::format::{Headers, RecordedResponse};
use crate::config::VcrConfig;
use crate::{Result, VcrError};

/// Content type treated as binary
pub const BINARY_CONTENT_TYPE: &str = "application/x-gzip";

/// Transfer encoding value treated as binary
pub const BINARY_TRANSFER_ENCODING: &str = "binary";

/// Heuristic binary check on response headers.
///
/// True if a `Content-Type` contains `application/x-gzip` or a
/// `Content-Transfer-Encoding` is `binary`. This does not sniff the body.
#[must_use]
pub fn is_binary(headers: &Headers) -> bool {
    headers.iter().any(|(name, values)| {
        if name.eq_ignore_ascii_case("content-type") {
            values
                .iter()
                .any(|value| value.to_ascii_lowercase().contains(BINARY_CONTENT_TYPE))
        } else if name.eq_ignore_ascii_case("content-transfer-encoding") {
            values
                .iter()
                .any(|value| value.trim().eq_ignore_ascii_case(BINARY_TRANSFER_ENCODING))
        } else {
            false
        }
    })
}

fn should_encode(headers: &Headers, config: &VcrConfig) -> bool {
    !config.only_encode_binary || is_binary(headers)
}

/// Encode a body for storage.
///
/// # Errors
///
/// Returns `Encode` if the body is to be stored raw but is not valid UTF-8
pub fn encode_body(headers: &Headers, body: &[u8], config: &VcrConfig) -> Result<String> {
    if should_encode(headers, config) {
        return Ok(BASE64.encode(body));
    }

    String::from_utf8(body.to_vec()).map_err(|e| {
        VcrError::Encode(format!(
            "body is not valid UTF-8 and cannot be stored as plain text: {e}"
        ))
    })
}

/// Decode the body of a stored entry, mirroring [`encode_body`]
///
/// # Errors
///
/// Returns error if the body should be base64 but is not
pub fn decode_body(
    entry: &RecordedResponse,
    config: &VcrConfig,
) -> std::result::Result<Bytes, DecodeError> {
    if should_encode(&entry.headers, config) {
        BASE64.decode(entry.body.as_bytes()).map(Bytes::from)
    } else {
        Ok(Bytes::from(entry.body.clone()))
    }
}
