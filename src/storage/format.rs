//! On-disk cassette entry and its conversion to and from `http` responses

use std::collections::BTreeMap;

use bytes::Bytes;
use hyper::ext::ReasonPhrase;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Response, StatusCode, Version};
use serde::{Deserialize, Serialize};

use super::codec::{decode_body, encode_body};
use crate::config::VcrConfig;
use crate::recording::{RECORDING_HEADER, RECORDING_HEADER_FIELD};
use crate::{Result, VcrError};

/// Header name to ordered values, as stored in a cassette
pub type Headers = BTreeMap<String, Vec<String>>;

/// Fields every cassette entry must carry
pub const REQUIRED_FIELDS: [&str; 5] = ["status", "headers", "body", "version", "reason"];

/// One recorded response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, repeated headers keep their order
    pub headers: Headers,
    /// Body, base64 or raw depending on the codec decision
    pub body: String,
    /// Protocol version, e.g. "1.1"
    pub version: String,
    /// Reason phrase
    pub reason: String,
}

impl RecordedResponse {
    /// Build an entry from a live response, encoding the body per `config`
    ///
    /// # Errors
    ///
    /// Returns `Encode` if a header value or a raw body is not valid UTF-8
    pub fn from_response(response: &Response<Bytes>, config: &VcrConfig) -> Result<Self> {
        let headers = header_map(response.headers())?;
        let body = encode_body(&headers, response.body(), config)?;

        Ok(Self {
            status: response.status().as_u16(),
            body,
            headers,
            version: version_to_str(response.version()).to_string(),
            reason: reason_phrase(response),
        })
    }

    /// Rebuild a response from this entry
    ///
    /// `index` is the entry's position in the cassette and only feeds
    /// error messages.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponseValue` if any field cannot be represented
    pub fn into_response(self, index: usize, config: &VcrConfig) -> Result<Response<Bytes>> {
        let invalid = |reason: String| VcrError::InvalidResponseValue { index, reason };

        let status = StatusCode::from_u16(self.status)
            .map_err(|_| invalid(format!("status {} is not a valid HTTP status", self.status)))?;
        let version = parse_version(&self.version)
            .ok_or_else(|| invalid(format!("unsupported protocol version '{}'", self.version)))?;
        let body = decode_body(&self, config)
            .map_err(|e| invalid(format!("body is not valid base64: {e}")))?;

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.version_mut() = version;

        let headers = response.headers_mut();
        for (name, values) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| invalid(format!("invalid header name '{name}'")))?;
            for value in values {
                let header_value = HeaderValue::from_bytes(value.as_bytes())
                    .map_err(|_| invalid(format!("invalid value for header '{name}'")))?;
                headers.append(header_name.clone(), header_value);
            }
        }

        if !self.reason.is_empty() && status.canonical_reason() != Some(self.reason.as_str()) {
            let reason = ReasonPhrase::try_from(self.reason.as_bytes())
                .map_err(|_| invalid(format!("invalid reason phrase '{}'", self.reason)))?;
            response.extensions_mut().insert(reason);
        }

        Ok(response)
    }
}

/// Collect a header map into name -> values, keeping value order.
///
/// Names come out lowercase, except the recording stamp which keeps its
/// `X-VCR-Recording` spelling.
///
/// # Errors
///
/// Returns `Encode` if a value is not valid UTF-8
pub fn header_map(headers: &HeaderMap) -> Result<Headers> {
    let mut map = Headers::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| {
                std::str::from_utf8(value.as_bytes())
                    .map(str::to_string)
                    .map_err(|_| {
                        VcrError::Encode(format!("value of header '{name}' is not valid UTF-8"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let key = if name.as_str() == RECORDING_HEADER {
            RECORDING_HEADER_FIELD.to_string()
        } else {
            name.as_str().to_string()
        };
        map.insert(key, values);
    }
    Ok(map)
}

/// Version string as written to cassettes
#[must_use]
pub fn version_to_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}

/// Parse a cassette version string, accepting an optional `HTTP/` prefix
#[must_use]
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    let version = version.strip_prefix("HTTP/").unwrap_or(version);
    match version {
        "0.9" => Some(Version::HTTP_09),
        "1.0" => Some(Version::HTTP_10),
        "1.1" => Some(Version::HTTP_11),
        "2" | "2.0" => Some(Version::HTTP_2),
        "3" | "3.0" => Some(Version::HTTP_3),
        _ => None,
    }
}

/// Reason phrase sent by the server, or the canonical one for the status
#[must_use]
pub fn reason_phrase<B>(response: &Response<B>) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}
