//! Cassette file reader

use std::path::Path;

use serde_json::Value;

use super::format::{RecordedResponse, REQUIRED_FIELDS};
use crate::{Result, VcrError};

/// Reader for cassette files
pub struct CassetteReader;

impl CassetteReader {
    /// Read and parse every entry of a cassette
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `MalformedCassette` or
    /// `InvalidResponseValue` if its content is not a valid cassette
    pub fn open(path: &Path) -> Result<Vec<RecordedResponse>> {
        let data = std::fs::read(path)?;
        parse_entries(&data)
    }
}

/// Parse cassette bytes into entries, in file order
///
/// # Errors
///
/// Returns `MalformedCassette` if the data is not a JSON array of objects
/// carrying all required fields, `InvalidResponseValue` if a field has the
/// wrong type
pub fn parse_entries(data: &[u8]) -> Result<Vec<RecordedResponse>> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| VcrError::MalformedCassette(format!("invalid JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(VcrError::MalformedCassette(
            "expected a JSON array of responses".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_entry(index, item))
        .collect()
}

fn parse_entry(index: usize, item: Value) -> Result<RecordedResponse> {
    let Some(object) = item.as_object() else {
        return Err(VcrError::MalformedCassette(format!(
            "entry {index} is not an object"
        )));
    };

    if let Some(missing) = REQUIRED_FIELDS
        .iter()
        .find(|field| !object.contains_key(**field))
    {
        return Err(VcrError::MalformedCassette(format!(
            "entry {index} is missing required field '{missing}'"
        )));
    }

    serde_json::from_value(item).map_err(|e| VcrError::InvalidResponseValue {
        index,
        reason: e.to_string(),
    })
}
