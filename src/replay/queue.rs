//! Ordered, single-pass queue of reconstructed responses

use std::collections::VecDeque;
use std::path::Path;

use bytes::Bytes;
use hyper::Response;
use tracing::debug;

use crate::config::VcrConfig;
use crate::network::MockTransport;
use crate::storage::{CassetteReader, RecordedResponse};
use crate::Result;

/// Responses rebuilt from a cassette, in recording order.
///
/// Consumed front to back; a response handed out is gone for good.
#[derive(Debug, Default)]
pub struct ReplayQueue {
    responses: VecDeque<Response<Bytes>>,
}

impl ReplayQueue {
    /// Decode and rebuild every entry
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponseValue` for the first entry that cannot be
    /// turned into a response
    pub fn from_entries(entries: Vec<RecordedResponse>, config: &VcrConfig) -> Result<Self> {
        let responses = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_response(index, config))
            .collect::<Result<VecDeque<_>>>()?;

        debug!("Built replay queue with {} responses", responses.len());
        Ok(Self { responses })
    }

    /// Read a cassette and build its queue
    ///
    /// # Errors
    ///
    /// Returns error if the cassette cannot be read, parsed or rebuilt
    pub fn load(path: &Path, config: &VcrConfig) -> Result<Self> {
        let entries = CassetteReader::open(path)?;
        Self::from_entries(entries, config)
    }

    /// Number of responses left
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Check if the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Hand the remaining responses to a mock transport
    #[must_use]
    pub fn into_transport(self) -> MockTransport {
        MockTransport::new(self.responses)
    }
}

impl Iterator for ReplayQueue {
    type Item = Response<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.responses.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Headers;
    use crate::VcrError;
    use hyper::StatusCode;
    use tempfile::TempDir;

    fn entry(status: u16, body: &str) -> RecordedResponse {
        RecordedResponse {
            status,
            headers: Headers::new(),
            body: body.to_string(),
            version: "1.1".to_string(),
            reason: String::new(),
        }
    }

    #[test]
    fn test_queue_order_and_single_pass() {
        let mut queue = ReplayQueue::from_entries(
            vec![entry(200, "QQ=="), entry(404, "")],
            &VcrConfig::default(),
        )
        .unwrap();
        assert_eq!(queue.len(), 2);

        let first = queue.next().unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.body().as_ref(), b"A");

        assert_eq!(queue.next().unwrap().status(), StatusCode::NOT_FOUND);
        assert!(queue.next().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_bad_entry_reports_index() {
        let err = ReplayQueue::from_entries(
            vec![entry(200, ""), entry(200, "%%%")],
            &VcrConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VcrError::InvalidResponseValue { index: 1, .. }));
    }

    #[test]
    fn test_load_existing_cassette() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("existing.json");
        std::fs::write(
            &path,
            r#"[{"status":200,"headers":{"X-VCR-Recording":["1440121471"]},"body":"SGVsbG8gV29ybGQ=","version":"1.1","reason":"OK"}]"#,
        )
        .unwrap();

        let mut queue = ReplayQueue::load(&path, &VcrConfig::default()).unwrap();
        let response = queue.next().unwrap();
        assert_eq!(response.body().as_ref(), b"Hello World");
        assert_eq!(response.headers()["x-vcr-recording"], "1440121471");
    }

    #[test]
    fn test_into_transport() {
        let queue =
            ReplayQueue::from_entries(vec![entry(204, "")], &VcrConfig::default()).unwrap();
        let transport = queue.into_transport();
        assert_eq!(transport.len(), 1);
    }
}
