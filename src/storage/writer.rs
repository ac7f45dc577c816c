//! Cassette file writer

use std::path::{Path, PathBuf};

use super::format::RecordedResponse;
use super::reader::parse_entries;
use crate::{Result, VcrError};

/// Appends entries to a cassette file.
///
/// Every append reads the whole file, adds one entry and rewrites it. The
/// sequence is not atomic: two writers on the same path can lose updates.
#[derive(Debug, Clone)]
pub struct CassetteWriter {
    path: PathBuf,
}

impl CassetteWriter {
    /// Create a writer for the given cassette path. Nothing is touched on
    /// disk until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cassette path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and rewrite the cassette
    ///
    /// Returns the number of entries now in the cassette.
    ///
    /// # Errors
    ///
    /// Returns error if the existing cassette cannot be read or parsed, or
    /// the new content cannot be written
    pub async fn append(&self, entry: RecordedResponse) -> Result<usize> {
        let mut entries = if tokio::fs::try_exists(&self.path).await? {
            let data = tokio::fs::read(&self.path).await?;
            parse_entries(&data)?
        } else {
            Vec::new()
        };

        entries.push(entry);

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| VcrError::Encode(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;

        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::format::Headers;
    use crate::storage::CassetteReader;
    use tempfile::TempDir;

    fn entry(status: u16) -> RecordedResponse {
        RecordedResponse {
            status,
            headers: Headers::new(),
            body: String::new(),
            version: "1.1".to_string(),
            reason: String::new(),
        }
    }

    #[tokio::test]
    async fn test_append_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let writer = CassetteWriter::new(temp_dir.path().join("new.json"));

        assert!(!writer.path().exists());
        assert_eq!(writer.append(entry(200)).await.unwrap(), 1);
        assert!(writer.path().exists());
    }

    #[tokio::test]
    async fn test_append_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let writer = CassetteWriter::new(temp_dir.path().join("order.json"));

        for status in [200, 301, 404] {
            writer.append(entry(status)).await.unwrap();
        }

        let statuses: Vec<u16> = CassetteReader::open(writer.path())
            .unwrap()
            .iter()
            .map(|e| e.status)
            .collect();
        assert_eq!(statuses, vec![200, 301, 404]);
    }

    #[tokio::test]
    async fn test_output_is_pretty_printed() {
        let temp_dir = TempDir::new().unwrap();
        let writer = CassetteWriter::new(temp_dir.path().join("pretty.json"));
        writer.append(entry(204)).await.unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert!(content.starts_with("[\n"));
        assert!(content.contains("\"status\": 204"));
    }

    #[tokio::test]
    async fn test_append_to_corrupt_cassette_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.json");
        std::fs::write(&path, "garbage").unwrap();

        let writer = CassetteWriter::new(&path);
        let err = writer.append(entry(200)).await.unwrap_err();
        assert!(matches!(err, VcrError::MalformedCassette(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "garbage");
    }
}
