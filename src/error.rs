//! Error types for vcr-handler

use std::io;
use thiserror::Error;

/// Result type for vcr-handler operations
pub type Result<T> = std::result::Result<T, VcrError>;

/// Errors that can occur while recording or replaying cassettes
#[derive(Debug, Error)]
pub enum VcrError {
    /// Cassette could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Cassette is not valid JSON, not an array, or an entry lacks a field
    #[error("Malformed cassette: {0}")]
    MalformedCassette(String),

    /// A cassette entry cannot be turned into a response
    #[error("Invalid response value in entry {index}: {reason}")]
    InvalidResponseValue {
        /// Position of the entry in the cassette
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Replay was asked for more responses than were recorded
    #[error("Mock queue is empty: no more recorded responses")]
    QueueExhausted,

    /// Cassette could not be serialized
    #[error("Failed to encode cassette: {0}")]
    Encode(String),

    /// Network-level failure from the underlying transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// Redirect limit exceeded
    #[error("Will not follow more than {0} redirects")]
    TooManyRedirects(usize),

    /// A URI could not be parsed or resolved
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// A named stage is not present in the handler stack
    #[error("Stage not found in handler stack: {0}")]
    StageNotFound(String),

    /// The handler stack has no transport to resolve against
    #[error("No transport has been set on the handler stack")]
    MissingTransport,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
