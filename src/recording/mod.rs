//! Recording interceptor that persists live responses to a cassette

mod interceptor;

pub use interceptor::RecordingMiddleware;

/// Header stamped on every recorded response
pub const RECORDING_HEADER: &str = "x-vcr-recording";

/// Spelling of [`RECORDING_HEADER`] written to cassettes
pub const RECORDING_HEADER_FIELD: &str = "X-VCR-Recording";

/// Stage name used when the recorder is inserted into a handler stack
pub const RECORDER_STAGE: &str = "vcr_recorder";
