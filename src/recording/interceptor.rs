//! Middleware that appends every successful response to a cassette

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Request, Response};
use tracing::debug;

use super::RECORDING_HEADER;
use crate::config::VcrConfig;
use crate::network::{Handler, HandlerFuture, Middleware};
use crate::storage::{CassetteWriter, RecordedResponse};

/// Records responses from the wrapped stage into a cassette file.
///
/// Each response is stamped with `X-VCR-Recording: <unix seconds>` before it
/// is stored and handed back. Failed requests pass through untouched and
/// leave the cassette as it was.
#[derive(Debug, Clone)]
pub struct RecordingMiddleware {
    writer: Arc<CassetteWriter>,
    config: VcrConfig,
}

impl RecordingMiddleware {
    /// Create a recorder writing to `cassette`
    pub fn new(cassette: impl Into<PathBuf>, config: VcrConfig) -> Self {
        Self {
            writer: Arc::new(CassetteWriter::new(cassette)),
            config,
        }
    }
}

impl Middleware for RecordingMiddleware {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(RecordingHandler {
            next,
            writer: Arc::clone(&self.writer),
            config: self.config.clone(),
        })
    }
}

struct RecordingHandler {
    next: Arc<dyn Handler>,
    writer: Arc<CassetteWriter>,
    config: VcrConfig,
}

impl Handler for RecordingHandler {
    fn handle(&self, request: Request<Bytes>) -> HandlerFuture<'_> {
        Box::pin(async move {
            let method = request.method().clone();
            let uri = request.uri().clone();

            let mut response = self.next.handle(request).await?;
            stamp(&mut response);

            let entry = RecordedResponse::from_response(&response, &self.config)?;
            let count = self.writer.append(entry).await?;

            debug!(
                "Recorded {} {} -> {} ({} entries in {})",
                method,
                uri,
                response.status(),
                count,
                self.writer.path().display()
            );

            Ok(response)
        })
    }
}

fn stamp(response: &mut Response<Bytes>) {
    response.headers_mut().insert(
        HeaderName::from_static(RECORDING_HEADER),
        HeaderValue::from(unix_timestamp()),
    );
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
