//! Mode selection: record when the cassette is missing, replay otherwise

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::{Mode, VcrConfig};
use crate::network::{Handler, HandlerStack, HyperTransport, FOLLOW_REDIRECTS};
use crate::recording::{RecordingMiddleware, RECORDER_STAGE};
use crate::replay::ReplayQueue;
use crate::Result;

/// Build a handler stack for `cassette`.
///
/// If the cassette does not exist, the stack sends requests over the
/// network with [`HyperTransport`] and records every final response after
/// redirects. If it exists, the stack replays its responses in order and
/// never touches the network. `None` uses [`VcrConfig::default`].
///
/// # Errors
///
/// Returns error if the configuration is invalid, or in replay mode if the
/// cassette cannot be read or is malformed
pub fn turn_on(cassette: impl AsRef<Path>, config: Option<VcrConfig>) -> Result<HandlerStack> {
    let path = cassette.as_ref();
    let config = config.unwrap_or_default();
    config.validate()?;

    match Mode::for_cassette(path) {
        Mode::Record => recording_stack(path, config, Arc::new(HyperTransport::new())),
        Mode::Replay => replay_stack(path, &config),
    }
}

/// Like [`turn_on`], recording through `transport` instead of the default
/// network transport. `transport` is unused when the cassette exists.
///
/// # Errors
///
/// Same as [`turn_on`]
pub fn turn_on_with_transport(
    cassette: impl AsRef<Path>,
    config: Option<VcrConfig>,
    transport: Arc<dyn Handler>,
) -> Result<HandlerStack> {
    let path = cassette.as_ref();
    let config = config.unwrap_or_default();
    config.validate()?;

    match Mode::for_cassette(path) {
        Mode::Record => recording_stack(path, config, transport),
        Mode::Replay => replay_stack(path, &config),
    }
}

fn recording_stack(
    path: &Path,
    config: VcrConfig,
    transport: Arc<dyn Handler>,
) -> Result<HandlerStack> {
    info!("Cassette {} not found, recording", path.display());

    let mut stack = HandlerStack::create(transport, config.max_redirects);
    stack.after(
        FOLLOW_REDIRECTS,
        RECORDER_STAGE,
        Arc::new(RecordingMiddleware::new(path, config)),
    )?;
    Ok(stack)
}

fn replay_stack(path: &Path, config: &VcrConfig) -> Result<HandlerStack> {
    let queue = ReplayQueue::load(path, config)?;
    info!(
        "Replaying {} responses from {}",
        queue.len(),
        path.display()
    );

    Ok(HandlerStack::create(
        Arc::new(queue.into_transport()),
        config.max_redirects,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::MockTransport;
    use crate::recording::RECORDING_HEADER;
    use crate::VcrError;
    use bytes::Bytes;
    use hyper::{Method, Request, Response, StatusCode};
    use tempfile::TempDir;

    fn request(method: Method) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri("http://example.com/")
            .body(Bytes::new())
            .unwrap()
    }

    fn response(status: u16, body: &'static str) -> Response<Bytes> {
        let mut response = Response::new(Bytes::from_static(body.as_bytes()));
        *response.status_mut() = StatusCode::from_u16(status).unwrap();
        response
    }

    #[test]
    fn test_record_mode_stack() {
        let temp_dir = TempDir::new().unwrap();
        let stack = turn_on(temp_dir.path().join("missing.json"), None).unwrap();

        assert_eq!(stack.names(), vec![FOLLOW_REDIRECTS, RECORDER_STAGE]);
    }

    #[test]
    fn test_replay_mode_stack() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();

        let stack = turn_on(&path, None).unwrap();
        assert_eq!(stack.names(), vec![FOLLOW_REDIRECTS]);
    }

    #[test]
    fn test_malformed_cassette() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "{}").unwrap();

        let err = turn_on(&path, None).unwrap_err();
        assert!(matches!(err, VcrError::MalformedCassette(_)));
    }

    #[test]
    fn test_unreadable_cassette() {
        let temp_dir = TempDir::new().unwrap();

        // A directory exists but cannot be read as a file
        let err = turn_on(temp_dir.path(), None).unwrap_err();
        assert!(matches!(err, VcrError::Io(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = VcrConfig {
            max_redirects: 1000,
            ..VcrConfig::default()
        };

        let err = turn_on(temp_dir.path().join("c.json"), Some(config)).unwrap_err();
        assert!(matches!(err, VcrError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_order_fidelity() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("order.json");

        let live = Arc::new(MockTransport::new(vec![response(200, "A"), response(404, "")]));
        let stack = turn_on_with_transport(&path, None, live).unwrap();
        let handler = stack.resolve().unwrap();
        handler.handle(request(Method::GET)).await.unwrap();
        handler.handle(request(Method::POST)).await.unwrap();

        let unused = Arc::new(MockTransport::default());
        let stack = turn_on_with_transport(&path, None, unused.clone()).unwrap();
        let handler = stack.resolve().unwrap();

        let first = handler.handle(request(Method::POST)).await.unwrap();
        let second = handler.handle(request(Method::GET)).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.body().as_ref(), b"A");
        assert!(first.headers().contains_key(RECORDING_HEADER));
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
        assert!(unused.last_request().is_none());

        let err = handler.handle(request(Method::GET)).await.unwrap_err();
        assert!(matches!(err, VcrError::QueueExhausted));
    }
}
