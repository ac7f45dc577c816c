//! HTTP transport that performs real requests

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use super::{Handler, HandlerFuture, CONNECT_TIMEOUT_MS};
use crate::VcrError;

/// Real network transport over hyper's pooled client
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    /// Create a new transport
    #[must_use]
    pub fn new() -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(CONNECT_TIMEOUT_MS)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build(connector);

        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for HyperTransport {
    fn handle(&self, request: Request<Bytes>) -> HandlerFuture<'_> {
        Box::pin(async move {
            debug!("Forwarding {} to {}", request.method(), request.uri());

            let (parts, body) = request.into_parts();
            let request = Request::from_parts(parts, Full::new(body));

            let response = self.client.request(request).await.map_err(|e| {
                warn!("Request failed: {e}");
                VcrError::Transport(format!("Request failed: {e}"))
            })?;

            // Reason phrase extension, if any, stays in the parts
            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| VcrError::Transport(format!("Failed to read response body: {e}")))?
                .to_bytes();

            Ok(Response::from_parts(parts, body))
        })
    }
}
