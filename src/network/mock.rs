//! Queue-backed transport that never touches the network

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use hyper::{Method, Request, Response, Uri};
use tracing::{debug, warn};

use super::{Handler, HandlerFuture};
use crate::{Result, VcrError};

/// Serves a fixed queue of responses, one per request, in FIFO order.
///
/// The request's method, URI and body play no part in which response is
/// returned. Once the queue is empty every request fails with
/// [`VcrError::QueueExhausted`].
#[derive(Debug, Default)]
pub struct MockTransport {
    queue: Mutex<VecDeque<Response<Bytes>>>,
    last_request: Mutex<Option<(Method, Uri)>>,
}

impl MockTransport {
    /// Create a mock serving `responses` in order
    pub fn new(responses: impl IntoIterator<Item = Response<Bytes>>) -> Self {
        Self {
            queue: Mutex::new(responses.into_iter().collect()),
            last_request: Mutex::new(None),
        }
    }

    /// Add a response to the back of the queue
    pub fn append(&self, response: Response<Bytes>) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Number of responses left
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Method and URI of the last request handled
    #[must_use]
    pub fn last_request(&self) -> Option<(Method, Uri)> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_response(&self, request: &Request<Bytes>) -> Result<Response<Bytes>> {
        *self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner) =
            Some((request.method().clone(), request.uri().clone()));

        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        match queue.pop_front() {
            Some(response) => {
                debug!(
                    "Replaying {} for {} {} ({} left)",
                    response.status(),
                    request.method(),
                    request.uri(),
                    queue.len()
                );
                Ok(response)
            }
            None => {
                warn!(
                    "No recorded response left for {} {}",
                    request.method(),
                    request.uri()
                );
                Err(VcrError::QueueExhausted)
            }
        }
    }
}

impl Handler for MockTransport {
    fn handle(&self, request: Request<Bytes>) -> HandlerFuture<'_> {
        Box::pin(async move { self.next_response(&request) })
    }
}
