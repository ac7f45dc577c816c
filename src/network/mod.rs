//! Network layer for vcr-handler
//!
//! A request pipeline is a transport [`Handler`] wrapped by named
//! [`Middleware`] stages collected in a [`HandlerStack`]. Requests and
//! responses are plain `http` values with fully buffered bodies.

mod client;
mod mock;
mod redirect;
mod stack;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use hyper::{Request, Response};

use crate::Result;

pub use client::HyperTransport;
pub use mock::MockTransport;
pub use redirect::{resolve_uri, RedirectMiddleware};
pub use stack::{HandlerStack, FOLLOW_REDIRECTS};

/// Connection setup timeout
pub const CONNECT_TIMEOUT_MS: u64 = 1000;

/// Boxed future returned by [`Handler::handle`]
pub type HandlerFuture<'a> = BoxFuture<'a, Result<Response<Bytes>>>;

/// Turns a request into a response
pub trait Handler: Send + Sync {
    /// Handle one request
    fn handle(&self, request: Request<Bytes>) -> HandlerFuture<'_>;
}

/// Wraps a handler with extra behavior
pub trait Middleware: Send + Sync {
    /// Wrap `next`, returning the handler that runs before it
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler>;
}
