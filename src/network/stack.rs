//! Named middleware stack around a transport
//!
//! Stages are kept in order from the transport outward. A stage placed
//! [`after`](HandlerStack::after) another one wraps it, so it sees each
//! response once that stage is done with it; a stage placed
//! [`before`](HandlerStack::before) is wrapped by it.

use std::fmt;
use std::sync::Arc;

use super::{Handler, Middleware, RedirectMiddleware};
use crate::{Result, VcrError};

/// Name of the redirect stage installed by [`HandlerStack::create`]
pub const FOLLOW_REDIRECTS: &str = "follow_redirects";

struct Stage {
    name: String,
    middleware: Arc<dyn Middleware>,
}

/// Transport plus named middleware stages
#[derive(Default)]
pub struct HandlerStack {
    transport: Option<Arc<dyn Handler>>,
    stages: Vec<Stage>,
}

impl HandlerStack {
    /// Create an empty stack with no transport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack over `transport` with no stages
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Handler>) -> Self {
        Self {
            transport: Some(transport),
            stages: Vec::new(),
        }
    }

    /// Create a stack over `transport` with the default stages
    /// ([`FOLLOW_REDIRECTS`])
    #[must_use]
    pub fn create(transport: Arc<dyn Handler>, max_redirects: usize) -> Self {
        let mut stack = Self::with_transport(transport);
        stack.push(
            FOLLOW_REDIRECTS,
            Arc::new(RedirectMiddleware::new(max_redirects)),
        );
        stack
    }

    /// Replace the transport
    pub fn set_transport(&mut self, transport: Arc<dyn Handler>) {
        self.transport = Some(transport);
    }

    /// Check if a transport is set
    #[must_use]
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Add a stage outside every existing stage
    pub fn push(&mut self, name: impl Into<String>, middleware: Arc<dyn Middleware>) {
        self.stages.push(Stage {
            name: name.into(),
            middleware,
        });
    }

    /// Add a stage directly around the transport
    pub fn unshift(&mut self, name: impl Into<String>, middleware: Arc<dyn Middleware>) {
        self.stages.insert(
            0,
            Stage {
                name: name.into(),
                middleware,
            },
        );
    }

    /// Add a stage directly outside `target`
    ///
    /// # Errors
    ///
    /// Returns `StageNotFound` if no stage is named `target`
    pub fn after(
        &mut self,
        target: &str,
        name: impl Into<String>,
        middleware: Arc<dyn Middleware>,
    ) -> Result<()> {
        let index = self.position(target)?;
        self.stages.insert(
            index + 1,
            Stage {
                name: name.into(),
                middleware,
            },
        );
        Ok(())
    }

    /// Add a stage directly inside `target`
    ///
    /// # Errors
    ///
    /// Returns `StageNotFound` if no stage is named `target`
    pub fn before(
        &mut self,
        target: &str,
        name: impl Into<String>,
        middleware: Arc<dyn Middleware>,
    ) -> Result<()> {
        let index = self.position(target)?;
        self.stages.insert(
            index,
            Stage {
                name: name.into(),
                middleware,
            },
        );
        Ok(())
    }

    /// Remove every stage named `name`, returning whether any was removed
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.stages.len();
        self.stages.retain(|stage| stage.name != name);
        self.stages.len() != before
    }

    /// Stage names, from the transport outward
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name.as_str()).collect()
    }

    /// Compose the stages around the transport
    ///
    /// # Errors
    ///
    /// Returns `MissingTransport` if no transport is set
    pub fn resolve(&self) -> Result<Arc<dyn Handler>> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(VcrError::MissingTransport)?;

        Ok(self
            .stages
            .iter()
            .fold(Arc::clone(transport), |next, stage| {
                stage.middleware.wrap(next)
            }))
    }

    fn position(&self, target: &str) -> Result<usize> {
        self.stages
            .iter()
            .position(|stage| stage.name == target)
            .ok_or_else(|| VcrError::StageNotFound(target.to_string()))
    }
}

impl fmt::Debug for HandlerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerStack")
            .field("has_transport", &self.has_transport())
            .field("stages", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{HandlerFuture, MockTransport};
    use bytes::Bytes;
    use hyper::header::HeaderValue;
    use hyper::{Request, Response};

    /// Appends its name to an `x-trace` response header
    struct Tag(&'static str);

    struct Tagged {
        name: &'static str,
        next: Arc<dyn Handler>,
    }

    impl Middleware for Tag {
        fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
            Arc::new(Tagged {
                name: self.0,
                next,
            })
        }
    }

    impl Handler for Tagged {
        fn handle(&self, request: Request<Bytes>) -> HandlerFuture<'_> {
            Box::pin(async move {
                let mut response = self.next.handle(request).await?;
                response
                    .headers_mut()
                    .append("x-trace", HeaderValue::from_static(self.name));
                Ok(response)
            })
        }
    }

    fn mock() -> Arc<dyn Handler> {
        Arc::new(MockTransport::new(vec![Response::new(Bytes::new())]))
    }

    async fn trace(stack: &HandlerStack) -> Vec<String> {
        let handler = stack.resolve().unwrap();
        let response = handler
            .handle(Request::new(Bytes::new()))
            .await
            .unwrap();
        response
            .headers()
            .get_all("x-trace")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_stage_order() {
        let mut stack = HandlerStack::with_transport(mock());
        stack.push("outer", Arc::new(Tag("outer")));
        stack.unshift("inner", Arc::new(Tag("inner")));
        stack.after("inner", "middle", Arc::new(Tag("middle"))).unwrap();
        stack.before("inner", "innermost", Arc::new(Tag("innermost"))).unwrap();

        assert_eq!(stack.names(), vec!["innermost", "inner", "middle", "outer"]);
        assert_eq!(
            trace(&stack).await,
            vec!["innermost", "inner", "middle", "outer"]
        );
    }

    #[test]
    fn test_create_installs_redirects() {
        let stack = HandlerStack::create(mock(), 5);
        assert_eq!(stack.names(), vec![FOLLOW_REDIRECTS]);
        assert!(stack.has_transport());
    }

    #[test]
    fn test_unknown_target() {
        let mut stack = HandlerStack::with_transport(mock());
        let err = stack
            .after("missing", "x", Arc::new(Tag("x")))
            .unwrap_err();
        assert!(matches!(err, VcrError::StageNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_remove() {
        let mut stack = HandlerStack::create(mock(), 5);
        assert!(stack.remove(FOLLOW_REDIRECTS));
        assert!(!stack.remove(FOLLOW_REDIRECTS));
        assert!(stack.names().is_empty());
    }

    #[test]
    fn test_resolve_without_transport() {
        let mut stack = HandlerStack::new();
        assert!(matches!(stack.resolve(), Err(VcrError::MissingTransport)));

        stack.set_transport(mock());
        assert!(stack.resolve().is_ok());
    }
}
