//! Thin client that sends requests through a handler stack

use std::sync::Arc;

use bytes::Bytes;
use hyper::{Method, Request, Response, Uri};

use crate::network::{resolve_uri, Handler, HandlerStack};
use crate::{Result, VcrError};

/// Sends requests through a resolved [`HandlerStack`]
#[derive(Clone)]
pub struct Client {
    handler: Arc<dyn Handler>,
    base_uri: Option<Uri>,
}

impl Client {
    /// Create a client over `stack`
    ///
    /// # Errors
    ///
    /// Returns `MissingTransport` if the stack has no transport
    pub fn new(stack: &HandlerStack) -> Result<Self> {
        Ok(Self {
            handler: stack.resolve()?,
            base_uri: None,
        })
    }

    /// Resolve relative request URIs against `base`
    ///
    /// # Errors
    ///
    /// Returns `InvalidUri` if `base` is not an absolute URI
    pub fn with_base_uri(mut self, base: &str) -> Result<Self> {
        let uri = base
            .parse::<Uri>()
            .map_err(|e| VcrError::InvalidUri(format!("'{base}': {e}")))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(VcrError::InvalidUri(format!(
                "'{base}': base URI must be absolute"
            )));
        }
        self.base_uri = Some(uri);
        Ok(self)
    }

    /// Send a request
    ///
    /// # Errors
    ///
    /// Returns whatever the stack returns, or `InvalidUri` if a relative URI
    /// cannot be resolved
    pub async fn send(&self, mut request: Request<Bytes>) -> Result<Response<Bytes>> {
        if request.uri().scheme().is_none() {
            if let Some(base) = &self.base_uri {
                let target = request
                    .uri()
                    .path_and_query()
                    .map_or("/", |pq| pq.as_str())
                    .to_string();
                *request.uri_mut() = resolve_uri(base, &target)?;
            }
        }

        self.handler.handle(request).await
    }

    /// Send a request built from parts
    ///
    /// # Errors
    ///
    /// See [`Client::send`]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: impl Into<Bytes>,
    ) -> Result<Response<Bytes>> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body.into())
            .map_err(|e| VcrError::InvalidUri(format!("'{uri}': {e}")))?;
        self.send(request).await
    }

    /// Send a GET request
    ///
    /// # Errors
    ///
    /// See [`Client::send`]
    pub async fn get(&self, uri: &str) -> Result<Response<Bytes>> {
        self.request(Method::GET, uri, Bytes::new()).await
    }

    /// Send a GET request with URL-encoded query parameters
    ///
    /// # Errors
    ///
    /// See [`Client::send`]
    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Response<Bytes>> {
        self.get(&with_query(path, query)).await
    }

    /// Send a POST request
    ///
    /// # Errors
    ///
    /// See [`Client::send`]
    pub async fn post(&self, uri: &str, body: impl Into<Bytes>) -> Result<Response<Bytes>> {
        self.request(Method::POST, uri, body).await
    }
}

/// Append URL-encoded query parameters to a path
fn with_query(path: &str, query: &[(String, String)]) -> String {
    let mut uri = path.to_string();

    if !query.is_empty() {
        uri.push(if path.contains('?') { '&' } else { '?' });
        for (i, (key, value)) in query.iter().enumerate() {
            if i > 0 {
                uri.push('&');
            }
            uri.push_str(&urlencoding::encode(key));
            uri.push('=');
            uri.push_str(&urlencoding::encode(value));
        }
    }

    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::MockTransport;

    #[test]
    fn test_with_query_simple() {
        assert_eq!(with_query("/api/test", &[]), "/api/test");
    }

    #[test]
    fn test_with_query_encoding() {
        let query = vec![
            ("key".to_string(), "value with spaces".to_string()),
            ("k2".to_string(), "v2".to_string()),
        ];
        assert_eq!(
            with_query("/api/test", &query),
            "/api/test?key=value%20with%20spaces&k2=v2"
        );
        assert_eq!(
            with_query("/api/test?a=1", &query[1..]),
            "/api/test?a=1&k2=v2"
        );
    }

    #[test]
    fn test_base_uri_must_be_absolute() {
        let stack = HandlerStack::with_transport(Arc::new(MockTransport::default()));
        let client = Client::new(&stack).unwrap();
        assert!(client.clone().with_base_uri("/relative").is_err());
        assert!(client.with_base_uri("http://example.com").is_ok());
    }

    #[tokio::test]
    async fn test_relative_request_uses_base_uri() {
        let mock = Arc::new(MockTransport::new(vec![Response::new(Bytes::new())]));
        let stack = HandlerStack::with_transport(mock.clone());
        let client = Client::new(&stack)
            .unwrap()
            .with_base_uri("http://example.com")
            .unwrap();

        client.get("/test?x=1").await.unwrap();

        let (method, uri) = mock.last_request().unwrap();
        assert_eq!(method, Method::GET);
        assert_eq!(uri.to_string(), "http://example.com/test?x=1");
    }
}
