//! Redirect-following stage

use std::sync::Arc;

use bytes::Bytes;
use hyper::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{HeaderMap, Method, Request, StatusCode, Uri, Version};
use tracing::debug;

use super::{Handler, HandlerFuture, Middleware};
use crate::{Result, VcrError};

/// Follows 3xx responses that carry a `Location` header
#[derive(Debug, Clone, Copy)]
pub struct RedirectMiddleware {
    max_redirects: usize,
}

impl RedirectMiddleware {
    /// Follow at most `max_redirects` hops per request
    #[must_use]
    pub fn new(max_redirects: usize) -> Self {
        Self { max_redirects }
    }
}

impl Middleware for RedirectMiddleware {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(FollowRedirects {
            next,
            max_redirects: self.max_redirects,
        })
    }
}

struct FollowRedirects {
    next: Arc<dyn Handler>,
    max_redirects: usize,
}

impl Handler for FollowRedirects {
    fn handle(&self, request: Request<Bytes>) -> HandlerFuture<'_> {
        Box::pin(async move {
            let (parts, mut body) = request.into_parts();
            let mut method = parts.method;
            let mut uri = parts.uri;
            let mut headers = parts.headers;
            let version = parts.version;
            let mut redirects = 0;

            loop {
                let hop = build_request(&method, &uri, version, &headers, body.clone());
                let response = self.next.handle(hop).await?;

                let status = response.status();
                if !is_redirect(status) {
                    return Ok(response);
                }
                let location = match response.headers().get(LOCATION) {
                    Some(value) => value.to_str().map(str::to_owned).map_err(|_| {
                        VcrError::InvalidUri("Location header is not valid ASCII".to_string())
                    })?,
                    None => return Ok(response),
                };

                if redirects >= self.max_redirects {
                    return Err(VcrError::TooManyRedirects(self.max_redirects));
                }

                let target = resolve_uri(&uri, &location)?;

                if target.authority() != uri.authority() {
                    headers.remove(AUTHORIZATION);
                }

                if status == StatusCode::SEE_OTHER
                    || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
                        && method != Method::GET
                        && method != Method::HEAD)
                {
                    method = Method::GET;
                    body = Bytes::new();
                    headers.remove(CONTENT_LENGTH);
                    headers.remove(CONTENT_TYPE);
                }

                redirects += 1;
                debug!("Redirect {redirects}: {status} {uri} -> {target}");
                uri = target;
            }
        })
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn build_request(
    method: &Method,
    uri: &Uri,
    version: Version,
    headers: &HeaderMap,
    body: Bytes,
) -> Request<Bytes> {
    let mut request = Request::new(body);
    *request.method_mut() = method.clone();
    *request.uri_mut() = uri.clone();
    *request.version_mut() = version;
    *request.headers_mut() = headers.clone();
    request
}

/// Resolve a URI reference against a base URI
///
/// # Errors
///
/// Returns error if the result is not a valid URI, or the reference is
/// relative and the base has no authority
pub fn resolve_uri(base: &Uri, reference: &str) -> Result<Uri> {
    if reference.contains("://") {
        return parse_uri(reference, reference);
    }

    let scheme = base.scheme_str().unwrap_or("http");
    if let Some(rest) = reference.strip_prefix("//") {
        return parse_uri(reference, &format!("{scheme}://{rest}"));
    }

    let authority = base.authority().ok_or_else(|| {
        VcrError::InvalidUri(format!(
            "'{reference}': cannot resolve against '{base}' without a host"
        ))
    })?;

    let path_and_query = if reference.starts_with('/') {
        reference.to_string()
    } else if reference.starts_with('?') {
        format!("{}{reference}", base.path())
    } else {
        let dir = base.path().rsplit_once('/').map_or("", |(dir, _)| dir);
        format!("{dir}/{reference}")
    };

    parse_uri(reference, &format!("{scheme}://{authority}{path_and_query}"))
}

fn parse_uri(reference: &str, candidate: &str) -> Result<Uri> {
    candidate
        .parse::<Uri>()
        .map_err(|e| VcrError::InvalidUri(format!("'{reference}': {e}")))
}
