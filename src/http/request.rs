//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Buffer the body within the configured limit
//! - Expose the routing-relevant parts (method, path) to the router
//!
//! # Design Decisions
//! - Handlers get an owned, fully buffered request; no streaming
//! - Request ID added as early as possible for tracing

use axum::body::{Body, Bytes};
use axum::http::{self, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Failure to turn an incoming HTTP request into a `Request`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error("invalid request URI {0:?}")]
    InvalidUri(String),
}

/// A buffered HTTP request as seen by route handlers.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Request with an empty body, for URIs known to be valid.
    ///
    /// An unparsable `uri` (such as `/a b`) is replaced by `/` and will be
    /// routed as the root. Use [`Request::try_new`] for untrusted input.
    pub fn new(method: Method, uri: &str) -> Self {
        Self::try_new(method.clone(), uri)
            .unwrap_or_else(|_| Self::with_uri(method, Uri::from_static("/")))
    }

    /// Request with an empty body. `uri` may carry a query string.
    pub fn try_new(method: Method, uri: &str) -> Result<Self, RequestError> {
        let parsed = uri
            .parse::<Uri>()
            .map_err(|_| RequestError::InvalidUri(uri.to_string()))?;
        Ok(Self::with_uri(method, parsed))
    }

    fn with_uri(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Builder-style header setter; invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Buffer an axum request, failing if the body exceeds `limit` bytes.
    pub async fn from_http(request: http::Request<Body>, limit: usize) -> Result<Self, RequestError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|_| RequestError::BodyTooLarge(limit))?;
        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Raw (still percent-encoded) path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
