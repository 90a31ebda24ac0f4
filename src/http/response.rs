//! Response building.
//!
//! # Responsibilities
//! - Give handlers a mutable status/headers/body buffer
//! - Validate status codes set by controllers
//! - Convert into an axum response at the edge
//!
//! # Design Decisions
//! - Status defaults to 200 OK until a handler says otherwise
//! - Body is buffered; handlers append with `write`

use std::borrow::Cow;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    /// Not a status code with a registered reason phrase.
    #[error("unrecognized HTTP status code: {0}")]
    UnknownStatus(u16),

    #[error("failed to encode JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// A response being populated by a route handler.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Set the status from a raw code, rejecting codes without a standard
    /// reason phrase (e.g. 299 or 600).
    pub fn change_status(&mut self, code: u16) -> Result<(), ResponseError> {
        let status = StatusCode::from_u16(code)
            .ok()
            .filter(|s| s.canonical_reason().is_some())
            .ok_or(ResponseError::UnknownStatus(code))?;
        self.status = status;
        Ok(())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Append to the body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Replace the body with `value` as JSON and set the content type.
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<(), ResponseError> {
        self.body = serde_json::to_vec(value)?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
