//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all handler)
//!     → request.rs (buffer body, request ID)
//!     → routing layer selects and dispatches a route
//!     → response.rs (status, headers, body written by the action)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, Request, RequestError, X_REQUEST_ID};
pub use response::{Response, ResponseError};
pub use server::HttpServer;
