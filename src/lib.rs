//! pathway: URL routing for request dispatch.
//!
//! Route templates such as `/users/{id:signed_integer}` compile to anchored
//! regexes; a `Router` holds them in registration order, picks the first one
//! that accepts the request's method and decoded path, extracts typed
//! parameters and runs the route's action. Nothing matching means 404 plus
//! the `not_found` fallback route when one is registered.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::Router::select ──▶ Selection
//!                       (axum)                                        │
//!                                                                     ▼
//!     Client Response                                   routing::Router::dispatch
//!     ◀────────────── http::Response ◀── inline handler or controller action
//!                                              │
//!                                              └──▶ controller::service (API calls)
//!
//!     Cross-cutting: config (TOML + hot reload), observability, lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod controller;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::AppConfig;
pub use controller::{Controller, ControllerRegistry};
pub use http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use routing::{Action, MethodSet, Params, Route, Router};
