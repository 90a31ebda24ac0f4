//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     template + methods + action
//!     → route.rs (normalize template, build Route::Uri / Route::Fallback)
//!     → pattern.rs (compile placeholders into an anchored regex)
//!     → router.rs (append to routes or fallbacks, order preserved)
//!
//! Incoming Request (method, path):
//!     → router.rs (url-decode path, scan routes in order)
//!     → route.rs (method gate, regex match, typed params)
//!     → no match: 404, scan fallbacks for the not-found hook
//!     → Route::dispatch (inline handler or named controller action)
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once at registration, router immutable afterwards
//! - First match wins, registration order only (no specificity ranking)
//! - A miss is a 404 response, never an error
//! - Malformed routes are rejected at registration, not at request time

pub mod action;
pub mod error;
pub mod method;
pub mod params;
pub mod pattern;
pub mod route;
pub mod router;

pub use action::{Action, ActionRef, Handler};
pub use error::RouteError;
pub use method::MethodSet;
pub use params::{ParamValue, Params};
pub use pattern::{CompiledPattern, ParamType};
pub use route::{FallbackRoute, Route, RouteKey, RouteSummary, RouteTarget, SpecialCode, UriRoute};
pub use router::{Router, Selection};
