//! Controller subsystem.
//!
//! # Data Flow
//! ```text
//! Route::dispatch (named action "show@users")
//!     → ControllerExecutor::execute (registry.rs looks up "users")
//!     → Controller::invoke("show", request, response, params)
//!     → controller fills the response
//! ```
//!
//! # Design Decisions
//! - Controllers are registered by name at startup, never discovered
//! - Unknown controllers and actions are reported as errors; the router
//!   turns them into a 500 response
//! - Route tables loaded from config are checked against the registry
//!   before they go live

pub mod registry;
pub mod service;
pub mod system;

use thiserror::Error;

use crate::http::response::ResponseError;
use crate::http::{Request, Response};
use crate::routing::{ActionRef, Params};

pub use registry::ControllerRegistry;
pub use service::{ServiceClient, ServiceController, ServiceError};
pub use system::SystemController;

/// Errors reported by controller execution.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no controller named {0:?}")]
    UnknownController(String),

    #[error("controller {controller:?} has no action {action:?}")]
    UnknownAction { controller: String, action: String },

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("action failed: {0}")]
    Failed(String),
}

/// Runs named actions on behalf of the router.
pub trait ControllerExecutor: Send + Sync {
    fn execute(
        &self,
        action: &ActionRef,
        request: &Request,
        response: &mut Response,
        params: &mut Params,
    ) -> Result<(), ControllerError>;

    /// Whether `action` can be executed. Used to reject route tables that
    /// reference missing actions before they are installed.
    fn knows(&self, _action: &ActionRef) -> bool {
        true
    }
}

/// A named group of actions.
pub trait Controller: Send + Sync {
    /// Action names this controller answers to.
    fn actions(&self) -> &'static [&'static str];

    fn invoke(
        &self,
        action: &str,
        request: &Request,
        response: &mut Response,
        params: &mut Params,
    ) -> Result<(), ControllerError>;
}
