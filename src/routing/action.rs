//! What a route does once it has been selected.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::http::{Request, Response};
use crate::routing::error::RouteError;
use crate::routing::params::Params;

/// Inline request handler.
pub type Handler = Arc<dyn Fn(&Request, &mut Response, &mut Params) + Send + Sync>;

/// Reference to a controller action, written `action@controller`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionRef {
    pub controller: String,
    pub action: String,
}

impl ActionRef {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl FromStr for ActionRef {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RouteError::InvalidAction(s.to_string());
        let (action, controller) = s.trim().split_once('@').ok_or_else(invalid)?;
        if action.is_empty() || controller.is_empty() || controller.contains('@') {
            return Err(invalid());
        }
        Ok(Self::new(controller, action))
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.action, self.controller)
    }
}

/// A route's action: a closure, or a controller action resolved at
/// dispatch time through the router's `ControllerExecutor`.
#[derive(Clone)]
pub enum Action {
    Inline(Handler),
    Named(ActionRef),
}

impl Action {
    /// Wrap a closure.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&Request, &mut Response, &mut Params) + Send + Sync + 'static,
    {
        Action::Inline(Arc::new(f))
    }

    /// Parse an `action@controller` reference.
    pub fn named(reference: &str) -> Result<Self, RouteError> {
        reference.parse().map(Action::Named)
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> String {
        match self {
            Action::Inline(_) => "<inline>".to_string(),
            Action::Named(r) => r.to_string(),
        }
    }
}

impl From<ActionRef> for Action {
    fn from(r: ActionRef) -> Self {
        Action::Named(r)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Inline(_) => f.write_str("Action::Inline(..)"),
            Action::Named(r) => f.debug_tuple("Action::Named").field(r).finish(),
        }
    }
}
