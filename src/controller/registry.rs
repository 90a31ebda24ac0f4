//! Name → controller lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::ServicesConfig;
use crate::controller::{
    Controller, ControllerError, ControllerExecutor, ServiceClient, ServiceController, ServiceError,
    SystemController,
};
use crate::http::{Request, Response};
use crate::routing::{ActionRef, Params};

/// Controllers available to named route actions.
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `system` and `services` controllers.
    pub fn with_builtins(services: &ServicesConfig) -> Result<Self, ServiceError> {
        let mut registry = Self::new();
        registry.register("system", SystemController);
        registry.register("services", ServiceController::new(ServiceClient::new(services)?));
        Ok(registry)
    }

    /// Register a controller. A second registration under the same name
    /// replaces the first.
    pub fn register(&mut self, name: impl Into<String>, controller: impl Controller + 'static) -> &mut Self {
        let name = name.into();
        if self.controllers.insert(name.clone(), Arc::new(controller)).is_some() {
            tracing::warn!(controller = %name, "Controller registered twice, keeping the latest");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ControllerExecutor for ControllerRegistry {
    fn execute(
        &self,
        action: &ActionRef,
        request: &Request,
        response: &mut Response,
        params: &mut Params,
    ) -> Result<(), ControllerError> {
        let controller = self
            .get(&action.controller)
            .ok_or_else(|| ControllerError::UnknownController(action.controller.clone()))?;

        if !controller.actions().contains(&action.action.as_str()) {
            return Err(ControllerError::UnknownAction {
                controller: action.controller.clone(),
                action: action.action.clone(),
            });
        }

        tracing::debug!(action = %action, "Executing controller action");
        controller.invoke(&action.action, request, response, params)
    }

    fn knows(&self, action: &ActionRef) -> bool {
        self.get(&action.controller)
            .is_some_and(|c| c.actions().contains(&action.action.as_str()))
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.names())
            .finish()
    }
}
