//! Route table construction from configuration.

use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::schema::RouteConfig;
use crate::config::validation::ValidationError;
use crate::controller::ControllerExecutor;
use crate::routing::{Action, MethodSet, Route, RouteKey, Router};

/// The key an entry declares: its URI template or special code.
pub fn route_key(index: usize, entry: &RouteConfig) -> Result<RouteKey, ValidationError> {
    match (&entry.uri, &entry.special) {
        (Some(uri), None) => Ok(RouteKey::Uri(uri.clone())),
        (None, Some(special)) => special
            .parse()
            .map(RouteKey::Special)
            .map_err(|source| ValidationError::Route { index, source }),
        _ => Err(ValidationError::RouteKey { index }),
    }
}

/// Build one route from a config entry.
pub fn route_from_config(index: usize, entry: &RouteConfig) -> Result<Route, ValidationError> {
    let key = route_key(index, entry)?;
    let to_validation = |source| ValidationError::Route { index, source };

    let methods = match &entry.methods {
        Some(names) => MethodSet::parse(names).map_err(to_validation)?,
        None => MethodSet::default(),
    };
    let action = Action::named(&entry.action).map_err(to_validation)?;
    Route::new(key, action, methods).map_err(to_validation)
}

/// Build a router for `entries`, refusing actions `executor` cannot run.
pub fn build_router(
    entries: &[RouteConfig],
    executor: Arc<dyn ControllerExecutor>,
) -> Result<Router, ConfigError> {
    let mut errors = Vec::new();
    let mut router = Router::new();

    for (index, entry) in entries.iter().enumerate() {
        let route = match route_from_config(index, entry) {
            Ok(route) => route,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        if let Action::Named(reference) = route.action() {
            if !executor.knows(reference) {
                errors.push(ValidationError::UnknownAction {
                    index,
                    action: reference.to_string(),
                });
                continue;
            }
        }
        router.register(route);
    }

    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }
    tracing::info!(routes = router.len(), "Route table built");
    Ok(router.with_executor(executor))
}
