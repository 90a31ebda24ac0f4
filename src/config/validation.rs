//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts > 0, addresses parse)
//! - Check every route entry builds: key shape, methods, action, template
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::routes::route_from_config;
use crate::config::schema::AppConfig;
use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid listener address: {0}")]
    BindAddress(String),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(String),

    #[error("limits.request_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("invalid services.interface_host {host:?}: {reason}")]
    ServiceHost { host: String, reason: String },

    #[error("route #{index}: exactly one of `uri` or `special` must be set")]
    RouteKey { index: usize },

    #[error("route #{index}: {source}")]
    Route {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("route #{index}: no controller action {action}")]
    UnknownAction { index: usize, action: String },
}

/// Check a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.limits.request_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.services.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("services.timeout_secs"));
    }
    if config.services.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("services.connect_timeout_secs"));
    }
    match url::Url::parse(&config.services.interface_host) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::ServiceHost {
            host: config.services.interface_host.clone(),
            reason: format!("unsupported scheme {}", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::ServiceHost {
            host: config.services.interface_host.clone(),
            reason: e.to_string(),
        }),
    }

    for (index, entry) in config.routes.iter().enumerate() {
        if let Err(e) = route_from_config(index, entry) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
