//! Calls to remote interface services.
//!
//! A service exposes its actions at `{host}/API/{service}/{action}`; the
//! caller POSTs a single form field `data` holding the JSON details and gets
//! JSON back.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::config::schema::ServicesConfig;
use crate::controller::{Controller, ControllerError};
use crate::http::{Request, Response};
use crate::routing::Params;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service reply is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for interface services.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    host: String,
}

impl ServiceClient {
    pub fn new(config: &ServicesConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            host: config.interface_host.trim_end_matches('/').to_string(),
        })
    }

    /// URL for an action. Empty names fall back to `Default` and `Index`.
    pub fn endpoint(&self, service: &str, action: &str) -> String {
        let service = if service.is_empty() { "Default" } else { service };
        let action = if action.is_empty() { "Index" } else { action };
        format!("{}/API/{}/{}", self.host, service, action)
    }

    /// Invoke `service/action` with `details` and decode the JSON reply.
    pub async fn call(&self, service: &str, action: &str, details: &Value) -> Result<Value, ServiceError> {
        let url = self.endpoint(service, action);
        tracing::debug!(url = %url, "Calling interface service");

        let res = self
            .client
            .post(&url)
            .form(&[("data", details.to_string())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Interface service returned an error");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Forwards `{service}` / `{action}` route parameters to a remote service.
///
/// The JSON request body is sent as details when present, otherwise the
/// route parameters are. Needs a multi-threaded Tokio runtime, since the
/// synchronous controller blocks on the outbound call.
#[derive(Debug, Clone)]
pub struct ServiceController {
    client: ServiceClient,
}

impl ServiceController {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

impl Controller for ServiceController {
    fn actions(&self) -> &'static [&'static str] {
        &["forward"]
    }

    fn invoke(
        &self,
        _action: &str,
        request: &Request,
        response: &mut Response,
        params: &mut Params,
    ) -> Result<(), ControllerError> {
        let handle = Handle::try_current()
            .ok()
            .filter(|h| h.runtime_flavor() == RuntimeFlavor::MultiThread)
            .ok_or_else(|| ControllerError::Failed("service calls need a multi-threaded runtime".into()))?;

        let service = params.get("service").map(|v| v.to_string()).unwrap_or_default();
        let action = params.get("action").map(|v| v.to_string()).unwrap_or_default();
        let details = if request.body().is_empty() {
            serde_json::to_value(&*params).map_err(|e| ControllerError::Failed(e.to_string()))?
        } else {
            request.json::<Value>().map_err(|e| ControllerError::Failed(e.to_string()))?
        };

        let reply = tokio::task::block_in_place(|| {
            handle.block_on(self.client.call(&service, &action, &details))
        });

        match reply {
            Ok(value) => response.json(&value)?,
            Err(e) => {
                tracing::warn!(service = %service, action = %action, error = %e, "Forwarded call failed");
                response.change_status(502)?;
                response.write(e.to_string());
            }
        }
        Ok(())
    }
}
