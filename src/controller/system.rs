//! Built-in `system` controller.

use serde::Serialize;

use crate::controller::{Controller, ControllerError};
use crate::http::{Request, Response};
use crate::routing::Params;

#[derive(Serialize)]
pub struct SystemStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
struct Echo<'a> {
    method: &'a str,
    path: &'a str,
    params: &'a Params,
}

#[derive(Serialize)]
struct NotFound<'a> {
    error: &'static str,
    path: &'a str,
}

/// Status, parameter echo and a JSON not-found page.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemController;

impl Controller for SystemController {
    fn actions(&self) -> &'static [&'static str] {
        &["status", "params", "not_found"]
    }

    fn invoke(
        &self,
        action: &str,
        request: &Request,
        response: &mut Response,
        params: &mut Params,
    ) -> Result<(), ControllerError> {
        match action {
            "status" => response.json(&SystemStatus {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
                status: "operational",
            })?,
            "params" => response.json(&Echo {
                method: request.method().as_str(),
                path: request.path(),
                params,
            })?,
            "not_found" => {
                response.change_status(404)?;
                response.json(&NotFound {
                    error: "not found",
                    path: request.path(),
                })?;
            }
            other => {
                return Err(ControllerError::UnknownAction {
                    controller: "system".to_string(),
                    action: other.to_string(),
                })
            }
        }
        Ok(())
    }
}
