//! A single routing rule.
//!
//! # Responsibilities
//! - Normalize and compile the URI template at construction
//! - Gate on HTTP method, match the decoded path, type the parameters
//! - Run the action against the request/response pair
//!
//! # Design Decisions
//! - Regular and fallback rules share one type as enum variants
//! - Fallback rules carry a `SpecialCode` and an empty pattern
//! - Dispatch failures become a 500 response, never a panic or error

use std::fmt;
use std::str::FromStr;

use axum::http::{Method, StatusCode};
use serde::Serialize;

use crate::controller::ControllerExecutor;
use crate::http::{Request, Response};
use crate::routing::action::Action;
use crate::routing::error::RouteError;
use crate::routing::method::MethodSet;
use crate::routing::params::Params;
use crate::routing::pattern::CompiledPattern;

/// Body written when a route's action cannot be carried out.
pub const UNDEFINED_BEHAVIOUR: &str = "Undefined route behaviour";

/// Reserved codes for routes that are not keyed by a URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialCode {
    /// Used when no URI route matched the request.
    NotFound,
}

impl SpecialCode {
    pub fn code(self) -> u16 {
        match self {
            SpecialCode::NotFound => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpecialCode::NotFound => "not_found",
        }
    }
}

impl FromStr for SpecialCode {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not_found" | "notfound" | "0" => Ok(SpecialCode::NotFound),
            _ => Err(RouteError::UnknownSpecial(s.to_string())),
        }
    }
}

impl fmt::Display for SpecialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a route is keyed by when it is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKey {
    Uri(String),
    Special(SpecialCode),
}

impl From<&str> for RouteKey {
    fn from(s: &str) -> Self {
        RouteKey::Uri(s.to_string())
    }
}

impl From<String> for RouteKey {
    fn from(s: String) -> Self {
        RouteKey::Uri(s)
    }
}

impl From<SpecialCode> for RouteKey {
    fn from(code: SpecialCode) -> Self {
        RouteKey::Special(code)
    }
}

/// What a route is asked to match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget<'a> {
    /// A url-decoded request path.
    Path(&'a str),
    /// A reserved code, used when looking up fallbacks.
    Special(SpecialCode),
}

/// A rule keyed by a URI template.
#[derive(Debug, Clone)]
pub struct UriRoute {
    template: String,
    pattern: CompiledPattern,
    methods: MethodSet,
    action: Action,
}

impl UriRoute {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }
}

/// A rule keyed by a reserved code such as not-found.
#[derive(Debug, Clone)]
pub struct FallbackRoute {
    code: SpecialCode,
    methods: MethodSet,
    action: Action,
}

impl FallbackRoute {
    pub fn code(&self) -> SpecialCode {
        self.code
    }
}

/// One routing rule.
#[derive(Debug, Clone)]
pub enum Route {
    Uri(UriRoute),
    Fallback(FallbackRoute),
}

impl Route {
    /// Build a URI route.
    ///
    /// The template is trimmed of every leading and trailing `/` and given
    /// exactly one leading slash, so `users/`, `/users` and `//users//`
    /// all become `/users`.
    pub fn uri(template: &str, action: Action, methods: MethodSet) -> Result<Self, RouteError> {
        if template.is_empty() {
            return Err(RouteError::EmptyTemplate);
        }
        let template = normalize_template(template);
        if let MethodSet::Only(list) = &methods {
            if list.is_empty() {
                return Err(RouteError::EmptyMethods(template));
            }
        }
        let pattern = CompiledPattern::compile(&template)?;

        Ok(Route::Uri(UriRoute {
            template,
            pattern,
            methods,
            action,
        }))
    }

    /// Build a fallback route for a reserved code.
    pub fn fallback(code: SpecialCode, action: Action, methods: MethodSet) -> Result<Self, RouteError> {
        if let MethodSet::Only(list) = &methods {
            if list.is_empty() {
                return Err(RouteError::EmptyMethods(code.to_string()));
            }
        }
        Ok(Route::Fallback(FallbackRoute {
            code,
            methods,
            action,
        }))
    }

    /// Build either kind from a declaration key.
    pub fn new(key: RouteKey, action: Action, methods: MethodSet) -> Result<Self, RouteError> {
        match key {
            RouteKey::Uri(template) => Route::uri(&template, action, methods),
            RouteKey::Special(code) => Route::fallback(code, action, methods),
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Route::Fallback(_))
    }

    pub fn methods(&self) -> &MethodSet {
        match self {
            Route::Uri(r) => &r.methods,
            Route::Fallback(r) => &r.methods,
        }
    }

    pub fn action(&self) -> &Action {
        match self {
            Route::Uri(r) => &r.action,
            Route::Fallback(r) => &r.action,
        }
    }

    /// The compiled pattern, `None` for fallback routes.
    pub fn pattern(&self) -> Option<&CompiledPattern> {
        match self {
            Route::Uri(r) => Some(&r.pattern),
            Route::Fallback(_) => None,
        }
    }

    /// Template for URI routes, special code name for fallbacks.
    pub fn label(&self) -> String {
        match self {
            Route::Uri(r) => r.template.clone(),
            Route::Fallback(r) => format!("#{}", r.code),
        }
    }

    /// Try this route against a target and method.
    ///
    /// Returns the extracted parameters on success, `None` otherwise. A
    /// parameterless success is an empty `Params`, not `None`.
    pub fn matches(&self, target: RouteTarget<'_>, method: &Method) -> Option<Params> {
        if !self.methods().allows(method) {
            return None;
        }
        match (self, target) {
            (Route::Uri(r), RouteTarget::Path(path)) => r.pattern.extract(path),
            (Route::Fallback(r), RouteTarget::Special(code)) if r.code == code => Some(Params::new()),
            _ => None,
        }
    }

    /// Run the action.
    ///
    /// Named actions go through `executor`. A missing executor, or one that
    /// fails, leaves a 500 response with a diagnostic body.
    pub fn dispatch(
        &self,
        request: &Request,
        response: &mut Response,
        params: &mut Params,
        executor: Option<&dyn ControllerExecutor>,
    ) {
        match self.action() {
            Action::Inline(handler) => handler(request, response, params),
            Action::Named(reference) => {
                let Some(executor) = executor else {
                    tracing::error!(
                        route = %self.label(),
                        action = %reference,
                        "Named action without a controller executor"
                    );
                    response.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                    response.write(UNDEFINED_BEHAVIOUR);
                    return;
                };
                if let Err(e) = executor.execute(reference, request, response, params) {
                    tracing::error!(
                        route = %self.label(),
                        action = %reference,
                        error = %e,
                        "Controller action failed"
                    );
                    response.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                    response.clear_body();
                    response.write(format!("{}: {}", UNDEFINED_BEHAVIOUR, e));
                }
            }
        }
    }

    /// Serializable description, used by the CLI.
    pub fn summary(&self) -> RouteSummary {
        let (kind, pattern, params) = match self {
            Route::Uri(r) => (
                "uri",
                r.pattern.source().to_string(),
                r.pattern
                    .names()
                    .iter()
                    .zip(r.pattern.types())
                    .map(|(n, t)| ParamSummary {
                        name: n.clone(),
                        kind: t.name(),
                    })
                    .collect(),
            ),
            Route::Fallback(_) => ("fallback", String::new(), Vec::new()),
        };
        RouteSummary {
            kind,
            route: self.label(),
            pattern,
            methods: self.methods().names(),
            params,
            action: self.action().label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub kind: &'static str,
    pub route: String,
    pub pattern: String,
    pub methods: Vec<String>,
    pub params: Vec<ParamSummary>,
    pub action: String,
}

fn normalize_template(template: &str) -> String {
    format!("/{}", template.trim_matches('/'))
}
