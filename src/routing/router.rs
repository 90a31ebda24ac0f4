//! Route registry and request resolution.
//!
//! # Responsibilities
//! - Store URI routes and fallback routes in registration order
//! - Select the route for a request (first match wins)
//! - Dispatch the selected route exactly once
//!
//! # Design Decisions
//! - Explicit value, no process-wide registry; build, then share via Arc
//! - Selection is pure and separate from dispatch
//! - No match → 404 first, then the not-found fallback may take over

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axum::http::{Method, StatusCode};

use crate::controller::ControllerExecutor;
use crate::http::{Request, Response};
use crate::routing::action::Action;
use crate::routing::error::RouteError;
use crate::routing::method::MethodSet;
use crate::routing::params::Params;
use crate::routing::route::{Route, RouteKey, RouteSummary, RouteTarget, SpecialCode};

/// Outcome of route selection for one request.
#[derive(Debug)]
pub enum Selection<'r> {
    /// A URI route matched.
    Matched { route: &'r Route, params: Params },
    /// Nothing matched; a not-found fallback will handle it.
    Fallback { route: &'r Route },
    /// Nothing matched and no fallback applies.
    Unmatched,
}

impl<'r> Selection<'r> {
    pub fn route(&self) -> Option<&'r Route> {
        match self {
            Selection::Matched { route, .. } | Selection::Fallback { route } => Some(*route),
            Selection::Unmatched => None,
        }
    }

    pub fn params(&self) -> Option<&Params> {
        match self {
            Selection::Matched { params, .. } => Some(params),
            _ => None,
        }
    }

    /// True when a URI route (not a fallback) was selected.
    pub fn is_match(&self) -> bool {
        matches!(self, Selection::Matched { .. })
    }

    /// Route label for logs and metrics.
    pub fn label(&self) -> String {
        self.route()
            .map(Route::label)
            .unwrap_or_else(|| "none".to_string())
    }
}

/// Ordered route registry with a resolver on top.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
    fallbacks: Vec<Route>,
    executor: Option<Arc<dyn ControllerExecutor>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the executor used for named controller actions.
    pub fn with_executor(mut self, executor: Arc<dyn ControllerExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn executor(&self) -> Option<&Arc<dyn ControllerExecutor>> {
        self.executor.as_ref()
    }

    /// Append a route. URI routes and fallbacks go to separate lists;
    /// duplicates are allowed and the earlier one wins.
    pub fn register(&mut self, route: Route) -> &mut Self {
        tracing::debug!(
            route = %route.label(),
            methods = %route.methods(),
            action = %route.action().label(),
            "Route registered"
        );
        if route.is_special() {
            self.fallbacks.push(route);
        } else {
            self.routes.push(route);
        }
        self
    }

    /// Build and register a route in one step.
    pub fn add(
        &mut self,
        key: impl Into<RouteKey>,
        action: Action,
        methods: MethodSet,
    ) -> Result<&mut Self, RouteError> {
        let route = Route::new(key.into(), action, methods)?;
        Ok(self.register(route))
    }

    pub fn get(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, Method::GET.into())
    }

    pub fn post(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, Method::POST.into())
    }

    pub fn put(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, Method::PUT.into())
    }

    pub fn delete(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, Method::DELETE.into())
    }

    pub fn head(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, Method::HEAD.into())
    }

    pub fn patch(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, Method::PATCH.into())
    }

    pub fn options(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, Method::OPTIONS.into())
    }

    /// Every method, including extension methods.
    pub fn any(&mut self, key: impl Into<RouteKey>, action: Action) -> Result<&mut Self, RouteError> {
        self.add(key, action, MethodSet::any())
    }

    /// An explicit method list; an empty list is rejected.
    pub fn matching<I>(
        &mut self,
        methods: I,
        key: impl Into<RouteKey>,
        action: Action,
    ) -> Result<&mut Self, RouteError>
    where
        I: IntoIterator<Item = Method>,
    {
        let key = key.into();
        let methods = MethodSet::only(methods).map_err(|_| {
            RouteError::EmptyMethods(match &key {
                RouteKey::Uri(t) => t.clone(),
                RouteKey::Special(c) => c.to_string(),
            })
        })?;
        self.add(key, action, methods)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn fallbacks(&self) -> &[Route] {
        &self.fallbacks
    }

    /// Total number of registered routes of both kinds.
    pub fn len(&self) -> usize {
        self.routes.len() + self.fallbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .chain(self.fallbacks.iter())
            .map(Route::summary)
            .collect()
    }

    /// Pick the route that handles `request`. No side effects.
    pub fn select(&self, request: &Request) -> Selection<'_> {
        let path = decode_path(request.path());
        let method = request.method();

        for route in &self.routes {
            if let Some(params) = route.matches(RouteTarget::Path(&path), method) {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    route = %route.label(),
                    "Route matched"
                );
                return Selection::Matched { route, params };
            }
        }

        let not_found = RouteTarget::Special(SpecialCode::NotFound);
        match self.fallbacks.iter().find(|r| r.matches(not_found, method).is_some()) {
            Some(route) => {
                tracing::debug!(method = %method, path = %path, "No route matched, using not-found fallback");
                Selection::Fallback { route }
            }
            None => {
                tracing::debug!(method = %method, path = %path, "No route matched");
                Selection::Unmatched
            }
        }
    }

    /// Run a selection and produce the response.
    pub fn dispatch(&self, selection: Selection<'_>, request: &Request) -> Response {
        let mut response = Response::new();
        let executor = self.executor.as_deref();
        match selection {
            Selection::Matched { route, mut params } => {
                route.dispatch(request, &mut response, &mut params, executor);
            }
            Selection::Fallback { route } => {
                response.set_status(StatusCode::NOT_FOUND);
                route.dispatch(request, &mut response, &mut Params::new(), executor);
            }
            Selection::Unmatched => {
                response.set_status(StatusCode::NOT_FOUND);
            }
        }
        response
    }

    /// Select and dispatch. Always returns a response.
    pub fn resolve(&self, request: &Request) -> Response {
        let selection = self.select(request);
        self.dispatch(selection, request)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("fallbacks", &self.fallbacks)
            .field("executor", &self.executor.is_some())
            .finish()
    }
}

/// Form-style url decoding: `+` is a space, `%XX` is a byte.
fn decode_path(raw: &str) -> Cow<'_, str> {
    if !raw.contains(&['%', '+'][..]) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(body: &'static str) -> Action {
        Action::handler(move |_, res, _| res.write(body))
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/plain"), "/plain");
        assert_eq!(decode_path("/a%20b"), "/a b");
        assert_eq!(decode_path("/a+b"), "/a b");
        assert_eq!(decode_path("/x%40y.io"), "/x@y.io");
        assert_eq!(decode_path("/bad%ff"), "/bad\u{fffd}");
    }

    #[test]
    fn test_register_splits_lists() {
        let mut router = Router::new();
        router.get("/a", write("a")).unwrap();
        router.get(SpecialCode::NotFound, write("nf")).unwrap();
        router.any("/b", write("b")).unwrap();

        assert_eq!(router.routes().len(), 2);
        assert_eq!(router.fallbacks().len(), 1);
        assert_eq!(router.len(), 3);
    }

    #[test]
    fn test_shorthand_methods() {
        let mut router = Router::new();
        router
            .post("/p", write("p"))
            .unwrap()
            .patch("/p", write("patch"))
            .unwrap();

        assert_eq!(router.resolve(&Request::new(Method::POST, "/p")).body_text(), "p");
        assert_eq!(router.resolve(&Request::new(Method::PATCH, "/p")).body_text(), "patch");
        assert_eq!(
            router.resolve(&Request::new(Method::GET, "/p")).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_matching_rejects_empty_list() {
        let mut router = Router::new();
        let err = router.matching(Vec::new(), "/x", write("x")).unwrap_err();
        assert!(matches!(err, RouteError::EmptyMethods(ref t) if t == "/x"));
        assert!(router.is_empty());
    }

    #[test]
    fn test_select_decodes_before_matching() {
        let mut router = Router::new();
        router.get("/files/{name}", write("f")).unwrap();
        let request = Request::new(Method::GET, "/files/annual%20report");
        let selection = router.select(&request);
        assert_eq!(
            selection.params().and_then(|p| p.get_str("name")),
            Some("annual report")
        );
    }

    #[test]
    fn test_selection_labels() {
        let mut router = Router::new();
        router.get("/a", write("a")).unwrap();
        assert_eq!(router.select(&Request::new(Method::GET, "/a")).label(), "/a");
        assert_eq!(router.select(&Request::new(Method::GET, "/b")).label(), "none");
    }
}
