//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener
//! - Dispatch requests to the routing engine
//! - Swap in rebuilt route tables on config reload
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{self, StatusCode},
    response::IntoResponse,
    routing::any,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{build_router, AppConfig, ConfigError};
use crate::controller::ControllerRegistry;
use crate::http::request::{MakeRequestUuid, Request};
use crate::observability::metrics;
use crate::routing::Router;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ArcSwap<Router>>,
    pub body_limit: usize,
}

/// HTTP server hosting a route table.
pub struct HttpServer {
    app: axum::Router,
    config: AppConfig,
    router: Arc<ArcSwap<Router>>,
    controllers: Option<Arc<ControllerRegistry>>,
}

impl HttpServer {
    /// Build the route table from `config.routes`, running named actions
    /// through `controllers`. Reloaded configs are rebuilt the same way.
    pub fn new(config: AppConfig, controllers: Arc<ControllerRegistry>) -> Result<Self, ConfigError> {
        let router = build_router(&config.routes, controllers.clone())?;
        Ok(Self::assemble(config, router, Some(controllers)))
    }

    /// Host a router built in code. Config reloads leave it untouched.
    pub fn with_router(config: AppConfig, router: Router) -> Self {
        Self::assemble(config, router, None)
    }

    fn assemble(config: AppConfig, router: Router, controllers: Option<Arc<ControllerRegistry>>) -> Self {
        metrics::record_route_table_size(router.len());
        let router = Arc::new(ArcSwap::from_pointee(router));
        let state = AppState {
            router: router.clone(),
            body_limit: config.limits.request_body_bytes,
        };
        let app = Self::build_app(&config, state);
        Self {
            app,
            config,
            router,
            controllers,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost first: request ID is set before the trace span opens.
    /// The timeout sits innermost since it needs a `Default` response body.
    #[allow(deprecated)]
    fn build_app(config: &AppConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(config.limits.request_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Shared handle on the live route table.
    pub fn router_handle(&self) -> Arc<ArcSwap<Router>> {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, applying configs from `updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.router.load().len(),
            "HTTP server starting"
        );

        let handle = self.router.clone();
        let controllers = self.controllers.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        let reloader = tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = updates.recv() => match update {
                        Some(config) => apply_config(&handle, controllers.as_ref(), &config),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Rebuild the route table from `config` and swap it in.
///
/// Only routes are reloaded; listener, limits and timeouts need a restart.
fn apply_config(
    handle: &ArcSwap<Router>,
    controllers: Option<&Arc<ControllerRegistry>>,
    config: &AppConfig,
) {
    let Some(controllers) = controllers else {
        tracing::warn!("Route table was built in code; ignoring config reload");
        return;
    };
    match build_router(&config.routes, controllers.clone()) {
        Ok(router) => {
            let routes = router.len();
            handle.store(Arc::new(router));
            metrics::record_route_table_size(routes);
            tracing::info!(routes, "Route table reloaded");
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected reloaded route table. Keeping current routes.");
        }
    }
}

/// Catch-all handler: every request goes through the route table.
async fn dispatch_handler(
    State(state): State<AppState>,
    request: http::Request<Body>,
) -> axum::response::Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let request = match Request::from_http(request, state.body_limit).await {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(method = %method, error = %e, "Rejected request body");
            metrics::record_request(&method, StatusCode::PAYLOAD_TOO_LARGE.as_u16(), "none", start);
            return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response();
        }
    };

    let router = state.router.load_full();
    let selection = router.select(&request);
    let label = selection.label();
    let unmatched = selection.route().is_none();
    let response = router.dispatch(selection, &request);

    if unmatched {
        metrics::record_not_found(&method);
    }
    tracing::debug!(
        request_id = request.request_id().unwrap_or("unknown"),
        method = %method,
        path = %request.path(),
        route = %label,
        status = response.status().as_u16(),
        "Request dispatched"
    );
    metrics::record_request(&method, response.status().as_u16(), &label, start);

    response.into_response()
}
