//! Local JSON API.
//!
//! # Responsibilities
//! - Expose routing, source selection and verification to the UI collaborator
//! - Wire up middleware (request id, tracing, timeout, body limit)
//! - Serve until the shutdown broadcast fires
//!
//! # Endpoints
//! - `GET  /health`
//! - `GET  /sources`, `GET /sources/available`
//! - `GET  /sources/current`, `PUT /sources/current {key}`
//! - `POST /route {taskId?, request}`
//! - `POST /check/request {descriptor, request}`
//! - `POST /check/response {descriptor?, response}`

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::LabConfig;
use crate::http::{ApiRequest, ApiResponse};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{Router as SourceRouter, SourceInfo};
use crate::verify::{verify_request, verify_response, ExpectedResponseDescriptor, SolutionDescriptor, Verdict};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SourceRouter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBody {
    #[serde(default)]
    pub task_id: Option<String>,
    pub request: ApiRequest,
}

#[derive(Debug, Deserialize)]
pub struct SwitchBody {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct SwitchResult {
    pub switched: bool,
    pub current: SourceInfo,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequestBody {
    pub descriptor: SolutionDescriptor,
    pub request: ApiRequest,
}

#[derive(Debug, Deserialize)]
pub struct CheckResponseBody {
    #[serde(default)]
    pub descriptor: Option<ExpectedResponseDescriptor>,
    pub response: ApiResponse,
}

/// Build the axum app with all middleware layers.
#[allow(deprecated)]
pub fn build_app(state: AppState, config: &LabConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sources", get(list_sources))
        .route("/sources/available", get(list_available_sources))
        .route("/sources/current", get(current_source).put(switch_source))
        .route("/route", post(route_request))
        .route("/check/request", post(check_request))
        .route("/check/response", post(check_response))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.api.max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.api_request_secs))),
        )
}

/// The local API server.
pub struct ApiServer {
    app: Router,
}

impl ApiServer {
    pub fn new(router: Arc<SourceRouter>, config: &LabConfig) -> Self {
        Self {
            app: build_app(AppState { router }, config),
        }
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "API server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(Shutdown::signalled(shutdown))
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_sources(State(state): State<AppState>) -> Json<Vec<SourceInfo>> {
    Json(state.router.sources())
}

async fn list_available_sources(State(state): State<AppState>) -> Json<Vec<SourceInfo>> {
    Json(state.router.available_sources())
}

async fn current_source(State(state): State<AppState>) -> Json<SourceInfo> {
    Json(state.router.current_source_info())
}

async fn switch_source(State(state): State<AppState>, Json(body): Json<SwitchBody>) -> Json<SwitchResult> {
    let switched = state.router.set_source(&body.key);
    Json(SwitchResult {
        switched,
        current: state.router.current_source_info(),
    })
}

async fn route_request(State(state): State<AppState>, Json(body): Json<RouteBody>) -> Json<ApiResponse> {
    Json(state.router.route(&body.request, body.task_id.as_deref()).await)
}

async fn check_request(Json(body): Json<CheckRequestBody>) -> Json<Verdict> {
    let verdict = verify_request(&body.descriptor, &body.request);
    metrics::record_verification("request", verdict.passed);
    Json(verdict)
}

async fn check_response(Json(body): Json<CheckResponseBody>) -> Json<Verdict> {
    let verdict = verify_response(body.descriptor.as_ref(), &body.response);
    metrics::record_verification("response", verdict.passed);
    Json(verdict)
}
