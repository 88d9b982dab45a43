//! Inbound HTTP surface for the FreightPay investigation service.

use crate::config::Listener as ListenerConfig;
use crate::metrics_defs;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use otm::protocol::{BulkResult, HealthStatus, SearchResult, TriggerOutcome};
use otm::{OtmClient, OtmError, SearchKind, TriggerKind};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    UpstreamDispatch(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OtmError> for ApiError {
    fn from(err: OtmError) -> Self {
        match err {
            OtmError::TriggerDispatch { .. } | OtmError::HttpClient(_) => {
                ApiError::UpstreamDispatch(err.to_string())
            }
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamDispatch(_) => StatusCode::BAD_GATEWAY,
            ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub otm: OtmClient,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/search/bulk", post(bulk_search))
        .route(
            "/api/shipments/{shipment_xid}/triggers/{trigger}",
            post(dispatch_trigger),
        )
        .route("/api/health", get(health))
        .with_state(state)
}

pub async fn serve(listener: ListenerConfig, otm: OtmClient) -> Result<(), ApiError> {
    let app = router(AppState { otm });
    let addr = format!("{}:{}", listener.host, listener.port);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn default_search_type() -> String {
    "shipment".to_string()
}

#[derive(Deserialize, Debug)]
struct SearchParams {
    /// Search value
    q: String,
    /// 'order' or 'shipment'
    #[serde(default = "default_search_type")]
    r#type: String,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, ApiError> {
    let kind: SearchKind = params.r#type.parse()?;
    metrics::counter!(metrics_defs::SEARCH_REQUESTS.name, "type" => kind.as_str()).increment(1);

    let started = Instant::now();
    let result = state.otm.search(kind, &params.q).await;
    metrics::histogram!(metrics_defs::REQUEST_DURATION.name, "handler" => "search")
        .record(started.elapsed().as_secs_f64());

    Ok(Json(result))
}

#[derive(Deserialize, Debug)]
struct BulkParams {
    #[serde(default = "default_search_type")]
    r#type: String,
}

/// Accepts a plain-text comma-separated list of search values.
async fn bulk_search(
    State(state): State<AppState>,
    Query(params): Query<BulkParams>,
    body: String,
) -> Result<Json<BulkResult>, ApiError> {
    let kind: SearchKind = params.r#type.parse()?;
    metrics::counter!(metrics_defs::BULK_REQUESTS.name, "type" => kind.as_str()).increment(1);

    let started = Instant::now();
    let result = state.otm.bulk_search(kind, &body).await?;
    metrics::histogram!(metrics_defs::REQUEST_DURATION.name, "handler" => "bulk")
        .record(started.elapsed().as_secs_f64());

    Ok(Json(result))
}

async fn dispatch_trigger(
    State(state): State<AppState>,
    Path((shipment_xid, trigger)): Path<(String, String)>,
) -> Result<Json<TriggerOutcome>, ApiError> {
    let kind: TriggerKind = trigger.parse()?;
    metrics::counter!(metrics_defs::TRIGGER_REQUESTS.name, "trigger" => kind.as_str())
        .increment(1);

    let outcome = state.otm.send_trigger(kind, &shipment_xid).await?;
    Ok(Json(outcome))
}

/// Always answers 200; upstream reachability is reported in the body.
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.otm.health().await)
}
