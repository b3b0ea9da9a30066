//! REST front-end: maps HTTP routes onto a [`BlockchainClient`] and renders
//! [`GatewayError`]s as JSON with the status their kind implies.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use blockgate_core::block::Block;
use blockgate_core::block_id;
use blockgate_core::client::{BlockchainClient, HEALTH_CHECK_TIMEOUT};
use blockgate_core::error::{ErrorKind, GatewayError};

use crate::metrics::GatewayMetrics;

/// Context keys that stay in the logs and never reach a response body.
const PRIVATE_CONTEXT_KEYS: &[&str] = &["response"];

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn BlockchainClient>,
    pub metrics: Arc<GatewayMetrics>,
}

/// A gateway error on its way out as an HTTP response.
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.kind().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match err.kind() {
            ErrorKind::NotFound | ErrorKind::Validation => {
                tracing::warn!(kind = %err.kind(), error = %err, context = ?err.context(), "request failed")
            }
            _ => tracing::error!(
                kind = %err.kind(),
                error = %err,
                cause = ?std::error::Error::source(&err).map(ToString::to_string),
                context = ?err.context(),
                "request failed"
            ),
        }

        let data: Map<String, Value> = err
            .context()
            .iter()
            .filter(|(k, _)| !PRIVATE_CONTEXT_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let body = json!({
            "error": {
                "type": err.kind().as_str(),
                "message": err.message(),
                "data": data,
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Routes plus middleware. From the outside in: request tracing, panic
/// recovery, then per-route metrics on matched routes.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/block/latest", get(latest_block_number))
        .route("/block/:number", get(block_by_number));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest("/api/v1", api)
        .route_layer(middleware::from_fn_with_state(state.metrics.clone(), track_requests))
        .fallback(handler_404)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

async fn track_requests(
    State(metrics): State<Arc<GatewayMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let method = request.method().clone();

    let response = next.run(request).await;
    metrics.record_api_request(&endpoint, method.as_str(), response.status(), start.elapsed());
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError(GatewayError::internal("Internal server error")).into_response()
}

async fn health(State(state): State<AppState>) -> Response {
    let report = state.client.health_check(HEALTH_CHECK_TIMEOUT).await;
    if let Some(err) = &report.error {
        tracing::warn!(error = %err, "health probe failed");
    }

    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if report.healthy { "ok" } else { "unhealthy" },
        "description": report.description,
        "network_id": report.network_id,
        "chain_name": (!report.chain_name.is_empty()).then_some(report.chain_name),
    });
    (status, Json(body)).into_response()
}

async fn latest_block_number(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let number = state.client.latest_block_number().await?;
    tracing::debug!(block_number = %number, "retrieved latest block number");
    Ok(Json(json!({ "blockNumber": number })))
}

async fn block_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Block>, ApiError> {
    let block_number = block_id::normalize(&number)?;
    let block = state.client.block_by_number(&block_number).await?;
    tracing::debug!(block_number = %block.number, block_hash = %block.hash, "retrieved block");
    Ok(Json(block))
}

async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (content_type, body) = state.metrics.encode().map_err(|e| {
        GatewayError::internal("Failed to encode metrics").with_source(e)
    })?;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

async fn handler_404() -> Response {
    ApiError(GatewayError::not_found("The requested resource was not found")).into_response()
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "server starting");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
