//! HTTP Server for the line filter API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/filter-lines`   | Filter text or CSV                   |
//! | GET    | `/metrics`        | Retained per-request samples         |
//! | GET    | `/metrics/stream` | SSE stream of new samples            |

use std::{convert::Infallible, sync::Arc, time::Duration, time::Instant};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive},
        Json, Sse,
    },
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use super::metrics::{MetricSample, MetricsLog, MetricsSink};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::models::{FilterRequest, FilterResponse};
use crate::transform::pipeline::filter_request;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<dyn MetricsSink>,
}

impl AppState {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self { metrics }
    }
}

/// Build the router with CORS, tracing and the body limit applied.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route(
            "/filter-lines",
            post(filter_lines).fallback(method_not_allowed),
        )
        .route("/metrics", get(list_metrics))
        .route("/metrics/stream", get(stream_metrics))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let metrics = Arc::new(MetricsLog::new(config.metrics_capacity));
    let capacity = metrics.capacity();
    let app = build_router(AppState::new(metrics), config.max_body_bytes);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "line filter server listening");
    info!("   POST /filter-lines   - Filter text or CSV");
    info!("   GET  /metrics        - Last {} request samples", capacity);
    info!("   GET  /metrics/stream - SSE sample stream");
    info!("   GET  /health         - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "linefilter",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "filter": "POST /filter-lines",
            "metrics": "GET /metrics",
            "metricsStream": "GET /metrics/stream (SSE)"
        }
    }))
}

async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

/// Filter endpoint
async fn filter_lines(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<FilterResponse>, ServerError> {
    let started = Instant::now();

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge
        } else {
            ServerError::BadRequest(rejection.body_text())
        }
    })?;
    let request: FilterRequest = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let outcome = tokio::task::spawn_blocking(move || filter_request(&request))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    let sample = MetricSample {
        request_id: Uuid::new_v4().to_string(),
        timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        request_type: outcome.mode,
        duration_ms,
        processed_rows: outcome.response.total_lines,
        output_rows: outcome.response.unique_lines,
        pass_through: outcome.pass_through,
    };

    info!(
        request_id = %sample.request_id,
        mode = outcome.mode.as_str(),
        duration_ms,
        lines = outcome.response.total_lines,
        kept = outcome.response.unique_lines,
        pass_through = outcome.pass_through,
        "filter request processed"
    );
    state.metrics.record(sample);

    Ok(Json(outcome.response))
}

/// Retained metric samples
async fn list_metrics(State(state): State<AppState>) -> Json<Vec<MetricSample>> {
    Json(state.metrics.snapshot())
}

/// SSE endpoint streaming each new metric sample
async fn stream_metrics(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.metrics.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(sample) => {
            let json = serde_json::to_string(&sample).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
