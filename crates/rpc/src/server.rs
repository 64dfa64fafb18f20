use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use choco_storage::PredictionRecord;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::context::AppContext;
use crate::errors::ServiceError;

type SharedContext = Arc<AppContext>;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub score: f64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_hash: String,
    uptime_secs: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Uniform error payload: every failure is a 500 with `{"error": ...}`
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        error!("request failed: {}", err);
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

/// Serve the prediction API on `addr` (`host:port`, host names resolved)
pub async fn start_server(context: Arc<AppContext>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;
    let local = listener.local_addr().context("listener has no local address")?;
    info!(%local, "prediction API ready");

    axum::serve(listener, build_router(context))
        .await
        .context("prediction server terminated unexpectedly")
}

pub fn build_router(context: SharedContext) -> Router {
    Router::new()
        .route("/predict", post(handle_predict))
        .route("/history", get(handle_history))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

async fn handle_predict(
    State(context): State<SharedContext>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    // parsed by hand so that a non-JSON body gets the same error shape
    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|err| ServiceError::MalformedRequest(format!("invalid JSON body: {err}")))?;
    debug!("received prediction request: {}", payload);

    let prediction = context.predict(&payload).await?;
    Ok(Json(PredictResponse {
        score: prediction.score,
    }))
}

async fn handle_history(
    State(context): State<SharedContext>,
) -> Result<Json<Vec<PredictionRecord>>, ApiError> {
    Ok(Json(context.history().await?))
}

async fn handle_health(State(context): State<SharedContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_hash: context.model_hash().to_string(),
        uptime_secs: context.uptime_seconds(),
    })
}
