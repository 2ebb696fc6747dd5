//! HTTP trigger surface: on-demand dispatch, manual scan, liveness.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatch::NotificationDispatcher;
use crate::escalation::{EscalationEngine, ScanSummary};
use crate::models::dispatch::{DispatchRequest, DispatchResult};
use crate::{AppError, Result};

/// Shared application state behind the HTTP surface.
#[derive(Clone)]
pub struct AppState {
    /// Notification dispatcher serving `POST /dispatch`.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Escalation engine serving `POST /scan`.
    pub engine: Arc<EscalationEngine>,
}

/// Build the trigger router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dispatch", post(dispatch))
        .route("/scan", post(scan))
        .with_state(state)
}

/// Serve the trigger surface until the cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Io` if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, port: u16, cancel: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|err| AppError::Io(format!("failed to bind port {port}: {err}")))?;
    info!(port, "http trigger surface listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("http server failed: {err}")))
}

/// Handler for `GET /health` — returns 200 OK with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

/// Handler for `POST /dispatch` — resolve and publish a notification.
async fn dispatch(
    State(state): State<AppState>,
    Json(request): Json<DispatchRequest>,
) -> Json<DispatchResult> {
    Json(state.dispatcher.dispatch(&request).await)
}

/// Handler for `POST /scan` — run one escalation scan immediately.
async fn scan(State(state): State<AppState>) -> Json<ScanSummary> {
    Json(state.engine.scan().await)
}
