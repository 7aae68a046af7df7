//! Route handlers for serve mode
//!
//! Every endpoint answers with the current status list on success and a
//! plain-text error with status 500 on failure.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::any,
    Router,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::error::CloudVpnError;
use crate::provision::{Provisioner, Status};

/// Shared application state for route handlers
#[derive(Clone)]
pub struct AppState {
    pub provisioner: Provisioner,
    /// Held for the duration of each operation so requests never interleave
    pub operation_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(provisioner: Provisioner) -> Self {
        Self {
            provisioner,
            operation_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Error returned to HTTP clients
#[derive(Debug)]
pub struct ApiError(CloudVpnError);

impl From<CloudVpnError> for ApiError {
    fn from(e: CloudVpnError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/create", any(handle_create))
        .route("/remove", any(handle_remove))
        .route("/status", any(handle_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// /create - create a server, publish DNS, then report status
pub async fn handle_create(State(state): State<AppState>) -> Result<Json<Vec<Status>>, ApiError> {
    let _guard = state.operation_lock.lock().await;

    let server = state.provisioner.create_and_publish().await?;
    tracing::info!("Created server {} via HTTP", server.id);

    Ok(Json(state.provisioner.status().await?))
}

/// /remove - destroy every active server, then report status
pub async fn handle_remove(State(state): State<AppState>) -> Result<Json<Vec<Status>>, ApiError> {
    let _guard = state.operation_lock.lock().await;

    let removed = state.provisioner.remove_all().await?;
    tracing::info!("Removed {} server(s) via HTTP", removed.len());

    Ok(Json(state.provisioner.status().await?))
}

/// /status - report active servers
pub async fn handle_status(State(state): State<AppState>) -> Result<Json<Vec<Status>>, ApiError> {
    let _guard = state.operation_lock.lock().await;

    Ok(Json(state.provisioner.status().await?))
}
