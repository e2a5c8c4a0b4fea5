use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::collections::HashMap;
use tracing::{error, info};

use crate::web::AppState;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Trigger a catalog synchronization run.
///
/// The optional JSON body is a flat map of query parameters forwarded
/// verbatim to the upstream catalog. Responds immediately with an
/// acknowledgment; the run's outcome is only visible in the logs.
pub async fn populate(
    State(state): State<AppState>,
    params: Option<Json<HashMap<String, String>>>,
) -> impl IntoResponse {
    let params = params.map(|Json(p)| p).unwrap_or_default();
    info!("Populate triggered with {} catalog parameters", params.len());

    let sync = state.sync.clone();
    tokio::spawn(async move {
        if let Err(e) = sync.populate(&params).await {
            // Batch-fatal: the run aborted before any write
            error!("Catalog sync aborted: {}", e);
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "accepted" })),
    )
}
