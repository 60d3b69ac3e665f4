//! HTTP control surface: out-of-band mitplan operations
//!
//! Everything real-time goes over the WebSocket gateway; this surface only
//! covers creating a mitplan and forcing a cache-to-durable save.

use crate::server::AppContext;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMitplanResponse {
    pub mitplan_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/mitplans
///
/// Allocates a fresh id (collision-checked against the hot cache), seeds
/// the initial document, and commits it. The caller is not subscribed as a
/// side effect; clients connect and join over the gateway separately.
pub async fn create_mitplan(
    State(ctx): State<AppContext>,
) -> Result<Json<CreateMitplanResponse>, StatusCode> {
    match ctx.store.create().await {
        Ok((mitplan_id, _)) => Ok(Json(CreateMitplanResponse { mitplan_id })),
        Err(e) => {
            error!("failed to create mitplan: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/mitplans/:id/save
///
/// Re-runs the durable half of a commit from the hot cache's current
/// value. 404 when the mitplan has no cached document.
pub async fn save_mitplan(
    State(ctx): State<AppContext>,
    Path(mitplan_id): Path<String>,
) -> (StatusCode, Json<MessageResponse>) {
    match ctx.store.flush(&mitplan_id).await {
        Ok(true) => {
            info!(%mitplan_id, "mitplan saved");
            (
                StatusCode::OK,
                Json(MessageResponse {
                    message: "Mitplan state saved successfully".to_string(),
                }),
            )
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(MessageResponse {
                message: "Mitplan not found".to_string(),
            }),
        ),
        Err(e) => {
            error!(%mitplan_id, "failed to save mitplan: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse {
                    message: "internal server error".to_string(),
                }),
            )
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Status endpoint
pub async fn status() -> Json<serde_json::Value> {
    Json(json!({
        "service": "mitplan-server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}
