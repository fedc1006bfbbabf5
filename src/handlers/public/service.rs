use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - Service descriptor
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "BizDesk API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Customer records for subscription accounts",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "customers": "/api/customers[/:id] (protected, active subscription required)",
            }
        }
    }))
}

/// GET /health - Datastore liveness
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.repository.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
