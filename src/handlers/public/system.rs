use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "QR Verify API",
            "version": version,
            "description": "Issue QR-coded inspection certificates and verify them publicly",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/login, /auth/register, /auth/password/reset, /auth/password/update (public)",
                "verify": "/verify/:id (public HTML), /api/verify/:id (public JSON)",
                "auth": "/api/auth/whoami, /api/auth/session[/refresh] (protected)",
                "qr_codes": "/api/qr-codes[/:id[/qr.png|/toggle]] (protected)",
                "dashboard": "/api/dashboard[/stats] (protected)",
                "verifications": "/api/verifications[/export] (protected)",
            }
        }
    }))
}

/// GET /health - store connectivity probe
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
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
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
