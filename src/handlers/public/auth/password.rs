// handlers/public/auth/password.rs - password reset handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::ResetRequested;
use crate::middleware::{request_origin, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub token: String,
    pub password: String,
}

/// POST /auth/password/reset - Start a password reset
///
/// Always 202 so the response does not reveal whether the account exists.
/// `reset_url` is included only when `SECURITY_EXPOSE_RESET_TOKENS` is on.
pub async fn password_reset_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> ApiResult<ResetRequested> {
    let Json(body) = payload?;
    let origin = request_origin(&state.config.server, &headers);
    let requested = state.auth().request_password_reset(&body.email, &origin).await?;
    Ok(ApiResponse::accepted(requested))
}

/// POST /auth/password/update - Finish a reset with the emailed token
pub async fn password_update_post(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    state
        .auth()
        .complete_password_reset(&body.token, &body.password)
        .await?;
    Ok(ApiResponse::success(json!({ "updated": true })))
}
