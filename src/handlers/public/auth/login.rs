// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::CredentialsRequest;
use crate::app::AppState;
use crate::auth::LoginResult;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/login - Authenticate and receive a JWT
///
/// ```json
/// { "success": true, "data": { "token": "eyJ...", "user": { "id": "...", "email": "..." }, "expires_in": 604800 } }
/// ```
///
/// Unknown email and wrong password both answer 401 with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<LoginResult> {
    let Json(body) = payload?;
    let session = state.auth().login(&body.email, &body.password).await?;
    Ok(ApiResponse::success(session))
}
