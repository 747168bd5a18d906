use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::LoginResult;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/whoami - Current account
pub async fn whoami(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = state.auth().current_user(&auth_user.claims).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/auth/session/refresh - Swap the presented token for a fresh one
///
/// The presented token is revoked, so only the returned token stays usable.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<LoginResult> {
    let session = state.auth().refresh(&auth_user.claims).await?;
    Ok(ApiResponse::success(session))
}

/// DELETE /api/auth/session - Sign out
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    state.auth().logout(&auth_user.claims).await?;
    Ok(ApiResponse::success(json!({
        "signed_out": true,
        "session_id": auth_user.session_id,
    })))
}
