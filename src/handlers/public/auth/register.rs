// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::CredentialsRequest;
use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/register - Create an account
///
/// 201 with the new user, 400 with `field_errors` for a malformed email or
/// short password, 409 when the email is taken.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = payload?;
    let user = state.auth().register(&body.email, &body.password).await?;
    Ok(ApiResponse::created(user))
}
