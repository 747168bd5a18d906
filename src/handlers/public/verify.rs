// handlers/public/verify.rs - certificate verification, the target of every QR code

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::api::{render_invalid_page, render_valid_page};
use crate::app::AppState;
use crate::database::models::QrCode;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ClientInfo};
use crate::services::ServiceError;

/// GET /verify/:id - HTML certificate page
///
/// Records one verification per successful visit. Unknown, malformed and
/// inactive ids render the invalid page with 404.
pub async fn verify_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    client: ClientInfo,
) -> Response {
    match state
        .verifications()
        .verify(&id, client.ip_address, client.user_agent)
        .await
    {
        Ok(qr_code) => Html(render_valid_page(&qr_code, &state.config.verification.issuer_name)).into_response(),
        Err(ServiceError::InvalidCode) => (StatusCode::NOT_FOUND, Html(render_invalid_page())).into_response(),
        Err(e) => {
            // Store failures keep the JSON envelope
            ApiError::from(e).into_response()
        }
    }
}

/// GET /api/verify/:id - same lookup and audit as the page, as JSON
pub async fn verify_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
    client: ClientInfo,
) -> ApiResult<QrCode> {
    let mut qr_code = state
        .verifications()
        .verify(&id, client.ip_address, client.user_agent)
        .await?;
    // The embedded PNG is only useful to the issuer
    qr_code.qr_code_image = None;
    qr_code.created_by = None;
    Ok(ApiResponse::success(qr_code))
}
