// handlers/protected/qr_codes.rs - certificate issuing and management

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Extension, Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{CertificateData, QrCode, QrCodeSummary};
use crate::error::ApiError;
use crate::middleware::{request_origin, ApiResponse, ApiResult, AuthUser};
use crate::services::certificate_service::download_filename;
use crate::services::{GeneratedQrCode, ToggleResult};

/// POST /api/qr-codes - Issue a certificate and its QR image
///
/// Body is the camelCase certificate payload; `title` and `clientName` are required.
///
/// ```json
/// { "success": true, "data": { "id": "...", "verification_url": "https://host/verify/...", "qr_code_image": "data:image/png;base64,...", "qr_code": { } } }
/// ```
pub async fn generate_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    headers: HeaderMap,
    payload: Result<Json<CertificateData>, JsonRejection>,
) -> ApiResult<GeneratedQrCode> {
    let Json(data) = payload?;
    let origin = request_origin(&state.config.server, &headers);
    let generated = state
        .certificates()
        .generate(data, &origin, Some(auth_user.user_id))
        .await?;
    Ok(ApiResponse::created(generated))
}

/// GET /api/qr-codes - All certificates, newest first, with verification counts
pub async fn list_get(State(state): State<AppState>) -> ApiResult<Vec<QrCodeSummary>> {
    Ok(ApiResponse::success(state.certificates().list().await?))
}

/// GET /api/qr-codes/:id
pub async fn record_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<QrCode> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.certificates().get(id).await?))
}

/// GET /api/qr-codes/:id/qr.png - Download the QR image
pub async fn image_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let origin = request_origin(&state.config.server, &headers);
    let (qr_code, png) = state.certificates().image_png(id, &origin).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_filename(&qr_code.title)),
        )
        .body(Body::from(png))
        .map_err(|e| {
            tracing::error!("Failed to build image response: {}", e);
            ApiError::internal_server_error("Failed to build response")
        })
}

/// POST /api/qr-codes/:id/toggle - Flip the active flag of one certificate
pub async fn toggle_post(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ToggleResult> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.dashboard().toggle(id).await?))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid QR code id '{}'", raw)))
}
