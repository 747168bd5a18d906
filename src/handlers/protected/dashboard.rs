// handlers/protected/dashboard.rs - statistics, recent activity and CSV export

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::VerificationEntry;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{Dashboard, DashboardStats};

#[derive(Debug, Deserialize)]
pub struct VerificationsQuery {
    pub limit: Option<i64>,
}

/// GET /api/dashboard/stats
pub async fn stats_get(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    Ok(ApiResponse::success(state.dashboard().stats().await?))
}

/// GET /api/dashboard - stats, certificates and recent verifications in one call
pub async fn overview_get(State(state): State<AppState>) -> ApiResult<Dashboard> {
    Ok(ApiResponse::success(state.dashboard().overview().await?))
}

/// GET /api/verifications?limit=N - newest first
pub async fn verifications_get(
    State(state): State<AppState>,
    Query(query): Query<VerificationsQuery>,
) -> ApiResult<Vec<VerificationEntry>> {
    Ok(ApiResponse::success(
        state.dashboard().recent_verifications(query.limit).await?,
    ))
}

/// GET /api/verifications/export - every verification as a CSV attachment
pub async fn export_get(State(state): State<AppState>) -> Result<Response, ApiError> {
    let export = state.dashboard().export_csv().await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        )
        .body(Body::from(export.body))
        .map_err(|e| {
            tracing::error!("Failed to build export response: {}", e);
            ApiError::internal_server_error("Failed to build response")
        })
}
