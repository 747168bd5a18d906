use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;

/// Paths reachable without a session
const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/health",
    "/auth/login",
    "/auth/register",
    "/auth/password/reset",
    "/auth/password/update",
];

/// Path prefixes reachable without a session
const PUBLIC_PREFIXES: &[&str] = &["/verify/", "/api/verify/"];

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub claims: Claims,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.jti,
            claims,
        }
    }
}

pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path) || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Route guard: public paths pass through, everything else needs a live bearer token
pub async fn route_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    if is_public_route(&path) {
        return Ok(next.run(request).await);
    }

    let token = extract_bearer_token(request.headers()).map_err(|msg| {
        tracing::debug!("Rejected {} {}: {}", request.method(), path, msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = state.auth().authenticate(&token).await.map_err(|e| {
        tracing::warn!("Rejected token for {}: {}", path, e);
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
