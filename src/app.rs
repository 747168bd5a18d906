use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::handlers;
use crate::services::{CertificateService, DashboardService, VerificationService};
use crate::store::Store;

/// Shared by every handler through `State`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.config.clone())
    }

    pub fn certificates(&self) -> CertificateService {
        CertificateService::new(self.store.clone(), self.config.clone())
    }

    pub fn verifications(&self) -> VerificationService {
        VerificationService::new(self.store.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.store.clone(), self.config.dashboard.clone())
    }
}

/// Full router with the route guard applied to every path
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(auth_public_routes())
        .merge(verify_routes())
        // Protected
        .merge(auth_routes())
        .merge(qr_code_routes())
        .merge(dashboard_routes())
        .layer(middleware::from_fn_with_state(state.clone(), crate::middleware::route_guard))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login_post))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/password/reset", post(auth::password_reset_post))
        .route("/auth/password/update", post(auth::password_update_post))
}

fn verify_routes() -> Router<AppState> {
    use handlers::public::verify;

    Router::new()
        .route("/verify/:id", get(verify::verify_page))
        .route("/api/verify/:id", get(verify::verify_json))
}

fn auth_routes() -> Router<AppState> {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/session/refresh", put(auth::session_refresh))
        .route("/api/auth/session", delete(auth::session_logout))
}

fn qr_code_routes() -> Router<AppState> {
    use handlers::protected::qr_codes;

    Router::new()
        .route("/api/qr-codes", get(qr_codes::list_get).post(qr_codes::generate_post))
        .route("/api/qr-codes/:id", get(qr_codes::record_get))
        .route("/api/qr-codes/:id/qr.png", get(qr_codes::image_get))
        .route("/api/qr-codes/:id/toggle", post(qr_codes::toggle_post))
}

fn dashboard_routes() -> Router<AppState> {
    use handlers::protected::dashboard;

    Router::new()
        .route("/api/dashboard", get(dashboard::overview_get))
        .route("/api/dashboard/stats", get(dashboard::stats_get))
        .route("/api/verifications", get(dashboard::verifications_get))
        .route("/api/verifications/export", get(dashboard::export_get))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if config.environment == crate::config::Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
