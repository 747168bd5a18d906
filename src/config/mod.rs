use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;
const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub qr: QrConfig,
    pub dashboard: DashboardConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Scheme and host used for verification URLs; derived from the request when unset
    pub public_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub reset_token_ttl_minutes: i64,
    pub expose_reset_tokens: bool,
    pub min_password_length: usize,
    pub password_hash_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    /// Target image width in pixels
    pub size: u32,
    /// Quiet zone in modules
    pub margin: u32,
    pub dark_color: String,
    pub light_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub recent_limit: i64,
    pub max_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub issuer_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("QRVERIFY_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("PUBLIC_ORIGIN") {
            let trimmed = v.trim().trim_end_matches('/').to_string();
            self.server.public_origin = if trimmed.is_empty() { None } else { Some(trimmed) };
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" | "mem" => StoreBackend::Memory,
                _ => StoreBackend::Postgres,
            };
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_RESET_TOKEN_TTL_MINUTES") {
            self.security.reset_token_ttl_minutes = v.parse().unwrap_or(self.security.reset_token_ttl_minutes);
        }
        if let Ok(v) = env::var("SECURITY_EXPOSE_RESET_TOKENS") {
            self.security.expose_reset_tokens = v.parse().unwrap_or(self.security.expose_reset_tokens);
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_HASH_COST") {
            self.security.password_hash_cost = v.parse().unwrap_or(self.security.password_hash_cost);
        }
        if let Ok(v) = env::var("SECURITY_MIN_PASSWORD_LENGTH") {
            self.security.min_password_length = v.parse().unwrap_or(self.security.min_password_length);
        }

        // QR overrides
        if let Ok(v) = env::var("QR_SIZE") {
            self.qr.size = v.parse().unwrap_or(self.qr.size);
        }
        if let Ok(v) = env::var("QR_MARGIN") {
            self.qr.margin = v.parse().unwrap_or(self.qr.margin);
        }
        if let Ok(v) = env::var("QR_DARK_COLOR") {
            self.qr.dark_color = v;
        }
        if let Ok(v) = env::var("QR_LIGHT_COLOR") {
            self.qr.light_color = v;
        }

        // Dashboard overrides
        if let Ok(v) = env::var("DASHBOARD_RECENT_LIMIT") {
            self.dashboard.recent_limit = v.parse().unwrap_or(self.dashboard.recent_limit);
        }
        if let Ok(v) = env::var("DASHBOARD_MAX_LIMIT") {
            self.dashboard.max_limit = v.parse().unwrap_or(self.dashboard.max_limit);
        }

        if let Ok(v) = env::var("VERIFICATION_ISSUER_NAME") {
            self.verification.issuer_name = v;
        }

        self
    }

    /// Checks that must hold before the server accepts traffic
    pub fn validate(&self) -> Result<(), String> {
        if self.security.jwt_secret.is_empty() {
            return Err("JWT_SECRET must be set".to_string());
        }
        if self.environment == Environment::Production && self.security.expose_reset_tokens {
            return Err("SECURITY_EXPOSE_RESET_TOKENS cannot be enabled in production".to_string());
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            return Err(format!("SECURITY_JWT_EXPIRY_HOURS must be between 1 and {}", MAX_JWT_EXPIRY_HOURS));
        }
        if !(1..=MAX_RESET_TOKEN_TTL_MINUTES).contains(&self.security.reset_token_ttl_minutes) {
            return Err(format!(
                "SECURITY_RESET_TOKEN_TTL_MINUTES must be between 1 and {}",
                MAX_RESET_TOKEN_TTL_MINUTES
            ));
        }
        if self.qr.size == 0 {
            return Err("QR_SIZE must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_origin: None,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                reset_token_ttl_minutes: 60,
                expose_reset_tokens: true,
                min_password_length: 6,
                password_hash_cost: 10,
            },
            qr: QrConfig::default(),
            dashboard: DashboardConfig {
                recent_limit: 50,
                max_limit: 500,
            },
            verification: VerificationConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_origin: None,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                reset_token_ttl_minutes: 60,
                expose_reset_tokens: false,
                min_password_length: 8,
                password_hash_cost: 12,
            },
            qr: QrConfig::default(),
            dashboard: DashboardConfig {
                recent_limit: 50,
                max_limit: 500,
            },
            verification: VerificationConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_origin: None,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 12,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                reset_token_ttl_minutes: 30,
                expose_reset_tokens: false,
                min_password_length: 8,
                password_hash_cost: 12,
            },
            qr: QrConfig::default(),
            dashboard: DashboardConfig {
                recent_limit: 50,
                max_limit: 200,
            },
            verification: VerificationConfig::default(),
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            size: 300,
            margin: 2,
            dark_color: "#000000".to_string(),
            light_color: "#FFFFFF".to_string(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            issuer_name: "PT TRIYASA PIRSA UTAMA".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
