//! Persistence seam for the service layer.
//!
//! Services only ever see `Arc<dyn Store>`. `PgStore` is the production
//! backend; `MemoryStore` backs the test suite and `DATABASE_BACKEND=memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{AppConfig, StoreBackend};
use crate::database::models::{
    CertificateData, NewVerification, PasswordReset, QrCode, QrCodeSummary, User, Verification,
    VerificationEntry,
};
use crate::database::{DatabaseError, DatabaseManager};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Fields needed to insert a certificate row
#[derive(Debug, Clone)]
pub struct NewQrCode {
    pub title: String,
    pub client_name: String,
    pub data: CertificateData,
    pub created_by: Option<Uuid>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // Accounts
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), DatabaseError>;

    // Password reset tokens
    async fn insert_password_reset(&self, reset: PasswordReset) -> Result<(), DatabaseError>;
    /// Marks the token used and returns it, if it exists, is unused and unexpired at `now`
    async fn consume_password_reset(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordReset>, DatabaseError>;

    // Sessions
    async fn revoke_session(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DatabaseError>;
    async fn is_session_revoked(&self, jti: Uuid) -> Result<bool, DatabaseError>;

    // Certificates
    async fn insert_qr_code(&self, new: NewQrCode) -> Result<QrCode, DatabaseError>;
    async fn set_qr_code_image(&self, id: Uuid, image: &str) -> Result<(), DatabaseError>;
    async fn get_qr_code(&self, id: Uuid) -> Result<Option<QrCode>, DatabaseError>;
    async fn get_active_qr_code(&self, id: Uuid) -> Result<Option<QrCode>, DatabaseError>;
    /// Newest first, each with its verification count
    async fn list_qr_codes(&self) -> Result<Vec<QrCodeSummary>, DatabaseError>;
    /// Flips `is_active` and returns the new value; `None` when the id is unknown
    async fn toggle_qr_code(&self, id: Uuid) -> Result<Option<bool>, DatabaseError>;

    // Verifications
    async fn insert_verification(&self, new: NewVerification) -> Result<Verification, DatabaseError>;
    /// Newest first; `None` returns every row
    async fn list_verifications(&self, limit: Option<i64>) -> Result<Vec<VerificationEntry>, DatabaseError>;

    // Counts
    async fn count_qr_codes(&self) -> Result<i64, DatabaseError>;
    async fn count_active_qr_codes(&self) -> Result<i64, DatabaseError>;
    async fn count_verifications(&self) -> Result<i64, DatabaseError>;
    /// Verifications with `start <= scanned_at < end`
    async fn count_verifications_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Build the store selected by `database.backend`, applying migrations when configured
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
