use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status written for every successful scan
pub const VERIFIED_STATUS: &str = "verified";

/// Audit row appended when a certificate is visited
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Verification {
    pub id: Uuid,
    pub qr_id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NewVerification {
    pub qr_id: Uuid,
    pub ip_address: String,
    pub user_agent: String,
    pub status: String,
}

/// Verification joined with the title and client of its certificate
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VerificationEntry {
    pub id: Uuid,
    pub qr_id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub status: String,
    pub qr_title: Option<String>,
    pub qr_client_name: Option<String>,
}
