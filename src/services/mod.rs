pub mod certificate_service;
pub mod dashboard_service;
pub mod verification_service;

pub use certificate_service::{CertificateService, GeneratedQrCode};
pub use dashboard_service::{CsvExport, Dashboard, DashboardService, DashboardStats, ToggleResult};
pub use verification_service::VerificationService;

use crate::database::DatabaseError;
use crate::qr::QrError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("{0} not found")]
    NotFound(String),
    /// Missing, malformed or inactive verification code
    #[error("invalid verification code")]
    InvalidCode,
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Qr(#[from] QrError),
}
