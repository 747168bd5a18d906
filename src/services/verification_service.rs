use std::sync::Arc;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{NewVerification, QrCode, VERIFIED_STATUS};
use crate::store::Store;

pub struct VerificationService {
    store: Arc<dyn Store>,
}

impl VerificationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Look up an active certificate by its raw path id and record the scan.
    ///
    /// Unknown, malformed and inactive ids all yield `InvalidCode` and leave no
    /// audit row. A failed audit insert is logged; the certificate is still returned.
    pub async fn verify(
        &self,
        raw_id: &str,
        ip_address: String,
        user_agent: String,
    ) -> Result<QrCode, ServiceError> {
        let id = match Uuid::parse_str(raw_id.trim()) {
            Ok(id) => id,
            Err(_) => {
                tracing::debug!("Verification with malformed id '{}'", raw_id);
                return Err(ServiceError::InvalidCode);
            }
        };

        let qr_code = match self.store.get_active_qr_code(id).await? {
            Some(qr_code) => qr_code,
            None => {
                tracing::info!("Verification refused for unknown or inactive code {}", id);
                return Err(ServiceError::InvalidCode);
            }
        };

        let audit = NewVerification {
            qr_id: id,
            ip_address,
            user_agent,
            status: VERIFIED_STATUS.to_string(),
        };
        match self.store.insert_verification(audit).await {
            Ok(row) => tracing::info!("Verified QR code {} from {}", id, row.ip_address),
            Err(e) => tracing::error!("Error recording verification for {}: {}", id, e),
        }

        Ok(qr_code)
    }
}
