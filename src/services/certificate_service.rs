use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ServiceError;
use crate::config::AppConfig;
use crate::database::models::{CertificateData, QrCode, QrCodeSummary};
use crate::qr;
use crate::store::{NewQrCode, Store};

/// Response of a successful generate call
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQrCode {
    pub id: Uuid,
    pub verification_url: String,
    pub qr_code_image: String,
    pub qr_code: QrCode,
}

pub struct CertificateService {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

impl CertificateService {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Persist a certificate, then render and attach its QR image.
    ///
    /// `origin` is the scheme and host the verification link is built on.
    pub async fn generate(
        &self,
        data: CertificateData,
        origin: &str,
        created_by: Option<Uuid>,
    ) -> Result<GeneratedQrCode, ServiceError> {
        let data = data.normalized();
        validate_required(&data)?;

        let mut qr_code = self
            .store
            .insert_qr_code(NewQrCode {
                title: data.title.clone(),
                client_name: data.client_name.clone(),
                data,
                created_by,
            })
            .await?;

        let verification_url = qr::verification_url(origin, qr_code.id);
        let image = qr::render_data_url(&verification_url, &self.config.qr)?;
        self.store.set_qr_code_image(qr_code.id, &image).await?;
        qr_code.qr_code_image = Some(image.clone());

        tracing::info!(
            "Generated QR code {} for '{}' ({})",
            qr_code.id,
            qr_code.title,
            qr_code.client_name
        );

        Ok(GeneratedQrCode {
            id: qr_code.id,
            verification_url,
            qr_code_image: image,
            qr_code,
        })
    }

    pub async fn list(&self) -> Result<Vec<QrCodeSummary>, ServiceError> {
        Ok(self.store.list_qr_codes().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<QrCode, ServiceError> {
        self.store
            .get_qr_code(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("QR code {}", id)))
    }

    /// PNG bytes for download. Rows without a stored image are rendered on the fly.
    pub async fn image_png(&self, id: Uuid, origin: &str) -> Result<(QrCode, Vec<u8>), ServiceError> {
        let qr_code = self.get(id).await?;
        let png = match qr_code.qr_code_image.as_deref() {
            Some(data_url) => qr::decode_data_url(data_url)?,
            None => {
                tracing::debug!("QR code {} has no stored image, rendering", id);
                qr::render_png(&qr::verification_url(origin, id), &self.config.qr)?
            }
        };
        Ok((qr_code, png))
    }
}

fn validate_required(data: &CertificateData) -> Result<(), ServiceError> {
    if data.title.is_empty() {
        return Err(ServiceError::Validation {
            field: "title",
            message: "Title is required".to_string(),
        });
    }
    if data.client_name.is_empty() {
        return Err(ServiceError::Validation {
            field: "clientName",
            message: "Client name is required".to_string(),
        });
    }
    Ok(())
}

/// File name for a downloaded QR image, keeping only characters safe in a header
pub fn download_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "QR-code.png".to_string()
    } else {
        format!("QR-{}.png", cleaned)
    }
}
