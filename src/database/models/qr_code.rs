use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Inspection payload stored in `qr_codes.data`.
///
/// Keys are camelCase on the wire and in the JSON column. Absent keys read as
/// empty strings so older rows with fewer fields still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateData {
    pub title: String,
    pub client_name: String,
    pub vessel: String,
    pub quantity: String,
    pub port_loading: String,
    pub port_discharging: String,
    pub wi_number: String,
    pub certificate_number: String,
    pub commodity: String,
    pub branch: String,
    pub ash_content: String,
    pub total_sulphur: String,
    pub calorific_value: String,
}

impl CertificateData {
    /// Trim every field in place
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.title,
            &mut self.client_name,
            &mut self.vessel,
            &mut self.quantity,
            &mut self.port_loading,
            &mut self.port_discharging,
            &mut self.wi_number,
            &mut self.certificate_number,
            &mut self.commodity,
            &mut self.branch,
            &mut self.ash_content,
            &mut self.total_sulphur,
            &mut self.calorific_value,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }

    pub fn has_parameter_results(&self) -> bool {
        !self.ash_content.is_empty() || !self.total_sulphur.is_empty() || !self.calorific_value.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCode {
    pub id: Uuid,
    pub title: String,
    pub client_name: String,
    pub data: CertificateData,
    pub is_active: bool,
    pub qr_code_image: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Dashboard row: certificate plus how many times it has been verified
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QrCodeSummary {
    pub id: Uuid,
    pub title: String,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub verification_count: i64,
}
