use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ServiceError;
use crate::api::{export_filename, verifications_csv};
use crate::config::DashboardConfig;
use crate::database::models::{QrCodeSummary, VerificationEntry};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_qr_codes: i64,
    pub active_qr_codes: i64,
    pub total_verifications: i64,
    pub today_verifications: i64,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub qr_codes: Vec<QrCodeSummary>,
    pub verifications: Vec<VerificationEntry>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToggleResult {
    pub id: Uuid,
    pub is_active: bool,
}

#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
    pub rows: usize,
}

pub struct DashboardService {
    store: Arc<dyn Store>,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    /// The four counters, queried concurrently; the first failure fails the call
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let (start, end) = utc_day_bounds(Utc::now());
        let (total_qr_codes, active_qr_codes, total_verifications, today_verifications) = futures::try_join!(
            self.store.count_qr_codes(),
            self.store.count_active_qr_codes(),
            self.store.count_verifications(),
            self.store.count_verifications_between(start, end),
        )?;

        Ok(DashboardStats {
            total_qr_codes,
            active_qr_codes,
            total_verifications,
            today_verifications,
        })
    }

    pub async fn overview(&self) -> Result<Dashboard, ServiceError> {
        let (stats, qr_codes, verifications) = futures::try_join!(
            self.stats(),
            async { self.store.list_qr_codes().await.map_err(ServiceError::from) },
            async {
                self.store
                    .list_verifications(Some(self.config.recent_limit))
                    .await
                    .map_err(ServiceError::from)
            },
        )?;

        Ok(Dashboard {
            stats,
            qr_codes,
            verifications,
        })
    }

    pub async fn recent_verifications(&self, limit: Option<i64>) -> Result<Vec<VerificationEntry>, ServiceError> {
        let limit = self.clamp_limit(limit);
        Ok(self.store.list_verifications(Some(limit)).await?)
    }

    /// Flip `is_active` on exactly one certificate
    pub async fn toggle(&self, id: Uuid) -> Result<ToggleResult, ServiceError> {
        let is_active = self
            .store
            .toggle_qr_code(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("QR code {}", id)))?;

        tracing::info!("QR code {} is now {}", id, if is_active { "active" } else { "inactive" });
        Ok(ToggleResult { id, is_active })
    }

    /// Every verification, newest first, as CSV
    pub async fn export_csv(&self) -> Result<CsvExport, ServiceError> {
        let entries = self.store.list_verifications(None).await?;
        tracing::info!("Exporting {} verifications", entries.len());
        Ok(CsvExport {
            filename: export_filename(Utc::now()),
            body: verifications_csv(&entries),
            rows: entries.len(),
        })
    }

    fn clamp_limit(&self, limit: Option<i64>) -> i64 {
        match limit {
            Some(n) if n > 0 => n.min(self.config.max_limit),
            _ => self.config.recent_limit.min(self.config.max_limit),
        }
    }
}

/// `[00:00, next 00:00)` of the UTC day containing `now`
pub fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .unwrap_or(now);
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::{CertificateData, NewVerification, VERIFIED_STATUS};
    use crate::store::{MemoryStore, NewQrCode};

    async fn seeded(codes: usize, scans_on_first: usize) -> (DashboardService, Arc<dyn Store>, Vec<Uuid>) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for i in 0..codes {
            let row = store
                .insert_qr_code(NewQrCode {
                    title: format!("Cert {}", i),
                    client_name: "Client".to_string(),
                    data: CertificateData::default(),
                    created_by: None,
                })
                .await
                .unwrap();
            ids.push(row.id);
        }
        for _ in 0..scans_on_first {
            store
                .insert_verification(NewVerification {
                    qr_id: ids[0],
                    ip_address: "10.0.0.1".to_string(),
                    user_agent: "test".to_string(),
                    status: VERIFIED_STATUS.to_string(),
                })
                .await
                .unwrap();
        }
        let service = DashboardService::new(store.clone(), AppConfig::development().dashboard);
        (service, store, ids)
    }

    #[test]
    fn day_bounds_cover_the_utc_day() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 17, 45, 12).unwrap();
        let (start, end) = utc_day_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn stats_count_everything() {
        let (service, store, ids) = seeded(3, 4).await;
        store.toggle_qr_code(ids[1]).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_qr_codes: 3,
                active_qr_codes: 2,
                total_verifications: 4,
                today_verifications: 4,
            }
        );
    }

    #[tokio::test]
    async fn toggle_flips_only_the_target() {
        let (service, store, ids) = seeded(3, 0).await;

        let result = service.toggle(ids[1]).await.unwrap();
        assert!(!result.is_active);
        for (i, id) in ids.iter().enumerate() {
            let row = store.get_qr_code(*id).await.unwrap().unwrap();
            assert_eq!(row.is_active, i != 1);
        }

        assert!(service.toggle(ids[1]).await.unwrap().is_active);
        assert!(matches!(service.toggle(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn export_has_a_line_per_verification() {
        let (service, _, _) = seeded(2, 7).await;
        let export = service.export_csv().await.unwrap();
        assert_eq!(export.rows, 7);
        assert_eq!(export.body.lines().count(), 8);
        assert!(export.filename.starts_with("verifications-"));
    }

    #[tokio::test]
    async fn recent_limit_is_clamped() {
        let (service, _, _) = seeded(1, 5).await;
        assert_eq!(service.recent_verifications(Some(2)).await.unwrap().len(), 2);
        assert_eq!(service.recent_verifications(Some(0)).await.unwrap().len(), 5);
        assert_eq!(service.clamp_limit(Some(10_000)), 500);
        assert_eq!(service.clamp_limit(None), 50);
    }

    #[tokio::test]
    async fn overview_bundles_stats_and_lists() {
        let (service, _, _) = seeded(2, 3).await;
        let dashboard = service.overview().await.unwrap();
        assert_eq!(dashboard.stats.total_qr_codes, 2);
        assert_eq!(dashboard.qr_codes.len(), 2);
        assert_eq!(dashboard.verifications.len(), 3);
    }
}
