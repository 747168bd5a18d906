use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewQrCode, Store};
use crate::database::models::{
    NewVerification, PasswordReset, QrCode, QrCodeSummary, User, Verification, VerificationEntry,
};
use crate::database::DatabaseError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    password_resets: HashMap<String, PasswordReset>,
    revoked_sessions: HashMap<Uuid, DateTime<Utc>>,
    qr_codes: HashMap<Uuid, QrCode>,
    // Insertion order; scanned_at ties keep the later insert first when listing
    verifications: Vec<Verification>,
}

/// Process-local store with the same observable behaviour as `PgStore`
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(DatabaseError::Conflict("email already registered".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn insert_password_reset(&self, reset: PasswordReset) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.password_resets.contains_key(&reset.token_hash) {
            return Err(DatabaseError::Conflict("duplicate reset token".to_string()));
        }
        tables.password_resets.insert(reset.token_hash.clone(), reset);
        Ok(())
    }

    async fn consume_password_reset(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordReset>, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.password_resets.get_mut(token_hash) {
            Some(reset) if reset.used_at.is_none() && reset.expires_at > now => {
                reset.used_at = Some(now);
                Ok(Some(reset.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn revoke_session(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        tables.revoked_sessions.retain(|_, exp| *exp >= now);
        tables.revoked_sessions.insert(jti, expires_at);
        Ok(())
    }

    async fn is_session_revoked(&self, jti: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.tables.read().await.revoked_sessions.contains_key(&jti))
    }

    async fn insert_qr_code(&self, new: NewQrCode) -> Result<QrCode, DatabaseError> {
        let qr_code = QrCode {
            id: Uuid::new_v4(),
            title: new.title,
            client_name: new.client_name,
            data: new.data,
            is_active: true,
            qr_code_image: None,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        self.tables.write().await.qr_codes.insert(qr_code.id, qr_code.clone());
        Ok(qr_code)
    }

    async fn set_qr_code_image(&self, id: Uuid, image: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let qr_code = tables
            .qr_codes
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("QR code {}", id)))?;
        qr_code.qr_code_image = Some(image.to_string());
        Ok(())
    }

    async fn get_qr_code(&self, id: Uuid) -> Result<Option<QrCode>, DatabaseError> {
        Ok(self.tables.read().await.qr_codes.get(&id).cloned())
    }

    async fn get_active_qr_code(&self, id: Uuid) -> Result<Option<QrCode>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.qr_codes.get(&id).filter(|q| q.is_active).cloned())
    }

    async fn list_qr_codes(&self) -> Result<Vec<QrCodeSummary>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for v in &tables.verifications {
            *counts.entry(v.qr_id).or_default() += 1;
        }

        let mut rows: Vec<QrCodeSummary> = tables
            .qr_codes
            .values()
            .map(|q| QrCodeSummary {
                id: q.id,
                title: q.title.clone(),
                client_name: q.client_name.clone(),
                created_at: q.created_at,
                is_active: q.is_active,
                verification_count: counts.get(&q.id).copied().unwrap_or(0),
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn toggle_qr_code(&self, id: Uuid) -> Result<Option<bool>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.qr_codes.get_mut(&id).map(|q| {
            q.is_active = !q.is_active;
            q.is_active
        }))
    }

    async fn insert_verification(&self, new: NewVerification) -> Result<Verification, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.qr_codes.contains_key(&new.qr_id) {
            return Err(DatabaseError::NotFound(format!("QR code {}", new.qr_id)));
        }
        let verification = Verification {
            id: Uuid::new_v4(),
            qr_id: new.qr_id,
            scanned_at: Utc::now(),
            ip_address: new.ip_address,
            user_agent: new.user_agent,
            status: new.status,
        };
        tables.verifications.push(verification.clone());
        Ok(verification)
    }

    async fn list_verifications(&self, limit: Option<i64>) -> Result<Vec<VerificationEntry>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<VerificationEntry> = tables
            .verifications
            .iter()
            .rev()
            .map(|v| {
                let qr_code = tables.qr_codes.get(&v.qr_id);
                VerificationEntry {
                    id: v.id,
                    qr_id: v.qr_id,
                    scanned_at: v.scanned_at,
                    ip_address: v.ip_address.clone(),
                    user_agent: v.user_agent.clone(),
                    status: v.status.clone(),
                    qr_title: qr_code.map(|q| q.title.clone()),
                    qr_client_name: qr_code.map(|q| q.client_name.clone()),
                }
            })
            .collect();
        // Stable sort keeps reverse insertion order among equal timestamps
        rows.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at));
        if let Some(limit) = limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn count_qr_codes(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.qr_codes.len() as i64)
    }

    async fn count_active_qr_codes(&self) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.qr_codes.values().filter(|q| q.is_active).count() as i64)
    }

    async fn count_verifications(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.verifications.len() as i64)
    }

    async fn count_verifications_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .verifications
            .iter()
            .filter(|v| v.scanned_at >= start && v.scanned_at < end)
            .count() as i64)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
