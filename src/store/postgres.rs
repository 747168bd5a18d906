use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use uuid::Uuid;

use super::{NewQrCode, Store};
use crate::database::models::{
    CertificateData, NewVerification, PasswordReset, QrCode, QrCodeSummary, User, Verification,
    VerificationEntry,
};
use crate::database::{DatabaseError, DatabaseManager};

const QR_CODE_COLUMNS: &str =
    "id, title, client_name, data, is_active, qr_code_image, created_by, created_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn qr_code_from_row(row: &PgRow) -> Result<QrCode, sqlx::Error> {
        let Json(data): Json<CertificateData> = row.try_get("data")?;
        Ok(QrCode {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            client_name: row.try_get("client_name")?,
            data,
            is_active: row.try_get("is_active")?,
            qr_code_image: row.try_get("qr_code_image")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn count(&self, query: &str) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(query).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_unique_violation(e, "email already registered"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn insert_password_reset(&self, reset: PasswordReset) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO password_resets (token_hash, user_id, expires_at, used_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&reset.token_hash)
        .bind(reset.user_id)
        .bind(reset.expires_at)
        .bind(reset.used_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consume_password_reset(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordReset>, DatabaseError> {
        // Single statement so two concurrent requests cannot both consume the token
        let reset = sqlx::query_as::<_, PasswordReset>(
            "UPDATE password_resets SET used_at = $2
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > $2
             RETURNING token_hash, user_id, expires_at, used_at",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(reset)
    }

    async fn revoke_session(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO revoked_sessions (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        // Expired entries can never match a valid token again
        sqlx::query("DELETE FROM revoked_sessions WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_session_revoked(&self, jti: Uuid) -> Result<bool, DatabaseError> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_sessions WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;
        Ok(revoked)
    }

    async fn insert_qr_code(&self, new: NewQrCode) -> Result<QrCode, DatabaseError> {
        let query = format!(
            "INSERT INTO qr_codes (id, title, client_name, data, is_active, created_by)
             VALUES ($1, $2, $3, $4, TRUE, $5)
             RETURNING {}",
            QR_CODE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(&new.client_name)
            .bind(Json(&new.data))
            .bind(new.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(Self::qr_code_from_row(&row)?)
    }

    async fn set_qr_code_image(&self, id: Uuid, image: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE qr_codes SET qr_code_image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("QR code {}", id)));
        }
        Ok(())
    }

    async fn get_qr_code(&self, id: Uuid) -> Result<Option<QrCode>, DatabaseError> {
        let query = format!("SELECT {} FROM qr_codes WHERE id = $1", QR_CODE_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(Self::qr_code_from_row).transpose()?)
    }

    async fn get_active_qr_code(&self, id: Uuid) -> Result<Option<QrCode>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM qr_codes WHERE id = $1 AND is_active = TRUE",
            QR_CODE_COLUMNS
        );
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(Self::qr_code_from_row).transpose()?)
    }

    async fn list_qr_codes(&self) -> Result<Vec<QrCodeSummary>, DatabaseError> {
        let rows = sqlx::query_as::<_, QrCodeSummary>(
            "SELECT q.id, q.title, q.client_name, q.created_at, q.is_active,
                    COUNT(v.id) AS verification_count
             FROM qr_codes q
             LEFT JOIN verifications v ON v.qr_id = q.id
             GROUP BY q.id
             ORDER BY q.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn toggle_qr_code(&self, id: Uuid) -> Result<Option<bool>, DatabaseError> {
        let is_active: Option<bool> = sqlx::query_scalar(
            "UPDATE qr_codes SET is_active = NOT is_active WHERE id = $1 RETURNING is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(is_active)
    }

    async fn insert_verification(&self, new: NewVerification) -> Result<Verification, DatabaseError> {
        let verification = sqlx::query_as::<_, Verification>(
            "INSERT INTO verifications (id, qr_id, ip_address, user_agent, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, qr_id, scanned_at, ip_address, user_agent, status",
        )
        .bind(Uuid::new_v4())
        .bind(new.qr_id)
        .bind(&new.ip_address)
        .bind(&new.user_agent)
        .bind(&new.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(verification)
    }

    async fn list_verifications(&self, limit: Option<i64>) -> Result<Vec<VerificationEntry>, DatabaseError> {
        // LIMIT NULL is no limit in Postgres
        let rows = sqlx::query_as::<_, VerificationEntry>(
            "SELECT v.id, v.qr_id, v.scanned_at, v.ip_address, v.user_agent, v.status,
                    q.title AS qr_title, q.client_name AS qr_client_name
             FROM verifications v
             LEFT JOIN qr_codes q ON q.id = v.qr_id
             ORDER BY v.scanned_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_qr_codes(&self) -> Result<i64, DatabaseError> {
        self.count("SELECT COUNT(*) FROM qr_codes").await
    }

    async fn count_active_qr_codes(&self) -> Result<i64, DatabaseError> {
        self.count("SELECT COUNT(*) FROM qr_codes WHERE is_active = TRUE").await
    }

    async fn count_verifications(&self) -> Result<i64, DatabaseError> {
        self.count("SELECT COUNT(*) FROM verifications").await
    }

    async fn count_verifications_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM verifications WHERE scanned_at >= $1 AND scanned_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::VERIFIED_STATUS;

    async fn store() -> PgStore {
        dotenvy::dotenv().ok();
        let pool = DatabaseManager::connect(&AppConfig::development().database)
            .await
            .unwrap();
        DatabaseManager::migrate(&pool).await.unwrap();
        PgStore::new(pool)
    }

    fn new_qr(title: &str) -> NewQrCode {
        NewQrCode {
            title: title.to_string(),
            client_name: "Client".to_string(),
            data: CertificateData::default(),
            created_by: None,
        }
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL pointing at a disposable Postgres database"]
    async fn toggle_counts_and_unbounded_listing() {
        let store = store().await;
        let scanned = store.insert_qr_code(new_qr("Scanned")).await.unwrap();
        let idle = store.insert_qr_code(new_qr("Idle")).await.unwrap();

        for _ in 0..3 {
            store
                .insert_verification(NewVerification {
                    qr_id: scanned.id,
                    ip_address: "10.0.0.1".to_string(),
                    user_agent: "test".to_string(),
                    status: VERIFIED_STATUS.to_string(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.toggle_qr_code(idle.id).await.unwrap(), Some(false));
        assert!(store.get_qr_code(scanned.id).await.unwrap().unwrap().is_active);
        assert!(store.get_active_qr_code(idle.id).await.unwrap().is_none());
        assert_eq!(store.toggle_qr_code(Uuid::new_v4()).await.unwrap(), None);

        let summaries = store.list_qr_codes().await.unwrap();
        let count_for = |id: Uuid| {
            summaries
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.verification_count)
        };
        assert_eq!(count_for(scanned.id), Some(3));
        assert_eq!(count_for(idle.id), Some(0));

        let all = store.list_verifications(None).await.unwrap();
        assert_eq!(all.iter().filter(|v| v.qr_id == scanned.id).count(), 3);
        assert_eq!(store.list_verifications(Some(1)).await.unwrap().len(), 1);
    }
}
