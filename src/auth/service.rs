use chrono::{Duration, Utc};
use serde::Serialize;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::{
    generate_jwt, generate_reset_token, hash_password, hash_reset_token, normalize_email,
    validate_jwt, validate_password, verify_password, AuthError, Claims,
};
use crate::config::AppConfig;
use crate::database::models::{PasswordReset, User};
use crate::database::DatabaseError;
use crate::store::Store;

static DUMMY_HASH: OnceCell<String> = OnceCell::new();

#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
    /// Seconds until the token expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct ResetRequested {
    /// Only populated when `security.expose_reset_tokens` is on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_url: Option<String>,
}

/// Account lifecycle: sign-up, sign-in, refresh, sign-out and password reset
pub struct AuthService {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        validate_password(password, self.config.security.min_password_length)?;

        let password_hash = hash_password(password, self.config.security.password_hash_cost)?;
        let user = self
            .store
            .create_user(&email, &password_hash)
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Database(other),
            })?;

        tracing::info!("Registered user {} ({})", user.email, user.id);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                self.burn_password_check(password)?;
                tracing::warn!("Login failed: unknown account {}", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!("Login failed: wrong password for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!("User {} signed in", user.email);
        self.issue(user)
    }

    /// Validate a bearer token and make sure its session was not signed out
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = validate_jwt(token, &self.config.security)?;
        if self.store.is_session_revoked(claims.jti).await? {
            return Err(AuthError::SessionRevoked);
        }
        Ok(claims)
    }

    pub async fn current_user(&self, claims: &Claims) -> Result<User, AuthError> {
        self.store
            .find_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Account no longer exists".to_string()))
    }

    /// Exchange a live session for a fresh one; the old session is revoked
    pub async fn refresh(&self, claims: &Claims) -> Result<LoginResult, AuthError> {
        let user = self.current_user(claims).await?;
        self.store.revoke_session(claims.jti, claims.expires_at()).await?;
        tracing::debug!("Refreshed session {} for {}", claims.jti, user.email);
        self.issue(user)
    }

    pub async fn logout(&self, claims: &Claims) -> Result<(), AuthError> {
        self.store.revoke_session(claims.jti, claims.expires_at()).await?;
        tracing::info!("User {} signed out (session {})", claims.email, claims.jti);
        Ok(())
    }

    /// Issue a reset token when the account exists. The outcome is the same
    /// either way so callers cannot enumerate registered emails.
    pub async fn request_password_reset(
        &self,
        email: &str,
        origin: &str,
    ) -> Result<ResetRequested, AuthError> {
        let email = match normalize_email(email) {
            Ok(email) => email,
            Err(_) => return Ok(ResetRequested { reset_url: None }),
        };

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("Password reset requested for unknown account {}", email);
                return Ok(ResetRequested { reset_url: None });
            }
        };

        let token = generate_reset_token();
        let now = Utc::now();
        let expires_at = Duration::try_minutes(self.config.security.reset_token_ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(now);
        self.store
            .insert_password_reset(PasswordReset {
                token_hash: hash_reset_token(&token),
                user_id: user.id,
                expires_at,
                used_at: None,
            })
            .await?;

        let reset_url = format!("{}/reset-password?token={}", origin.trim_end_matches('/'), token);
        tracing::info!("Password reset issued for {}", user.email);
        tracing::debug!("Password reset link: {}", reset_url);

        Ok(ResetRequested {
            reset_url: self.config.security.expose_reset_tokens.then_some(reset_url),
        })
    }

    pub async fn complete_password_reset(&self, token: &str, password: &str) -> Result<(), AuthError> {
        validate_password(password, self.config.security.min_password_length)?;

        let reset = self
            .store
            .consume_password_reset(&hash_reset_token(token.trim()), Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let password_hash = hash_password(password, self.config.security.password_hash_cost)?;
        self.store.update_password(reset.user_id, &password_hash).await?;

        tracing::info!("Password updated via reset for user {}", reset.user_id);
        Ok(())
    }

    /// Same bcrypt work as a real check, against a hash no password matches
    fn burn_password_check(&self, password: &str) -> Result<(), AuthError> {
        let dummy = DUMMY_HASH.get_or_try_init(|| {
            hash_password(&generate_reset_token(), self.config.security.password_hash_cost)
        })?;
        verify_password(password, dummy)?;
        Ok(())
    }

    fn issue(&self, user: User) -> Result<LoginResult, AuthError> {
        let claims = Claims::new(user.id, user.email.clone(), self.config.security.jwt_expiry_hours);
        let token = generate_jwt(&claims, &self.config.security)?;
        Ok(LoginResult {
            token,
            user,
            expires_in: claims.exp - claims.iat,
        })
    }
}
