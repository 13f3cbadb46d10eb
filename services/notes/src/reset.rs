//! Password reset flow
//!
//! `request_reset` stores a random single-use token with an expiry on the
//! account and hands it to a [`ResetNotifier`]. The token validates strictly
//! before its expiry and only until it has been consumed. Unknown emails get
//! the same outcome as known ones.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::{Alphanumeric, DistString};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::error::{ApiError, ApiResult};
use crate::password::PasswordHasher;
use crate::repositories::UserStore;
use crate::validation::{normalize_email, validate_password, validate_required};

const TOKEN_LEN: usize = 48;

/// Outcome of checking a reset token. Unknown, expired and already used
/// tokens are all `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenStatus {
    Valid,
    Invalid,
}

/// Delivers reset tokens to account owners
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    async fn deliver(&self, email: &str, token: &str, expires_at: DateTime<Utc>) -> ApiResult<()>;
}

/// Writes the reset link to the service log
pub struct LogNotifier {
    base_url: String,
}

impl LogNotifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.base_url.trim_end_matches('/'),
            token
        )
    }
}

#[async_trait]
impl ResetNotifier for LogNotifier {
    async fn deliver(&self, email: &str, token: &str, expires_at: DateTime<Utc>) -> ApiResult<()> {
        info!(
            email = %email,
            expires_at = %expires_at,
            link = %self.reset_link(token),
            "Password reset link issued"
        );
        Ok(())
    }
}

/// Keeps the latest token per email in memory
#[derive(Clone, Default)]
pub struct MemoryOutbox {
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent token delivered to `email`
    pub async fn token_for(&self, email: &str) -> Option<String> {
        self.tokens.read().await.get(email).cloned()
    }

    pub async fn delivered(&self) -> usize {
        self.tokens.read().await.len()
    }
}

#[async_trait]
impl ResetNotifier for MemoryOutbox {
    async fn deliver(&self, email: &str, token: &str, _expires_at: DateTime<Utc>) -> ApiResult<()> {
        self.tokens
            .write()
            .await
            .insert(email.to_string(), token.to_string());
        Ok(())
    }
}

/// Password reset service
#[derive(Clone)]
pub struct PasswordResetService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    notifier: Arc<dyn ResetNotifier>,
    ttl: Duration,
}

impl PasswordResetService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        notifier: Arc<dyn ResetNotifier>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            notifier,
            ttl,
        }
    }

    /// Issue a reset token for `email` if an account exists. Succeeds the
    /// same way whether or not it does.
    pub async fn request_reset(&self, email: &str) -> ApiResult<()> {
        if validate_required("Email", email).is_err() {
            debug!("Ignoring reset request without an email");
            return Ok(());
        }

        let email = normalize_email(email);
        let token = generate_token();
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ApiError::Internal("Reset token expiry out of range".to_string()))?;

        match self.users.set_reset_token(&email, &token, expires_at).await? {
            Some(user) => {
                info!("Reset token issued for user {}", user.id);
                if let Err(e) = self.notifier.deliver(&user.email, &token, expires_at).await {
                    error!("Failed to deliver reset token for user {}: {}", user.id, e);
                }
            }
            None => debug!("Reset requested for an unknown email"),
        }

        Ok(())
    }

    pub async fn validate_token(&self, token: &str) -> ApiResult<ResetTokenStatus> {
        self.validate_token_at(token, Utc::now()).await
    }

    /// Check `token` as of `now`
    pub async fn validate_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<ResetTokenStatus> {
        if token.trim().is_empty() {
            return Ok(ResetTokenStatus::Invalid);
        }

        let status = match self.users.find_by_valid_reset_token(token, now).await? {
            Some(_) => ResetTokenStatus::Valid,
            None => ResetTokenStatus::Invalid,
        };
        Ok(status)
    }

    /// Set a new password with a valid token and burn the token
    pub async fn consume_reset(&self, token: &str, new_password: &str) -> ApiResult<()> {
        let now = Utc::now();
        if self.validate_token_at(token, now).await? == ResetTokenStatus::Invalid {
            return Err(ApiError::InvalidToken);
        }

        validate_password(new_password).map_err(ApiError::Validation)?;
        let password_hash = self.hasher.hash(new_password.to_string()).await?;

        // Conditioned on the token again: a concurrent consumer may have won.
        let user = self
            .users
            .consume_reset_token(token, &password_hash, now)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        info!("Password reset completed for user {}", user.id);
        Ok(())
    }
}

fn generate_token() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), TOKEN_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::repositories::MemoryUserStore;

    struct Fixture {
        users: Arc<MemoryUserStore>,
        outbox: MemoryOutbox,
        hasher: PasswordHasher,
        resets: PasswordResetService,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserStore::new());
        let outbox = MemoryOutbox::new();
        let hasher = PasswordHasher::new(1024, 1).unwrap();
        users
            .create(&NewUser {
                first_name: "A".into(),
                last_name: "B".into(),
                email: "a@b.com".into(),
                password_hash: hasher.hash_blocking("original").unwrap(),
            })
            .await
            .unwrap();

        let resets = PasswordResetService::new(
            users.clone(),
            hasher.clone(),
            Arc::new(outbox.clone()),
            Duration::hours(1),
        );
        Fixture {
            users,
            outbox,
            hasher,
            resets,
        }
    }

    #[test]
    fn test_tokens_are_long_and_random() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_reset_link() {
        let notifier = LogNotifier::new("https://notes.example.com/");
        assert_eq!(
            notifier.reset_link("abc"),
            "https://notes.example.com/reset-password?token=abc"
        );
    }

    #[tokio::test]
    async fn test_request_then_validate() {
        let f = fixture().await;
        f.resets.request_reset("a@b.com").await.unwrap();

        let token = f.outbox.token_for("a@b.com").await.unwrap();
        assert_eq!(
            f.resets.validate_token(&token).await.unwrap(),
            ResetTokenStatus::Valid
        );
    }

    #[tokio::test]
    async fn test_token_invalid_past_expiry() {
        let f = fixture().await;
        f.resets.request_reset("a@b.com").await.unwrap();
        let token = f.outbox.token_for("a@b.com").await.unwrap();

        let later = Utc::now() + Duration::hours(1) + Duration::seconds(1);
        assert_eq!(
            f.resets.validate_token_at(&token, later).await.unwrap(),
            ResetTokenStatus::Invalid
        );
    }

    #[tokio::test]
    async fn test_unknown_email_is_silent() {
        let f = fixture().await;
        f.resets.request_reset("nobody@b.com").await.unwrap();
        f.resets.request_reset("not an email").await.unwrap();
        f.resets.request_reset("   ").await.unwrap();
        assert_eq!(f.outbox.delivered().await, 0);
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_an_error() {
        let f = fixture().await;
        let resets = PasswordResetService::new(
            f.users.clone(),
            f.hasher.clone(),
            Arc::new(f.outbox.clone()),
            Duration::days(100_000_000),
        );

        let err = resets.request_reset("a@b.com").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(f.outbox.delivered().await, 0);
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let f = fixture().await;
        f.resets.request_reset("a@b.com").await.unwrap();
        let token = f.outbox.token_for("a@b.com").await.unwrap();

        f.resets.consume_reset(&token, "brand-new").await.unwrap();
        let err = f.resets.consume_reset(&token, "again-new").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));

        let user = f.users.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(f.hasher.verify_blocking("brand-new", &user.password_hash).unwrap());
        assert!(user.reset_token.is_none());
        assert!(user.reset_token_expires_at.is_none());
        assert_eq!(
            f.resets.validate_token(&token).await.unwrap(),
            ResetTokenStatus::Invalid
        );
    }

    #[tokio::test]
    async fn test_weak_password_keeps_the_token() {
        let f = fixture().await;
        f.resets.request_reset("a@b.com").await.unwrap();
        let token = f.outbox.token_for("a@b.com").await.unwrap();

        let err = f.resets.consume_reset(&token, "123").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(
            f.resets.validate_token(&token).await.unwrap(),
            ResetTokenStatus::Valid
        );
    }

    #[tokio::test]
    async fn test_new_request_replaces_old_token() {
        let f = fixture().await;
        f.resets.request_reset("a@b.com").await.unwrap();
        let first = f.outbox.token_for("a@b.com").await.unwrap();
        f.resets.request_reset("a@b.com").await.unwrap();
        let second = f.outbox.token_for("a@b.com").await.unwrap();

        assert_eq!(
            f.resets.validate_token(&first).await.unwrap(),
            ResetTokenStatus::Invalid
        );
        assert_eq!(
            f.resets.validate_token(&second).await.unwrap(),
            ResetTokenStatus::Valid
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_invalid() {
        let f = fixture().await;
        assert_eq!(
            f.resets.validate_token("nope").await.unwrap(),
            ResetTokenStatus::Invalid
        );
        assert!(matches!(
            f.resets.consume_reset("nope", "whatever").await.unwrap_err(),
            ApiError::InvalidToken
        ));
    }
}
