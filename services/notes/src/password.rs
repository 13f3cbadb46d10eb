//! Password hashing with Argon2id
//!
//! The cost parameters are fixed when a hash is produced and travel inside the
//! PHC string, so changing them only affects new hashes. Hashing is CPU and
//! memory heavy and runs on the blocking thread pool.
//!
//! Each hasher also keeps a decoy hash made with its own parameters. Checking
//! a password against it costs the same as a real verification, which keeps
//! logins for unknown emails from finishing early.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};

use rand::distributions::{Alphanumeric, DistString};

use crate::error::{ApiError, ApiResult};

const DECOY_PLAINTEXT_LEN: usize = 32;

/// Argon2id hasher with fixed cost parameters
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    decoy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Build a hasher with the given memory cost (KiB) and iteration count
    pub fn new(memory_kib: u32, iterations: u32) -> ApiResult<Self> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| ApiError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;

        let mut hasher = Self {
            params,
            decoy_hash: Arc::from(""),
        };
        let decoy = Alphanumeric.sample_string(&mut rand::thread_rng(), DECOY_PLAINTEXT_LEN);
        hasher.decoy_hash = Arc::from(hasher.hash_blocking(&decoy)?);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash_blocking(&self, password: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();
        Ok(hash)
    }

    /// Check a plaintext password against a stored PHC string
    pub fn verify_blocking(&self, password: &str, password_hash: &str) -> ApiResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| ApiError::Internal(format!("Failed to parse password hash: {}", e)))?;

        // Verification reads the cost parameters from the hash itself.
        let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
        Ok(result.is_ok())
    }

    pub async fn hash(&self, password: String) -> ApiResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    pub async fn verify(&self, password: String, password_hash: String) -> ApiResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &password_hash))
            .await
            .map_err(|e| ApiError::Internal(format!("Password verification task failed: {}", e)))?
    }

    /// Spend one verification's worth of work on a password that has no
    /// account behind it. The result is always a mismatch.
    pub async fn verify_decoy(&self, password: String) -> ApiResult<()> {
        self.verify(password, self.decoy_hash.to_string()).await?;
        Ok(())
    }
}
