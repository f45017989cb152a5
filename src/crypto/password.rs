use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::Config;
use crate::error::AppError;

/// Argon2id password hasher with a fixed work factor.
///
/// Output is a PHC string, so the salt and parameters travel with the hash and
/// verification keeps working after the configured work factor changes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a throwaway password at the configured cost. Unknown users are
    /// checked against it so a miss costs as much as a wrong password.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid password hash params: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"no-such-user", &salt)
            .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(PasswordHasher { argon2, dummy_hash })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC string.
    ///
    /// A malformed hash is a plain mismatch; callers cannot tell the two apart.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// Spend one verification worth of work and fail
    pub async fn reject_blocking(&self, password: String) -> bool {
        self.verify_blocking(password, self.dummy_hash.clone()).await;
        false
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(&self, password: String, stored_hash: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .unwrap_or(false)
    }
}
