//! Argon2id password hashing.
//!
//! Hashes are PHC strings, so each one carries its own salt and cost. Changing
//! the configured cost only affects new hashes; existing ones still verify.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version,
};
use secrecy::{ExposeSecret, SecretString};

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// # Errors
    /// Returns an error if Argon2 rejects the memory or iteration cost.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| anyhow!("invalid argon2 parameters: {err}"))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash(&self, password: &SecretString) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map_err(|err| anyhow!("failed to hash password: {err}"))?;
        Ok(hash.to_string())
    }

    /// Compare a plaintext against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    /// Returns an error if the stored hash cannot be parsed.
    pub fn verify(&self, password: &SecretString, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|err| anyhow!("invalid password hash: {err}"))?;
        Ok(self
            .argon2()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok())
    }
}

/// Hash on the blocking pool so the async workers are not stalled.
pub(super) async fn hash_password(hasher: &PasswordHasher, password: SecretString) -> Result<String> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("password hashing task failed")?
}

/// Verify on the blocking pool.
pub(super) async fn verify_password(
    hasher: &PasswordHasher,
    password: SecretString,
    hash: String,
) -> Result<bool> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .context("password verification task failed")?
}
