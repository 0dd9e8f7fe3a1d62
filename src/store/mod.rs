//! User and session persistence.
//!
//! Handlers only talk to the [`UserStore`] and [`SessionStore`] traits. Two
//! backends are provided: [`memory`] for single-process deployments and tests,
//! and [`postgres`] for shared deployments.
//!
//! Session tokens are opaque random values. Stores key sessions by the SHA-256
//! of the token ([`SessionToken::digest`]) so raw tokens never reach storage.

pub mod memory;
pub mod postgres;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::{fmt, time::Duration};

/// A persisted user record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// A user about to be inserted; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// A live session resolved from a token.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: SessionToken,
    pub user: User,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Opaque session token as handed to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Create a token from 32 bytes of OS randomness, URL-safe base64 encoded.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate session token")?;
        Ok(Self(
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 of the raw token, used as the storage key.
    #[must_use]
    pub fn digest(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Credential store: insert users and find them by username.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Returns [`StoreError::Conflict`] when the username exists.
    async fn add(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Cheap reachability check for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Session store: bind opaque tokens to users until they expire or are destroyed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Start a session for `user` that expires after `ttl`.
    async fn create(&self, user: &User, ttl: Duration) -> Result<SessionToken, StoreError>;

    /// Resolve a token; expired or unknown tokens resolve to `None`.
    async fn lookup(&self, token: &SessionToken) -> Result<Option<Session>, StoreError>;

    /// Remove a session. Destroying an unknown token is not an error.
    async fn destroy(&self, token: &SessionToken) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn generate_session_token_round_trip() {
        let decoded_len = SessionToken::generate()
            .ok()
            .and_then(|token| URL_SAFE_NO_PAD.decode(token.as_str().as_bytes()).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn generated_tokens_differ() -> Result<()> {
        let first = SessionToken::generate()?;
        let second = SessionToken::generate()?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn digest_is_stable_and_distinct() {
        let first = SessionToken::new("token".to_string()).digest();
        let second = SessionToken::new("token".to_string()).digest();
        let other = SessionToken::new("other".to_string()).digest();
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), 32);
    }

    #[test]
    fn debug_redacts_token() {
        let token = SessionToken::new("super-secret".to_string());
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
