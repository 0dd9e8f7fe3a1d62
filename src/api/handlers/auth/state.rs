//! Auth state and configuration shared by every auth handler.

use anyhow::Result;
use std::{sync::Arc, time::Duration};

use super::password::PasswordHasher;
use crate::store::{
    memory::{MemorySessionStore, MemoryUserStore},
    SessionStore, UserStore,
};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 12 * 60 * 60;
const DEFAULT_HASH_MEMORY_KIB: u32 = 19 * 1024;
const DEFAULT_HASH_ITERATIONS: u32 = 2;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: u64,
    session_cookie_secure: bool,
    hash_memory_kib: u32,
    hash_iterations: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            hash_memory_kib: DEFAULT_HASH_MEMORY_KIB,
            hash_iterations: DEFAULT_HASH_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_hash_memory_kib(mut self, memory_kib: u32) -> Self {
        self.hash_memory_kib = memory_kib;
        self
    }

    #[must_use]
    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.hash_iterations = iterations;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub fn hash_memory_kib(&self) -> u32 {
        self.hash_memory_kib
    }

    #[must_use]
    pub fn hash_iterations(&self) -> u32 {
        self.hash_iterations
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything an auth request needs: config, hasher, and both stores.
///
/// Injected into the router as `Extension<Arc<AuthState>>`.
pub struct AuthState {
    config: AuthConfig,
    hasher: PasswordHasher,
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the configured hashing cost is rejected by Argon2.
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let hasher = PasswordHasher::new(config.hash_memory_kib(), config.hash_iterations())?;
        Ok(Self {
            config,
            hasher,
            users,
            sessions,
        })
    }

    /// Auth state over fresh in-memory stores.
    ///
    /// # Errors
    /// Returns an error if the configured hashing cost is rejected by Argon2.
    pub fn in_memory(config: AuthConfig) -> Result<Self> {
        Self::new(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults() {
        let config = AuthConfig::new();
        assert_eq!(config.session_ttl_seconds(), 43_200);
        assert_eq!(config.session_ttl(), Duration::from_secs(43_200));
        assert!(!config.session_cookie_secure());
        assert_eq!(config.hash_memory_kib(), 19_456);
        assert_eq!(config.hash_iterations(), 2);
    }

    #[test]
    fn auth_config_builders_override_defaults() {
        let config = AuthConfig::new()
            .with_session_ttl_seconds(60)
            .with_session_cookie_secure(true)
            .with_hash_memory_kib(64)
            .with_hash_iterations(1);
        assert_eq!(config.session_ttl_seconds(), 60);
        assert!(config.session_cookie_secure());
        assert_eq!(config.hash_memory_kib(), 64);
        assert_eq!(config.hash_iterations(), 1);
    }

    #[test]
    fn auth_state_rejects_invalid_hash_cost() {
        let config = AuthConfig::new().with_hash_iterations(0);
        assert!(AuthState::in_memory(config).is_err());
    }
}
