//! In-process stores backed by `tokio::sync::RwLock` maps.
//!
//! State lives as long as the process. Used when no DSN is configured and by
//! the test suites.

use anyhow::anyhow;
use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use super::{NewUser, Session, SessionStore, SessionToken, StoreError, User, UserStore};

#[derive(Debug)]
struct Users {
    next_id: i64,
    by_username: HashMap<String, User>,
}

#[derive(Debug)]
pub struct MemoryUserStore {
    users: RwLock<Users>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Users {
                next_id: 1,
                by_username: HashMap::new(),
            }),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn add(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.by_username.contains_key(&user.username) {
            return Err(StoreError::Conflict);
        }

        let record = User {
            id: users.next_id,
            username: user.username,
            password_hash: user.password_hash,
        };
        users.next_id += 1;
        users
            .by_username
            .insert(record.username.clone(), record.clone());

        Ok(record)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.by_username.get(username).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug)]
struct MemorySession {
    user: User,
    expires_at: Instant,
}

impl MemorySession {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Sessions keyed by token digest.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Vec<u8>, MemorySession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included until they are touched.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

const INSERT_ATTEMPTS: usize = 3;

// Token collisions are a store fault, not a caller conflict.
fn insert_unique(
    sessions: &mut HashMap<Vec<u8>, MemorySession>,
    user: &User,
    expires_at: Instant,
    mut next_token: impl FnMut() -> anyhow::Result<SessionToken>,
) -> Result<SessionToken, StoreError> {
    for _ in 0..INSERT_ATTEMPTS {
        let token = next_token()?;
        let key = token.digest();
        if sessions.contains_key(&key) {
            continue;
        }
        sessions.insert(
            key,
            MemorySession {
                user: user.clone(),
                expires_at,
            },
        );
        return Ok(token);
    }

    Err(anyhow!("failed to generate unique session token").into())
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user: &User, ttl: Duration) -> Result<SessionToken, StoreError> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now);
        let mut sessions = self.sessions.write().await;

        // Drop expired entries while holding the lock anyway.
        sessions.retain(|_, session| session.is_live(now));

        insert_unique(&mut sessions, user, expires_at, SessionToken::generate)
    }

    async fn lookup(&self, token: &SessionToken) -> Result<Option<Session>, StoreError> {
        let key = token.digest();
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&key) {
                None => return Ok(None),
                Some(session) if session.is_live(now) => {
                    return Ok(Some(Session {
                        token: token.clone(),
                        user: session.user.clone(),
                    }));
                }
                Some(_) => {}
            }
        }

        self.sessions.write().await.remove(&key);
        Ok(None)
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), StoreError> {
        self.sessions.write().await.remove(&token.digest());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn add_assigns_increasing_ids() -> Result<()> {
        let store = MemoryUserStore::new();
        let sue = store.add(new_user("sue")).await?;
        let bob = store.add(new_user("bob")).await?;
        assert_eq!(sue.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(sue.username, "sue");
        Ok(())
    }

    #[tokio::test]
    async fn add_rejects_duplicate_username() -> Result<()> {
        let store = MemoryUserStore::new();
        store.add(new_user("sue")).await?;
        let second = store.add(new_user("sue")).await;
        assert!(matches!(second, Err(StoreError::Conflict)));
        Ok(())
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() -> Result<()> {
        let store = MemoryUserStore::new();
        store.add(new_user("sue")).await?;
        assert!(store.find_by_username("Sue").await?.is_none());
        assert!(store.find_by_username("sue").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn find_by_username_returns_stored_record() -> Result<()> {
        let store = MemoryUserStore::new();
        let created = store.add(new_user("sue")).await?;
        let found = store
            .find_by_username("sue")
            .await?
            .context("user should exist")?;
        assert_eq!(found, created);
        assert!(store.find_by_username("nobody").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn session_lifecycle() -> Result<()> {
        let users = MemoryUserStore::new();
        let sessions = MemorySessionStore::new();
        let user = users.add(new_user("sue")).await?;

        let token = sessions.create(&user, Duration::from_secs(60)).await?;
        let session = sessions.lookup(&token).await?.context("session exists")?;
        assert_eq!(session.user, user);
        assert_eq!(session.token, token);

        sessions.destroy(&token).await?;
        assert!(sessions.lookup(&token).await?.is_none());
        assert!(sessions.is_empty().await);

        // Destroying twice is fine.
        sessions.destroy(&token).await?;
        Ok(())
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_purged() -> Result<()> {
        let users = MemoryUserStore::new();
        let sessions = MemorySessionStore::new();
        let user = users.add(new_user("sue")).await?;

        let token = sessions.create(&user, Duration::ZERO).await?;
        assert_eq!(sessions.len().await, 1);
        assert!(sessions.lookup(&token).await?.is_none());
        assert_eq!(sessions.len().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_is_absent() -> Result<()> {
        let sessions = MemorySessionStore::new();
        let token = SessionToken::new("never-issued".to_string());
        assert!(sessions.lookup(&token).await?.is_none());
        Ok(())
    }

    #[test]
    fn exhausted_token_attempts_are_a_backend_error() -> Result<()> {
        let user = User {
            id: 1,
            username: "sue".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        };
        let expires_at = Instant::now() + Duration::from_secs(60);
        let fixed = || Ok(SessionToken::new("fixed".to_string()));

        let mut sessions = HashMap::new();
        insert_unique(&mut sessions, &user, expires_at, fixed)?;

        let mut attempts = 0;
        let result = insert_unique(&mut sessions, &user, expires_at, || {
            attempts += 1;
            fixed()
        });
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert_eq!(attempts, INSERT_ATTEMPTS);
        assert_eq!(sessions.len(), 1);
        Ok(())
    }

    #[test]
    fn colliding_token_is_retried() -> Result<()> {
        let user = User {
            id: 1,
            username: "sue".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        };
        let expires_at = Instant::now() + Duration::from_secs(60);

        let mut sessions = HashMap::new();
        insert_unique(&mut sessions, &user, expires_at, || {
            Ok(SessionToken::new("taken".to_string()))
        })?;

        let mut candidates = vec!["fresh", "taken"];
        let token = insert_unique(&mut sessions, &user, expires_at, || {
            candidates
                .pop()
                .map(|value| SessionToken::new(value.to_string()))
                .context("no candidates left")
        })?;
        assert_eq!(token.as_str(), "fresh");
        assert_eq!(sessions.len(), 2);
        Ok(())
    }
}
