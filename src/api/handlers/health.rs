use super::auth::AuthState;
use crate::GIT_COMMIT_HASH;
use axum::{
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    store: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "User and session stores are reachable", body = Health),
        (status = 503, description = "A store is unreachable", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let users = auth_state.users().ping().await;
    if let Err(err) = &users {
        error!("User store ping failed: {err:#}");
    }
    let sessions = auth_state.sessions().ping().await;
    if let Err(err) = &sessions {
        error!("Session store ping failed: {err:#}");
    }
    let healthy = users.is_ok() && sessions.is_ok();

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if healthy { "ok" } else { "error" }.to_string(),
    };

    let short_hash = GIT_COMMIT_HASH.get(0..7).unwrap_or(GIT_COMMIT_HASH);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )) {
        headers.insert("X-App", value);
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, headers, Json(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::handlers::auth::AuthConfig,
        store::{
            memory::MemorySessionStore, NewUser, SessionStore, StoreError, User, UserStore,
        },
    };
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::body::to_bytes;

    struct DownUserStore;

    #[async_trait]
    impl UserStore for DownUserStore {
        async fn add(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Backend(anyhow!("down")))
        }

        async fn find_by_username(&self, _username: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Backend(anyhow!("down")))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend(anyhow!("down")))
        }
    }

    #[tokio::test]
    async fn healthy_stores_report_ok() -> Result<()> {
        let state = Arc::new(AuthState::in_memory(AuthConfig::new())?);
        let response = health(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let app_header = response
            .headers()
            .get("X-App")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        assert!(app_header.is_some_and(|value| value.starts_with(env!("CARGO_PKG_NAME"))));

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(payload["store"], "ok");
        assert_eq!(payload["version"], env!("CARGO_PKG_VERSION"));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_store_reports_unavailable() -> Result<()> {
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let state = Arc::new(AuthState::new(
            AuthConfig::new(),
            Arc::new(DownUserStore),
            sessions,
        )?);
        let response = health(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(payload["store"], "error");
        Ok(())
    }
}
