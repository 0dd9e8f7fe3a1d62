//! Request/response types for auth endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/auth/register` and `POST /api/auth/login`.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Credentials for the lifetime of one request; the plaintext stays wrapped.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl From<CredentialsRequest> for Credentials {
    fn from(request: CredentialsRequest) -> Self {
        Self {
            username: request.username,
            password: SecretString::from(request.password),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub username: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::ExposeSecret;

    #[test]
    fn credentials_request_debug_hides_password() {
        let request = CredentialsRequest {
            username: "sue".to_string(),
            password: "hunter22".to_string(),
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("sue"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn credentials_keep_plaintext_out_of_debug() {
        let credentials = Credentials::from(CredentialsRequest {
            username: "sue".to_string(),
            password: "hunter22".to_string(),
        });
        assert_eq!(credentials.password.expose_secret(), "hunter22");
        assert!(!format!("{credentials:?}").contains("hunter22"));
    }

    #[test]
    fn register_response_uses_user_id_field() -> Result<()> {
        let response = RegisterResponse {
            user_id: 2,
            username: "sue".to_string(),
        };
        let value = serde_json::to_value(&response)?;
        assert_eq!(value, serde_json::json!({"user_id": 2, "username": "sue"}));
        Ok(())
    }
}
