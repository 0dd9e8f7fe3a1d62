//! Error type shared by the auth guards and handlers.
//!
//! Client-input failures render as `{"message": ...}` with a fixed text.
//! Store and internal failures render as a bare 500; the cause is only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::types::MessageResponse;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username taken")]
    UsernameTaken,
    #[error("Password must be longer than 3 chars")]
    PasswordTooShort,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing payload")]
    MissingPayload,
    #[error("store failure")]
    StoreFailure(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UsernameTaken | Self::PasswordTooShort => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::MissingPayload => StatusCode::BAD_REQUEST,
            Self::StoreFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::StoreFailure(err) => {
                error!("Store failure: {err:#}");
                (status, "Internal Server Error").into_response()
            }
            Self::Internal(err) => {
                error!("Internal error: {err:#}");
                (status, "Internal Server Error").into_response()
            }
            other => (status, Json(MessageResponse::new(other.to_string()))).into_response(),
        }
    }
}
