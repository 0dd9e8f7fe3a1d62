//! Pre-handler checks for the auth endpoints.
//!
//! Each handler declares an ordered guard list. [`run`] evaluates the list in
//! order and stops at the first failure, so a handler body only executes once
//! every guard has passed. `UsernameExists` hands the matched user forward.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::{error::AuthError, types::Credentials};
use crate::store::{User, UserStore};

/// Passwords must be strictly longer than this many characters.
pub const PASSWORD_MIN_EXCLUSIVE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    /// Fails with `UsernameTaken` when the username is already registered.
    UsernameFree,
    /// Fails with `InvalidCredentials` when the username is unknown.
    UsernameExists,
    /// Fails with `PasswordTooShort` when the password has 3 chars or fewer.
    PasswordLength,
}

/// Password length needs no store round-trip, so it runs first.
pub const REGISTER: &[Guard] = &[Guard::PasswordLength, Guard::UsernameFree];
pub const LOGIN: &[Guard] = &[Guard::UsernameExists];

impl Guard {
    async fn check(
        self,
        credentials: &Credentials,
        users: &dyn UserStore,
    ) -> Result<Option<User>, AuthError> {
        match self {
            Self::UsernameFree => match users.find_by_username(&credentials.username).await? {
                Some(_) => Err(AuthError::UsernameTaken),
                None => Ok(None),
            },
            Self::UsernameExists => match users.find_by_username(&credentials.username).await? {
                Some(user) => Ok(Some(user)),
                None => Err(AuthError::InvalidCredentials),
            },
            Self::PasswordLength => {
                if password_long_enough(&credentials.password) {
                    Ok(None)
                } else {
                    Err(AuthError::PasswordTooShort)
                }
            }
        }
    }
}

// Length is counted in UTF-16 code units, the way browser clients count it.
fn password_long_enough(password: &SecretString) -> bool {
    password.expose_secret().encode_utf16().count() > PASSWORD_MIN_EXCLUSIVE
}

/// Run `guards` in order. Returns the user attached by `UsernameExists`, if
/// that guard was part of the list.
///
/// # Errors
/// Returns the first guard failure, or a store failure from a lookup.
pub async fn run(
    guards: &[Guard],
    credentials: &Credentials,
    users: &dyn UserStore,
) -> Result<Option<User>, AuthError> {
    let mut attached = None;
    for guard in guards {
        match guard.check(credentials, users).await {
            Ok(Some(user)) => attached = Some(user),
            Ok(None) => {}
            Err(err) => {
                debug!(?guard, "guard rejected request: {err}");
                return Err(err);
            }
        }
    }
    Ok(attached)
}
