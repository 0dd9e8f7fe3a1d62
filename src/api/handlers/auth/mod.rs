//! Auth handlers and supporting modules.
//!
//! Register, login and logout are composed from the same parts: an ordered
//! guard list (`guards`), the Argon2id hasher (`password`), and the session
//! store reached through `AuthState`.
//!
//! ## Session cookie
//!
//! Login sets `gatehouse_session` (`HttpOnly`, `SameSite=Lax`, `Max-Age` equal
//! to the session TTL). Logout always clears it. A `Bearer` authorization
//! header is accepted in place of the cookie.

pub(crate) mod error;
pub(crate) mod guards;
pub(crate) mod login;
mod password;
pub(crate) mod register;
pub(crate) mod session;
mod state;
pub(crate) mod types;

pub use session::SESSION_COOKIE_NAME;
pub use state::{AuthConfig, AuthState};
