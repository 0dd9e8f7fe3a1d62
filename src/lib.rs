//! # Gatehouse (session-based authentication)
//!
//! `gatehouse` registers users with a salted password hash, authenticates
//! credentials into a server-side session, and terminates that session.
//!
//! ## Request flow
//!
//! Every auth request runs an explicit, ordered list of guards before the
//! handler body. The first failing guard short-circuits the request with a
//! fixed JSON message; the handler only runs when all guards pass.
//!
//! - **Register:** password length, then username availability.
//! - **Login:** username lookup, then a constant-time hash comparison.
//! - **Logout:** idempotent; a missing session is reported, not rejected.
//!
//! ## Sessions
//!
//! Sessions are opaque random tokens carried in an `HttpOnly` cookie (or a
//! bearer header). Stores only ever see the SHA-256 of a token, and expiry is
//! enforced by the store on lookup.
//!
//! ## Storage
//!
//! Users and sessions live behind the [`store::UserStore`] and
//! [`store::SessionStore`] traits. PostgreSQL is used when a DSN is configured;
//! otherwise the process keeps everything in memory.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
