//! API handlers for gatehouse.

pub mod auth;
pub mod health;
pub mod root;
