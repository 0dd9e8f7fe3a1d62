use crate::api::{self, AuthConfig};
use anyhow::Result;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub session_ttl_seconds: u64,
    pub session_cookie_secure: bool,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

impl Args {
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new()
            .with_session_ttl_seconds(self.session_ttl_seconds)
            .with_session_cookie_secure(self.session_cookie_secure)
            .with_hash_memory_kib(self.hash_memory_kib)
            .with_hash_iterations(self.hash_iterations)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be prepared or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        port = args.port,
        persistent = args.dsn.is_some(),
        session_ttl_seconds = args.session_ttl_seconds,
        session_cookie_secure = args.session_cookie_secure,
        hash_memory_kib = args.hash_memory_kib,
        hash_iterations = args.hash_iterations,
        "Starting server"
    );

    let auth_config = args.auth_config();
    api::new(args.port, args.dsn, auth_config).await
}
