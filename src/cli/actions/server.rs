use crate::{
    api::{self, ServerConfig},
    users::FormPolicy,
};
use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, time::Duration};
use tracing::info;
use url::Url;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_username: Option<String>,
    pub db_password: Option<SecretString>,
    pub max_connections: u32,
    pub request_timeout: Duration,
    pub policy: FormPolicy,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &redact_dsn(&self.dsn))
            .field("db_username", &self.db_username)
            .field("db_password_set", &self.db_password.is_some())
            .field("max_connections", &self.max_connections)
            .field("request_timeout", &self.request_timeout)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the DSN is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let dsn = build_dsn(
        &args.dsn,
        args.db_username.as_deref(),
        args.db_password.as_ref(),
    )?;

    api::new(
        dsn,
        ServerConfig {
            port: args.port,
            max_connections: args.max_connections,
            request_timeout: args.request_timeout,
            policy: args.policy,
        },
    )
    .await
}

/// Inject the separately supplied credentials into the DSN.
fn build_dsn(
    dsn: &str,
    username: Option<&str>,
    password: Option<&SecretString>,
) -> Result<String> {
    let mut dsn = Url::parse(dsn)?;

    if let Some(username) = username {
        dsn.set_username(username)
            .map_err(|()| anyhow!("Error setting username"))?;
    }

    if let Some(password) = password {
        dsn.set_password(Some(password.expose_secret()))
            .map_err(|()| anyhow!("Error setting password"))?;
    }

    Ok(dsn.to_string())
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        dsn = %redact_dsn(&args.dsn),
        max_connections = args.max_connections,
        request_timeout_secs = args.request_timeout.as_secs(),
        enforce_password_length = args.policy.enforce_password_length,
        fold_password_case = args.policy.fold_password_case,
        error_type = %args.policy.error_type,
        "Starting {} {} - {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
