use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::time::Duration;

pub const ARG_DSN: &str = "dsn";
pub const ARG_DB_USERNAME: &str = "db-username";
pub const ARG_DB_PASSWORD: &str = "db-password";
pub const ARG_DB_MAX_CONNECTIONS: &str = "db-max-connections";
pub const ARG_REQUEST_TIMEOUT_SECONDS: &str = "request-timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub dsn: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub max_connections: u32,
    pub request_timeout: Duration,
}

impl Options {
    /// Parse database arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing or out of range.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let dsn = match matches.get_one::<String>(ARG_DSN) {
            Some(value) if !value.trim().is_empty() => value.clone(),
            _ => anyhow::bail!("missing required argument: --{ARG_DSN}"),
        };

        // clap passes empty env vars through as values
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let max_connections = matches
            .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
            .copied()
            .unwrap_or(5);
        if max_connections == 0 {
            anyhow::bail!("--{ARG_DB_MAX_CONNECTIONS} must be greater than zero");
        }

        let timeout_seconds = matches
            .get_one::<u64>(ARG_REQUEST_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(5);
        if timeout_seconds == 0 {
            anyhow::bail!("--{ARG_REQUEST_TIMEOUT_SECONDS} must be greater than zero");
        }

        Ok(Self {
            dsn,
            username: get_non_empty(ARG_DB_USERNAME),
            password: get_non_empty(ARG_DB_PASSWORD).map(SecretString::from),
            max_connections,
            request_timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .long_help(
                    "Database connection string. Username/password can be given separately with --db-username/--db-password, they are injected into the DSN.",
                )
                .env("BIDBANG_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_DB_USERNAME)
                .long(ARG_DB_USERNAME)
                .help("Database username, overrides the one in the DSN")
                .env("BIDBANG_DB_USERNAME"),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long(ARG_DB_PASSWORD)
                .help("Database password, overrides the one in the DSN")
                .env("BIDBANG_DB_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_DB_MAX_CONNECTIONS)
                .long(ARG_DB_MAX_CONNECTIONS)
                .help("Maximum number of pooled database connections")
                .env("BIDBANG_DB_MAX_CONNECTIONS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT_SECONDS)
                .long(ARG_REQUEST_TIMEOUT_SECONDS)
                .help("Deadline in seconds for each database call made by a request")
                .env("BIDBANG_REQUEST_TIMEOUT_SECONDS")
                .default_value("5")
                .value_parser(clap::value_parser!(u64)),
        )
}
