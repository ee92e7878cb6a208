pub mod database;
pub mod logging;
pub mod policy;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("bidbang")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("BIDBANG_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = database::with_args(command);
    let command = policy::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::time::Duration;

    const DSN: &str = "postgres://localhost:5432/bidbang";

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "bidbang");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_dsn() {
        temp_env::with_vars([("BIDBANG_DB_PASSWORD", None::<&str>)], || {
            let matches = new().get_matches_from(vec![
                "bidbang",
                "--port",
                "3000",
                "--dsn",
                DSN,
                "--db-username",
                "bidbang",
                "--db-password",
                "s3cret",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(3000));

            let options = database::Options::parse(&matches);
            assert!(options.is_ok());
            if let Ok(options) = options {
                assert_eq!(options.dsn, DSN);
                assert_eq!(options.username.as_deref(), Some("bidbang"));
                assert_eq!(
                    options.password.as_ref().map(|p| p.expose_secret().to_string()),
                    Some("s3cret".to_string())
                );
                assert_eq!(options.max_connections, 5);
                assert_eq!(options.request_timeout, Duration::from_secs(5));
            }
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("BIDBANG_PORT", Some("443")),
                ("BIDBANG_DSN", Some(DSN)),
                ("BIDBANG_DB_USERNAME", Some("")),
                ("BIDBANG_DB_MAX_CONNECTIONS", Some("12")),
                ("BIDBANG_REQUEST_TIMEOUT_SECONDS", Some("2")),
                ("BIDBANG_ENFORCE_PASSWORD_LENGTH", Some("false")),
                ("BIDBANG_FOLD_PASSWORD_CASE", Some("no")),
                ("BIDBANG_ERROR_TYPE", Some("unknown")),
                ("BIDBANG_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["bidbang"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let options = database::Options::parse(&matches);
                assert!(options.is_ok());
                if let Ok(options) = options {
                    // empty env values are ignored
                    assert_eq!(options.username, None);
                    assert_eq!(options.max_connections, 12);
                    assert_eq!(options.request_timeout, Duration::from_secs(2));
                }

                let policy = policy::parse(&matches);
                assert!(!policy.enforce_password_length);
                assert!(!policy.fold_password_case);
                assert_eq!(policy.error_type, "unknown");
            },
        );
    }

    #[test]
    fn test_policy_defaults() {
        temp_env::with_vars(
            [
                ("BIDBANG_ENFORCE_PASSWORD_LENGTH", None::<&str>),
                ("BIDBANG_FOLD_PASSWORD_CASE", None::<&str>),
                ("BIDBANG_ERROR_TYPE", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec!["bidbang", "--dsn", DSN]);
                let policy = policy::parse(&matches);
                assert_eq!(policy, crate::users::FormPolicy::new());
            },
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        temp_env::with_vars([("BIDBANG_REQUEST_TIMEOUT_SECONDS", None::<&str>)], || {
            let matches = new().get_matches_from(vec![
                "bidbang",
                "--dsn",
                DSN,
                "--request-timeout-seconds",
                "0",
            ]);
            let result = database::Options::parse(&matches);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("BIDBANG_LOG_LEVEL", Some(level)),
                    ("BIDBANG_DSN", Some(DSN)),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["bidbang"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("BIDBANG_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["bidbang".to_string(), "--dsn".to_string(), DSN.to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
