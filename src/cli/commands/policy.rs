use crate::users::{form::DEFAULT_ERROR_TYPE, FormPolicy};
use clap::{builder::BoolishValueParser, Arg, ArgAction, ArgMatches, Command};

pub const ARG_ENFORCE_PASSWORD_LENGTH: &str = "enforce-password-length";
pub const ARG_FOLD_PASSWORD_CASE: &str = "fold-password-case";
pub const ARG_ERROR_TYPE: &str = "error-type";

/// Build the form policy from matches.
#[must_use]
pub fn parse(matches: &ArgMatches) -> FormPolicy {
    let flag = |id: &str| matches.get_one::<bool>(id).copied().unwrap_or(true);

    FormPolicy::new()
        .with_enforce_password_length(flag(ARG_ENFORCE_PASSWORD_LENGTH))
        .with_fold_password_case(flag(ARG_FOLD_PASSWORD_CASE))
        .with_error_type(
            matches
                .get_one::<String>(ARG_ERROR_TYPE)
                .map_or(DEFAULT_ERROR_TYPE, String::as_str),
        )
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENFORCE_PASSWORD_LENGTH)
                .long(ARG_ENFORCE_PASSWORD_LENGTH)
                .help("Require registration passwords to be 6 to 20 characters long")
                .env("BIDBANG_ENFORCE_PASSWORD_LENGTH")
                .default_value("true")
                .action(ArgAction::Set)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_FOLD_PASSWORD_CASE)
                .long(ARG_FOLD_PASSWORD_CASE)
                .help("Lowercase passwords before storing and comparing them")
                .long_help(
                    "Lowercase passwords before storing and comparing them.\n\nEnabled by default for compatibility with existing accounts, which makes password checks case-insensitive.",
                )
                .env("BIDBANG_FOLD_PASSWORD_CASE")
                .default_value("true")
                .action(ArgAction::Set)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_ERROR_TYPE)
                .long(ARG_ERROR_TYPE)
                .help("Value of the `type` field in error responses")
                .env("BIDBANG_ERROR_TYPE")
                .default_value(DEFAULT_ERROR_TYPE),
        )
}
