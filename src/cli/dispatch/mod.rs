use crate::cli::{
    actions::{server::Args, Action},
    commands::{database, policy, ARG_PORT},
};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or out of range.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let database = database::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn: database.dsn,
        db_username: database.username,
        db_password: database.password,
        max_connections: database.max_connections,
        request_timeout: database.request_timeout,
        policy: policy::parse(matches),
    }))
}
