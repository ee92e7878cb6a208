//! # Bid Bang
//!
//! `bidbang` is the user account service of the Bid Bang auction site. It
//! exposes two JSON endpoints:
//!
//! - `POST /user` registers a new account.
//! - `POST /login` checks an email and password pair.
//!
//! Every response, success or failure, is the same three field envelope:
//!
//! ```json
//! { "code": 400, "type": "error", "message": "email: must be a valid email address." }
//! ```
//!
//! ## Normalization
//!
//! Submitted strings are trimmed and lowercased before validation and before
//! they reach the store, so `" Ann@X.io "` and `"ann@x.io"` are the same
//! account. Passwords are lowercased too unless `--fold-password-case=false`
//! is given; existing accounts were stored folded.
//!
//! ## Storage
//!
//! Accounts live in the `users` table (`db/sql/01_users.sql`). The unique
//! constraint on `email` is what settles concurrent registrations; the
//! existence check done beforehand only saves a failed insert.

pub mod api;
pub mod cli;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
