//! User registration and authentication core.

pub mod form;
pub mod postgres;
pub mod repository;

#[cfg(test)]
pub(crate) mod memory;

pub use self::form::{FormPolicy, LoginForm, RegistrationForm, ValidationErrors};
pub use self::postgres::PgUserRepository;
pub use self::repository::{with_deadline, Credentials, RepositoryError, UserRepository};
