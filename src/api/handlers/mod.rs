//! Route handlers and the state they share.

pub mod health;
pub mod root;
pub mod user_login;
pub mod user_register;


pub use self::health::health;
pub use self::root::root;
pub use self::user_login::login;
pub use self::user_register::register;

use crate::{
    api::envelope::ApiError,
    users::{FormPolicy, UserRepository},
};
use axum::{body::Bytes, extract::rejection::BytesRejection};
use serde::de::DeserializeOwned;
use serde_json::Deserializer;
use std::{fmt, sync::Arc, time::Duration};
use tracing::debug;

/// Dependencies built once at startup and handed to every handler.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<dyn UserRepository>,
    policy: Arc<FormPolicy>,
    deadline: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>, policy: FormPolicy, deadline: Duration) -> Self {
        Self {
            repository,
            policy: Arc::new(policy),
            deadline,
        }
    }

    #[must_use]
    pub fn repository(&self) -> &dyn UserRepository {
        self.repository.as_ref()
    }

    #[must_use]
    pub fn policy(&self) -> &FormPolicy {
        &self.policy
    }

    /// Upper bound for each store call made while serving a request.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("policy", &self.policy)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

/// Decode the first JSON value of a request body, anything after it is ignored.
///
/// A body axum could not buffer (over [`MAX_BODY_BYTES`](crate::api::MAX_BODY_BYTES)
/// or a broken stream) is undecodable too, every failure is reported as
/// [`ApiError::Decode`].
fn decode<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    let body = body.map_err(|rejection| {
        debug!("Failed to read request body: {rejection}");
        ApiError::Decode
    })?;

    match Deserializer::from_slice(&body).into_iter::<T>().next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => {
            debug!("Failed to decode request body: {e}");
            Err(ApiError::Decode)
        }
        None => {
            debug!("Empty request body");
            Err(ApiError::Decode)
        }
    }
}
