//! In-memory [`UserRepository`] for handler tests.

use crate::users::{
    form::RegistrationForm,
    repository::{RepositoryError, UserRepository},
};
use async_trait::async_trait;
use std::{collections::HashMap, time::Duration};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub(crate) struct InMemoryUserRepository {
    users: Mutex<HashMap<String, (Uuid, RegistrationForm)>>,
    stale_existence_check: bool,
    failing: bool,
    delay: Option<Duration>,
}

impl InMemoryUserRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `email_exists` always answers `false`, so only the insert-time
    /// uniqueness check can reject a duplicate.
    pub(crate) fn with_stale_existence_check(mut self) -> Self {
        self.stale_existence_check = true;
        self
    }

    /// Every call fails with a database error.
    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Every call sleeps for `delay` before answering.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) async fn user(&self, email: &str) -> Option<RegistrationForm> {
        self.users
            .lock()
            .await
            .get(email)
            .map(|(_, form)| form.clone())
    }

    pub(crate) async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    async fn enter(&self) -> Result<(), RepositoryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        self.enter().await?;
        if self.stale_existence_check {
            return Ok(false);
        }
        Ok(self.users.lock().await.contains_key(email))
    }

    async fn create_user(&self, form: &RegistrationForm) -> Result<Uuid, RepositoryError> {
        self.enter().await?;
        let mut users = self.users.lock().await;
        if users.contains_key(&form.email) {
            return Err(RepositoryError::DuplicateEmail);
        }
        let id = Uuid::new_v4();
        users.insert(form.email.clone(), (id, form.clone()));
        Ok(id)
    }

    async fn stored_password(&self, email: &str) -> Result<Option<String>, RepositoryError> {
        self.enter().await?;
        Ok(self
            .users
            .lock()
            .await
            .get(email)
            .map(|(_, form)| form.password.clone()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.enter().await
    }
}
