use crate::users::form::RegistrationForm;
use async_trait::async_trait;
use std::{future::Future, time::Duration};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store rejected the insert because the email is already registered.
    #[error("email already taken")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store call did not complete within {0:?}")]
    Timeout(Duration),
}

/// Result of comparing submitted credentials with the stored ones.
///
/// An unknown email and a wrong password both yield `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Authenticated,
    Invalid,
}

/// Persistent user store shared by every request.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `true` when at least one user has exactly this email.
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError>;

    /// Insert a new user under a freshly generated id.
    ///
    /// A uniqueness violation on email is reported as
    /// [`RepositoryError::DuplicateEmail`].
    async fn create_user(&self, form: &RegistrationForm) -> Result<Uuid, RepositoryError>;

    /// Stored password for `email`, `None` when no such user exists.
    async fn stored_password(&self, email: &str) -> Result<Option<String>, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Compare `password` byte for byte with the stored value.
    ///
    /// Passwords are kept as submitted (after normalization); there is no
    /// one-way hash involved on either side.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credentials, RepositoryError> {
        match self.stored_password(email).await? {
            Some(stored) if stored.as_bytes() == password.as_bytes() => {
                Ok(Credentials::Authenticated)
            }
            _ => Ok(Credentials::Invalid),
        }
    }
}

/// Run a store call under the request deadline.
///
/// # Errors
/// Returns [`RepositoryError::Timeout`] when the deadline elapses, otherwise
/// whatever the call returned.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| RepositoryError::Timeout(deadline))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::InMemoryUserRepository;

    fn form(email: &str, password: &str) -> RegistrationForm {
        RegistrationForm {
            username: "ana".to_string(),
            first_name: "a".to_string(),
            last_name: "b".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            location: "nyc".to_string(),
        }
    }

    #[tokio::test]
    async fn created_user_is_found_by_email() -> anyhow::Result<()> {
        let repo = InMemoryUserRepository::new();
        assert!(!repo.email_exists("ana@example.com").await?);

        let id = repo.create_user(&form("ana@example.com", "secret1")).await?;
        assert_ne!(id, Uuid::nil());
        assert!(repo.email_exists("ana@example.com").await?);
        Ok(())
    }

    #[tokio::test]
    async fn verify_credentials_matches_exact_password() -> anyhow::Result<()> {
        let repo = InMemoryUserRepository::new();
        repo.create_user(&form("ana@example.com", "secret1")).await?;

        assert_eq!(
            repo.verify_credentials("ana@example.com", "secret1").await?,
            Credentials::Authenticated
        );
        assert_eq!(
            repo.verify_credentials("ana@example.com", "secret2").await?,
            Credentials::Invalid
        );
        assert_eq!(
            repo.verify_credentials("ana@example.com", "SECRET1").await?,
            Credentials::Invalid
        );
        assert_eq!(
            repo.verify_credentials("nobody@example.com", "secret1").await?,
            Credentials::Invalid
        );
        Ok(())
    }

    #[tokio::test]
    async fn verify_credentials_propagates_store_errors() {
        let repo = InMemoryUserRepository::new().failing();
        let result = repo.verify_credentials("ana@example.com", "secret1").await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn with_deadline_reports_timeout() {
        let deadline = Duration::from_millis(10);
        let result: Result<(), RepositoryError> = with_deadline(deadline, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(RepositoryError::Timeout(d)) if d == deadline));
    }

    #[tokio::test]
    async fn with_deadline_passes_through_results() {
        let result = with_deadline(Duration::from_secs(1), async { Ok(7) }).await;
        assert!(matches!(result, Ok(7)));

        let result: Result<(), RepositoryError> =
            with_deadline(Duration::from_secs(1), async {
                Err(RepositoryError::DuplicateEmail)
            })
            .await;
        assert!(matches!(result, Err(RepositoryError::DuplicateEmail)));
    }
}
