//! PostgreSQL-backed [`UserRepository`].

use crate::users::{
    form::RegistrationForm,
    repository::{RepositoryError, UserRepository},
};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let query = "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS exists";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.get("exists"))
    }

    async fn create_user(&self, form: &RegistrationForm) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let query = r"
            INSERT INTO users
                (id, username, first_name, last_name, email, password, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        match sqlx::query(query)
            .bind(id)
            .bind(&form.username)
            .bind(&form.first_name)
            .bind(&form.last_name)
            .bind(&form.email)
            .bind(&form.password)
            .bind(&form.location)
            .execute(&self.pool)
            .instrument(span)
            .await
        {
            Ok(_) => Ok(id),
            Err(err) if is_unique_violation(&err) => Err(RepositoryError::DuplicateEmail),
            Err(err) => Err(err.into()),
        }
    }

    async fn stored_password(&self, email: &str) -> Result<Option<String>, RepositoryError> {
        let query = "SELECT password FROM users WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| row.get("password")))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}

/// `true` when `err` is a unique-constraint violation (SQLSTATE `23505`).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
