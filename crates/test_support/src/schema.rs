use anyhow::{Context, Result};
use sqlx::{Connection, PgConnection};

use crate::postgres::PostgresContainer;

const USERS_SCHEMA_SQL: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../db/sql/01_users.sql"
));

/// Create the `users` table in the provided Postgres instance.
///
/// # Errors
/// Returns an error if the schema cannot be applied.
pub async fn apply_users_schema(postgres: &PostgresContainer) -> Result<()> {
    let mut connection = PgConnection::connect(&postgres.admin_dsn())
        .await
        .context("Failed to connect to Postgres for schema setup")?;

    for (index, statement) in split_sql_statements(USERS_SCHEMA_SQL).iter().enumerate() {
        sqlx::query(statement)
            .execute(&mut connection)
            .await
            .with_context(|| format!("Failed to execute schema statement {}", index + 1))?;
    }

    Ok(())
}

// psql meta commands are not understood by the server, drop them.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('\\') {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') && !trimmed.starts_with("--") {
            if !current.trim().is_empty() {
                statements.push(current.trim().to_string());
            }
            current.clear();
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}
