use anyhow::{ensure, Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use bidbang::{
    api::{self, AppState},
    users::{
        Credentials, FormPolicy, PgUserRepository, RegistrationForm, RepositoryError,
        UserRepository,
    },
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use test_support::{postgres::PostgresContainer, runtime, schema, TestNetwork};
use tower::ServiceExt;

struct TestContext {
    _postgres: PostgresContainer,
    repository: PgUserRepository,
}

impl TestContext {
    async fn new() -> Result<Self> {
        let network = TestNetwork::new("bidbang-it");

        let postgres = PostgresContainer::start(network.name()).await?;
        postgres.wait_until_ready().await?;
        schema::apply_users_schema(&postgres).await?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&postgres.admin_dsn())
            .await
            .context("Failed to connect to Postgres")?;

        Ok(Self {
            _postgres: postgres,
            repository: PgUserRepository::new(pool),
        })
    }
}

fn form(email: &str) -> RegistrationForm {
    RegistrationForm {
        username: "ann".to_string(),
        first_name: "ann".to_string(),
        last_name: "lee".to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        location: "nyc".to_string(),
    }
}

// Everything shares one container, starting Postgres dominates the runtime.
#[tokio::test]
async fn postgres_repository_round_trip() -> Result<()> {
    if let Err(err) = runtime::ensure_container_runtime() {
        eprintln!("Skipping integration test: {err}");
        return Ok(());
    }

    let context = TestContext::new().await?;
    let repository = &context.repository;

    repository.ping().await?;

    // create, then look up
    ensure!(!repository.email_exists("ann@x.io").await?);
    let id = repository.create_user(&form("ann@x.io")).await?;
    ensure!(!id.is_nil());
    ensure!(repository.email_exists("ann@x.io").await?);

    let stored: (String, String, String) =
        sqlx::query_as("SELECT username, password, location FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(repository.pool())
            .await?;
    ensure!(stored == ("ann".to_string(), "secret1".to_string(), "nyc".to_string()));

    // duplicate email
    let duplicate = repository.create_user(&form("ann@x.io")).await;
    ensure!(
        matches!(duplicate, Err(RepositoryError::DuplicateEmail)),
        "expected DuplicateEmail, got {duplicate:?}"
    );

    // credentials
    for (email, password, expected) in [
        ("ann@x.io", "secret1", Credentials::Authenticated),
        ("ann@x.io", "SECRET1", Credentials::Invalid),
        ("nobody@x.io", "secret1", Credentials::Invalid),
    ] {
        let outcome = repository.verify_credentials(email, password).await?;
        ensure!(outcome == expected, "{email}/{password}: {outcome:?}");
    }
    ensure!(repository.stored_password("nobody@x.io").await?.is_none());

    // concurrent registrations of one email: the constraint lets exactly one through
    let mut handles = Vec::new();
    for _ in 0..8 {
        let repository = repository.clone();
        handles.push(tokio::spawn(async move {
            repository.create_user(&form("race@x.io")).await
        }));
    }

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => created += 1,
            Err(RepositoryError::DuplicateEmail) => duplicates += 1,
            Err(err) => return Err(err.into()),
        }
    }
    ensure!(created == 1, "expected one insert to win, got {created}");
    ensure!(duplicates == 7);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind("race@x.io")
        .fetch_one(repository.pool())
        .await?;
    ensure!(count == 1);

    // the router on top of the real store
    let state = AppState::new(
        Arc::new(repository.clone()),
        FormPolicy::new(),
        Duration::from_secs(5),
    );
    let router = api::router(state);

    let (status, body) = post(
        &router,
        "/user",
        &json!({
            "username": " Bob ",
            "firstName": "Bob",
            "lastName": "Ray",
            "email": " BOB@X.IO ",
            "password": "Hunter22",
            "location": "LA"
        }),
    )
    .await?;
    ensure!(status == StatusCode::CREATED, "register returned {status}: {body}");
    ensure!(repository.email_exists("bob@x.io").await?);

    let (status, body) = post(
        &router,
        "/login",
        &json!({ "email": "Bob@x.io", "password": "HUNTER22" }),
    )
    .await?;
    ensure!(status == StatusCode::OK, "login returned {status}: {body}");
    ensure!(body["message"] == "Success Login");

    Ok(())
}

async fn post(router: &axum::Router, uri: &str, body: &Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}
