use crate::{
    api::{
        envelope::{ApiError, ResponseEnvelope},
        handlers::{decode, AppState},
    },
    users::{with_deadline, Credentials, LoginForm},
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error, instrument};

pub const LOGGED_IN_MESSAGE: &str = "Success Login";
pub const LOGIN_FAILED_MESSAGE: &str = "Internal server error";

#[utoipa::path(
    post,
    path= "/login",
    request_body(content = LoginForm, content_type = "application/json"),
    responses (
        (status = 200, description = "Login successful", body = ResponseEnvelope, content_type = "application/json"),
        (status = 400, description = "Undecodable body, invalid fields or wrong credentials", body = ResponseEnvelope),
        (status = 500, description = "Credentials could not be looked up", body = ResponseEnvelope),
    ),
    tag= "users"
)]
// axum handler for login
#[instrument(skip(state, body))]
pub async fn login(
    state: Extension<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    match login_user(&state, body).await {
        Ok(envelope) => envelope,
        Err(err) => err.into_envelope(&state.policy().error_type),
    }
}

async fn login_user(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<ResponseEnvelope, ApiError> {
    let form: LoginForm = decode(body)?;
    let form = form.normalize(state.policy());

    debug!("form: {:?}", form);

    form.validate()?;

    match with_deadline(
        state.deadline(),
        state
            .repository()
            .verify_credentials(&form.email, &form.password),
    )
    .await
    {
        Ok(Credentials::Authenticated) => {
            debug!("Login successful");
            Ok(ResponseEnvelope::success(StatusCode::OK, LOGGED_IN_MESSAGE))
        }
        Ok(Credentials::Invalid) => {
            debug!("Invalid credentials");
            Err(ApiError::InvalidCredentials)
        }
        Err(e) => {
            error!("Error verifying credentials: {e}");
            Err(ApiError::Internal(LOGIN_FAILED_MESSAGE))
        }
    }
}
