use crate::{
    api::{
        envelope::{ApiError, ResponseEnvelope},
        handlers::{decode, AppState},
    },
    users::{with_deadline, RegistrationForm, RepositoryError},
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

pub const REGISTERED_MESSAGE: &str = "Registration successful";
pub const REGISTER_FAILED_MESSAGE: &str = "Sorry, we cannot perform this operation now.";

#[utoipa::path(
    post,
    path= "/user",
    request_body(content = RegistrationForm, content_type = "application/json"),
    responses (
        (status = 201, description = "Registration successful", body = ResponseEnvelope, content_type = "application/json"),
        (status = 400, description = "Undecodable body, invalid fields or email already taken", body = ResponseEnvelope),
        (status = 500, description = "The user could not be stored", body = ResponseEnvelope),
    ),
    tag= "users"
)]
// axum handler for registration
#[instrument(skip(state, body))]
pub async fn register(
    state: Extension<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    match register_user(&state, body).await {
        Ok(envelope) => envelope,
        Err(err) => err.into_envelope(&state.policy().error_type),
    }
}

async fn register_user(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<ResponseEnvelope, ApiError> {
    let form: RegistrationForm = decode(body)?;
    let form = form.normalize(state.policy());

    debug!("form: {:?}", form);

    form.validate(state.policy())?;

    // fast path only, the unique constraint on insert is authoritative
    match with_deadline(state.deadline(), state.repository().email_exists(&form.email)).await {
        Ok(true) => {
            debug!("Email already taken");
            return Err(ApiError::Conflict);
        }
        Ok(false) => (),
        Err(e) => {
            error!("Error checking if email exists: {e}");
            return Err(ApiError::Internal(REGISTER_FAILED_MESSAGE));
        }
    }

    match with_deadline(state.deadline(), state.repository().create_user(&form)).await {
        Ok(id) => {
            info!(user.id = %id, "User registered");
            Ok(ResponseEnvelope::success(
                StatusCode::CREATED,
                REGISTERED_MESSAGE,
            ))
        }
        Err(RepositoryError::DuplicateEmail) => {
            debug!("Email taken by a concurrent registration");
            Err(ApiError::Conflict)
        }
        Err(e) => {
            error!("Error inserting user: {e}");
            Err(ApiError::Internal(REGISTER_FAILED_MESSAGE))
        }
    }
}
