use crate::api::envelope::ResponseEnvelope;
use axum::{http::StatusCode, response::IntoResponse};

pub const WELCOME_MESSAGE: &str = "Welcome to the Bid Bang";

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 200, description = "Service greeting", body = ResponseEnvelope, content_type = "application/json"),
    ),
    tag= "bidbang"
)]
pub async fn root() -> impl IntoResponse {
    ResponseEnvelope::new(StatusCode::OK, "unknown", WELCOME_MESSAGE)
}
