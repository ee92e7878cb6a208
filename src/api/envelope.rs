//! The `{code, type, message}` body every endpoint answers with.

use crate::users::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DECODE_MESSAGE: &str = "Please check the data.";
pub const CONFLICT_MESSAGE: &str = "Email already taken.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// Mirrors the HTTP status of the response.
    code: u16,
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl ResponseEnvelope {
    #[must_use]
    pub fn new(status: StatusCode, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Successful outcomes carry an empty `type`.
    #[must_use]
    pub fn success(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, "", message)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Every way a request can fail once it reached a handler.
#[derive(Debug)]
pub enum ApiError {
    /// Body missing or not decodable into the expected form.
    Decode,
    Validation(ValidationErrors),
    /// Email already registered.
    Conflict,
    /// Unknown email or wrong password, deliberately indistinguishable.
    InvalidCredentials,
    /// Store failure; carries the fixed text shown to the client.
    Internal(&'static str),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Decode | Self::Validation(_) | Self::Conflict | Self::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Decode => DECODE_MESSAGE.to_string(),
            Self::Validation(errors) => errors.to_string(),
            Self::Conflict => CONFLICT_MESSAGE.to_string(),
            Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::Internal(message) => (*message).to_string(),
        }
    }

    #[must_use]
    pub fn into_envelope(self, error_type: &str) -> ResponseEnvelope {
        ResponseEnvelope::new(self.status(), error_type, self.message())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
