#![allow(clippy::needless_for_each)]

use crate::{
    api::{
        envelope::ResponseEnvelope,
        handlers::{health, root, user_login, user_register},
    },
    users::{LoginForm, RegistrationForm},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        user_register::register,
        user_login::login
    ),
    components(schemas(ResponseEnvelope, health::Health, RegistrationForm, LoginForm)),
    tags(
        (name = "bidbang", description = "User registration and login API"),
        (name = "users", description = "Registration and login"),
        (name = "health", description = "Liveness of the service and its database")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = openapi();
        for path in ["/", "/health", "/user", "/login"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn documents_envelope_schema() {
        let doc = openapi();
        let schemas = doc.components.map(|c| c.schemas).unwrap_or_default();
        assert!(schemas.contains_key("ResponseEnvelope"));
        assert!(schemas.contains_key("RegistrationForm"));
    }
}
