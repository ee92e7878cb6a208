//! Registration and login forms.
//!
//! Both forms go through the same two pure steps before touching the store:
//! [`normalize`](RegistrationForm::normalize) canonicalizes every string field
//! (trim, then lowercase) and `validate` checks every field independently,
//! collecting all failures into a single [`ValidationErrors`].

use regex::Regex;
use serde::Deserialize;
use std::{collections::BTreeMap, fmt, sync::LazyLock};
use utoipa::ToSchema;
use validator::ValidateEmail;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 20;

const REASON_BLANK: &str = "cannot be blank";
const REASON_EMAIL: &str = "must be a valid email address";

static EMAIL_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Error tag used in response envelopes unless configured otherwise.
pub const DEFAULT_ERROR_TYPE: &str = "error";

/// Validation and normalization knobs that differed between deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPolicy {
    /// Require registration passwords to be between 6 and 20 characters.
    pub enforce_password_length: bool,
    /// Value of the envelope `type` field on error responses.
    pub error_type: String,
    /// Lowercase passwords during normalization, which makes login
    /// case-insensitive on the password.
    pub fold_password_case: bool,
}

impl FormPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            enforce_password_length: true,
            error_type: DEFAULT_ERROR_TYPE.to_string(),
            fold_password_case: true,
        }
    }

    #[must_use]
    pub fn with_enforce_password_length(mut self, enforce: bool) -> Self {
        self.enforce_password_length = enforce;
        self
    }

    #[must_use]
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    #[must_use]
    pub fn with_fold_password_case(mut self, fold: bool) -> Self {
        self.fold_password_case = fold;
        self
    }
}

impl Default for FormPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of `POST /user`. Absent fields decode as empty strings.
#[derive(ToSchema, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub location: String,
}

impl RegistrationForm {
    /// Trim and lowercase every field.
    #[must_use]
    pub fn normalize(self, policy: &FormPolicy) -> Self {
        Self {
            username: canonical(&self.username),
            first_name: canonical(&self.first_name),
            last_name: canonical(&self.last_name),
            email: canonical(&self.email),
            password: normalize_password(&self.password, policy),
            location: canonical(&self.location),
        }
    }

    /// Check every field and report all failures at once.
    ///
    /// # Errors
    /// Returns the aggregated field errors when any rule fails.
    pub fn validate(&self, policy: &FormPolicy) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        required(&mut errors, "username", &self.username);
        required(&mut errors, "firstName", &self.first_name);
        required(&mut errors, "lastName", &self.last_name);
        email(&mut errors, "email", &self.email);
        if required(&mut errors, "password", &self.password)
            && policy.enforce_password_length
            && !valid_password_length(&self.password)
        {
            errors.insert(
                "password",
                format!(
                    "the length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}"
                ),
            );
        }
        required(&mut errors, "location", &self.location);

        errors.into_result()
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("location", &self.location)
            .finish()
    }
}

/// Body of `POST /login`. Absent fields decode as empty strings.
#[derive(ToSchema, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn normalize(self, policy: &FormPolicy) -> Self {
        Self {
            email: canonical(&self.email),
            password: normalize_password(&self.password, policy),
        }
    }

    /// # Errors
    /// Returns the aggregated field errors when any rule fails.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        email(&mut errors, "email", &self.email);
        required(&mut errors, "password", &self.password);

        errors.into_result()
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Field failures keyed by JSON field name.
///
/// Renders as `field: reason; field: reason.` with fields in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    fn insert(&mut self, field: &'static str, reason: impl Into<String>) {
        // first failing rule per field wins
        self.fields.entry(field).or_insert_with(|| reason.into());
    }

    fn into_result(self) -> Result<(), Self> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, reason)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {reason}")?;
        }
        if !self.fields.is_empty() {
            f.write_str(".")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Lowercase a password. Kept as its own step so the case-insensitive login it
/// implies stays visible and can be switched off through [`FormPolicy`].
#[must_use]
pub fn fold_password(password: &str) -> String {
    password.to_lowercase()
}

/// `local@domain.tld` shape, refined by the RFC 5322 local-part and DNS
/// hostname rules of [`ValidateEmail`].
#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_SHAPE.as_ref().is_some_and(|re| re.is_match(email)) && email.validate_email()
}

fn valid_password_length(password: &str) -> bool {
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password.chars().count())
}

fn canonical(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_password(password: &str, policy: &FormPolicy) -> String {
    let password = password.trim();
    if policy.fold_password_case {
        fold_password(password)
    } else {
        password.to_string()
    }
}

fn required(errors: &mut ValidationErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, REASON_BLANK);
        false
    } else {
        true
    }
}

fn email(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if required(errors, field, value) && !valid_email(value) {
        errors.insert(field, REASON_EMAIL);
    }
}
