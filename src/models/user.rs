use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A registered account as stored in the `users` table.
///
/// The password hash is never serialized, so a `User` can be returned from any
/// handler as-is. The avatar and the active token set are loaded separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new `User` with a fresh id and timestamps.
    /// `name` and `email` are expected to be normalized already.
    pub fn new(name: String, email: String, password_hash: String, age: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            age,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Password policy: at least 7 characters and never the word "password".
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let trimmed = password.trim();
    if trimmed.chars().count() < 7 {
        let mut err = ValidationError::new("length");
        err.message = Some("Password must be at least 7 characters".into());
        return Err(err);
    }
    if trimmed.to_lowercase().contains("password") {
        let mut err = ValidationError::new("weak_password");
        err.message = Some("Password cannot contain \"password\"".into());
        return Err(err);
    }
    Ok(())
}

/// Allowed fields of `PATCH /users/edit-account`.
///
/// Any other key fails deserialization, so a request carrying an unknown field is
/// rejected before a single change is applied.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "validate_password")]
    pub password: Option<String>,
    #[validate(range(min = 0))]
    pub age: Option<i32>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.age.is_none()
    }
}

/// Lowercases and trims an email address the way it is stored.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
