pub mod extractors;
pub mod password;
pub mod resolver;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::validate_password;
use crate::models::User;

// Re-export necessary items
pub use password::CredentialStore;
pub use resolver::{CurrentUser, IdentityResolver};
pub use token::{Claims, TokenService, TokenSigner};

/// Represents the payload for a user login request.
///
/// Only shape is checked here; credential mismatches of any kind produce the
/// same opaque error.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, 1 to 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Email address for the new account. Must be unique.
    #[validate(email)]
    pub email: String,
    /// At least 7 characters, and must not contain "password".
    #[validate(custom = "validate_password")]
    pub password: String,
    /// Defaults to 0.
    #[validate(range(min = 0))]
    pub age: Option<i32>,
}

/// Response body of registration and login: the account and a fresh bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let empty_password = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            name: "Muteshi".to_string(),
            email: "muteshi@example.com".to_string(),
            password: "HiiNipass".to_string(),
            age: Some(27),
        };
        assert!(valid_register.validate().is_ok());

        let invalid_email = RegisterRequest {
            email: "muteshi.example.com".to_string(),
            ..valid_register_with("HiiNipass")
        };
        assert!(invalid_email.validate().is_err());

        assert!(valid_register_with("short").validate().is_err());
        assert!(valid_register_with("mypassword1").validate().is_err());

        let negative_age = RegisterRequest {
            age: Some(-4),
            ..valid_register_with("HiiNipass")
        };
        assert!(negative_age.validate().is_err());

        let elderly = RegisterRequest {
            age: Some(151),
            ..negative_age
        };
        assert!(elderly.validate().is_ok());
    }

    fn valid_register_with(password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Muteshi".to_string(),
            email: "muteshi@example.com".to_string(),
            password: password.to_string(),
            age: None,
        }
    }
}
