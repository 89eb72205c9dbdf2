//! Admin authentication payloads.

use serde::{Deserialize, Serialize};

use crate::types::{AdminId, Email};
use crate::validation::ValidationError;

/// Minimum password length accepted by the register form.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Body for `POST /auth/login` and `POST /auth/register`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Validate login form input.
    ///
    /// # Errors
    ///
    /// Returns an error when the email is malformed or the password is empty.
    pub fn from_input(email: &str, password: &str) -> Result<Self, ValidationError> {
        let email = Email::parse(&email.trim().to_lowercase())?;
        if password.is_empty() {
            return Err(ValidationError::Required { field: "Password" });
        }
        Ok(Self {
            email,
            password: password.to_owned(),
        })
    }
}

/// Raw register-admin form input.
#[derive(Clone, Default)]
pub struct RegistrationDraft {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationDraft {
    /// Validate the registration form.
    ///
    /// # Errors
    ///
    /// Returns an error when the email is malformed, the password is shorter
    /// than [`MIN_PASSWORD_LENGTH`], or the confirmation does not match.
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        let credentials = Credentials::from_input(&self.email, &self.password)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(credentials)
    }
}

/// Response of `POST /auth/login`.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Response of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredAdmin {
    pub id: AdminId,
    pub email: Email,
}
