//! Client-side form validation.
//!
//! Validation here is a fast path for the admin UX only. The REST API
//! independently rejects invalid payloads and remains the source of truth.
//! Messages are rendered directly inside forms, so they are written for people.

use thiserror::Error;

use crate::types::EmailError;

/// Whether a form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Update,
}

impl FormMode {
    /// Whether the form is editing an existing record.
    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Update)
    }
}

/// A form input that failed validation before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Price is missing, not a number, or not greater than zero.
    #[error("Price must be a number greater than zero")]
    InvalidPrice,

    /// Creating a product without an image.
    #[error("Please select an image or enter an image URL")]
    ImageRequired,

    /// Malformed email address.
    #[error("Please enter a valid email address")]
    Email(#[from] EmailError),

    /// Password shorter than the minimum.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Trim a required text field, rejecting blank input.
pub(crate) fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_owned())
}
