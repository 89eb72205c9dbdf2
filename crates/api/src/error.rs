//! API error type and server error normalization.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Keys searched, in order, for a human-readable message in an error body.
const MESSAGE_KEYS: &[&str] = &["message", "error", "detail"];

/// Errors returned by [`ApiClient`](crate::ApiClient).
///
/// `Display` is safe to show to an admin: server-provided messages are passed
/// through unchanged and everything else reads as a sentence.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    ///
    /// `message` is the server's own message when its body carried one, or a
    /// generic message derived from the status otherwise.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// An authenticated request was rejected with `401`. The token store has
    /// already been cleared; the caller should send the user to the login page.
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    /// The login response did not contain a token.
    #[error("The server did not return a session token")]
    MissingToken,

    /// The request never produced a response (connection refused, timeout...).
    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON shape expected.
    #[error("Unexpected response from the server: {0}")]
    Decode(#[from] serde_json::Error),

    /// A response body was required but the server sent none.
    #[error("The server returned an empty response")]
    EmptyResponse,

    /// The configured base URL and request path do not form a URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a rejected request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Whether the caller should redirect to the login page.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Message to show in the UI.
    ///
    /// Server messages and session expiry are shown as-is. Failures with no
    /// meaningful message for an admin (transport, decode...) are replaced by
    /// `fallback`, e.g. "Failed to load products".
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::SessionExpired | Self::MissingToken => self.to_string(),
            _ => fallback.to_owned(),
        }
    }
}

/// Extract the message of a failed response.
///
/// Accepts `{"message": "..."}`, `{"error": "..."}`, `{"detail": "..."}` and the
/// nested `{"error": {"message": "..."}}`. Falls back to a message built from
/// the status code when the body is not JSON or carries no usable message.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| find_message(&value))
        .unwrap_or_else(|| fallback_message(status))
}

fn find_message(value: &Value) -> Option<String> {
    MESSAGE_KEYS.iter().find_map(|key| match value.get(key)? {
        Value::String(message) => Some(message.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_owned),
        nested @ Value::Object(_) => find_message(nested),
        _ => None,
    })
}

/// Generic message for a failed status.
pub(crate) fn fallback_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {} ({reason})", status.as_u16()),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}
