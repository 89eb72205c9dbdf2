//! Errors returned by site handlers.
//!
//! Page handlers render API failures inline; `AppError` only covers requests
//! that cannot be served at all.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::pages::NotFoundTemplate;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// No page at this path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed form submission.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");

        // The path or parser detail stays in the logs
        match self {
            Self::NotFound(_) => match (NotFoundTemplate { active: "" }).render() {
                Ok(html) => (status, Html(html)).into_response(),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to render not found page");
                    (status, "Page not found").into_response()
                }
            },
            Self::BadRequest(_) => (status, "Bad request").into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("/solar-panels".to_string());
        assert_eq!(err.to_string(), "Not found: /solar-panels");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
