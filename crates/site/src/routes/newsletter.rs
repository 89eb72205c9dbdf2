//! Newsletter subscription from the footer form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    routing::post,
};
use brightline_core::SubscribeRequest;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Newsletter subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: String,
}

/// Result page for a subscription attempt.
#[derive(Template, WebTemplate)]
#[template(path = "pages/newsletter.html")]
pub struct NewsletterTemplate {
    pub active: &'static str,
    pub subscribed: bool,
    pub email: String,
    pub message: String,
}

impl NewsletterTemplate {
    fn subscribed(email: String) -> Self {
        Self {
            active: "",
            subscribed: true,
            email,
            message: String::new(),
        }
    }

    fn failed(email: String, message: String) -> Self {
        Self {
            active: "",
            subscribed: false,
            email,
            message,
        }
    }
}

/// Subscribe an email address.
///
/// Invalid addresses are rejected before the API is called.
///
/// # Errors
///
/// Returns 400 if the body is not a form with an `email` field.
#[instrument(skip(state, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    form: std::result::Result<Form<SubscribeForm>, FormRejection>,
) -> Result<NewsletterTemplate> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let request = match SubscribeRequest::from_input(&form.email) {
        Ok(request) => request,
        Err(e) => {
            return Ok(NewsletterTemplate::failed(
                form.email.trim().to_owned(),
                e.to_string(),
            ));
        }
    };

    let email = request.email.to_string();
    match state.api().subscribe(&request).await {
        Ok(()) => {
            tracing::info!(email = %email, "Newsletter subscription successful");
            Ok(NewsletterTemplate::subscribed(email))
        }
        Err(e) => {
            tracing::warn!(email = %email, error = %e, "Newsletter subscription failed");
            Ok(NewsletterTemplate::failed(
                email,
                e.user_message("Something went wrong. Please try again."),
            ))
        }
    }
}

/// Create the newsletter routes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/newsletter/subscribe", post(subscribe))
}
