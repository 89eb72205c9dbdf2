//! Newsletter subscriber list (read-only).

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use brightline_api::{CrudPage, Subscribers};
use brightline_core::Subscriber;
use tracing::instrument;

use super::render;
use crate::error::Result;
use crate::middleware::AdminToken;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct SubscriberRow {
    pub email: String,
    pub subscribed: String,
}

impl From<&Subscriber> for SubscriberRow {
    fn from(subscriber: &Subscriber) -> Self {
        Self {
            email: subscriber.email.to_string(),
            subscribed: subscriber
                .subscribed_at
                .map(|at| at.format("%b %-d, %Y").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "newsletter.html")]
pub struct NewsletterTemplate {
    pub active: &'static str,
    pub rows: Vec<SubscriberRow>,
    pub fetched: bool,
    pub list_error: Option<String>,
}

/// Build the newsletter router.
pub fn router() -> Router<AppState> {
    Router::new().route("/newsletter", get(index))
}

#[instrument(skip(state, session))]
async fn index(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
) -> Result<Html<String>> {
    let mut page = CrudPage::<Subscribers>::new(state.api(), &session);
    page.list().await?;

    render(&NewsletterTemplate {
        active: "newsletter",
        rows: page.records().iter().map(SubscriberRow::from).collect(),
        fetched: page.fetched(),
        list_error: page.state().error().map(String::from),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_row_formats_date() {
        let subscriber: Subscriber = serde_json::from_value(serde_json::json!({
            "id": 3,
            "email": "reader@example.com",
            "created_at": "2024-03-05T10:00:00Z"
        }))
        .unwrap();

        let row = SubscriberRow::from(&subscriber);
        assert_eq!(row.email, "reader@example.com");
        assert_eq!(row.subscribed, "Mar 5, 2024");
    }
}
