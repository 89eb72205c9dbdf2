//! Dashboard route.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use brightline_api::{Categories, CrudPage, Products, Resource, Subscribers};
use tracing::instrument;

use super::render;
use crate::error::Result;
use crate::middleware::AdminToken;
use crate::state::AppState;

/// One summary card.
#[derive(Debug, Clone)]
pub struct CollectionCard {
    pub title: &'static str,
    pub href: &'static str,
    pub count: Option<usize>,
    pub error: Option<String>,
}

impl CollectionCard {
    fn from_page<R: Resource>(
        title: &'static str,
        href: &'static str,
        page: &CrudPage<'_, R>,
    ) -> Self {
        Self {
            title,
            href,
            count: page.fetched().then(|| page.records().len()),
            error: page.state().error().map(String::from),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub active: &'static str,
    pub cards: Vec<CollectionCard>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Counts of every collection, fetched concurrently.
#[instrument(skip(state, session))]
async fn dashboard(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
) -> Result<Html<String>> {
    let api = state.api();
    let mut products = CrudPage::<Products>::new(api, &session);
    let mut categories = CrudPage::<Categories>::new(api, &session);
    let mut subscribers = CrudPage::<Subscribers>::new(api, &session);

    let (p, c, s) = tokio::join!(products.list(), categories.list(), subscribers.list());
    p?;
    c?;
    s?;

    render(&DashboardTemplate {
        active: "dashboard",
        cards: vec![
            CollectionCard::from_page("Products", "/products", &products),
            CollectionCard::from_page("Categories", "/categories", &categories),
            CollectionCard::from_page("Subscribers", "/newsletter", &subscribers),
        ],
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cards_render_counts_and_errors() {
        let template = DashboardTemplate {
            active: "dashboard",
            cards: vec![
                CollectionCard {
                    title: "Products",
                    href: "/products",
                    count: Some(12),
                    error: None,
                },
                CollectionCard {
                    title: "Subscribers",
                    href: "/newsletter",
                    count: None,
                    error: Some("Failed to load subscribers".to_string()),
                },
            ],
        };

        let html = template.render().unwrap();
        assert!(html.contains("12"));
        assert!(html.contains("Failed to load subscribers"));
    }
}
