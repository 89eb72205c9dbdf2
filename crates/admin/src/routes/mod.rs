//! Admin route handlers.
//!
//! Every collection page follows one pattern: `GET` renders the list, with the
//! create/edit modal addressed by query string (`?modal=new`,
//! `?modal=edit&id=…`); `POST` to the collection creates, `POST` to a member
//! updates, and deletes go through a confirmation page.

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod newsletter;
pub mod products;

use askama::Template;
use axum::{Router, http::Uri, response::Html};
use brightline_api::Confirmation;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::require_admin_token;
use crate::state::AppState;

/// Build the admin router.
///
/// Login and logout stay reachable without a token; everything else sits
/// behind the route guard.
pub fn routes() -> Router<AppState> {
    let guarded = Router::new()
        .merge(dashboard::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(newsletter::router())
        .merge(auth::guarded_router())
        .route_layer(axum::middleware::from_fn(require_admin_token));

    Router::new()
        .merge(auth::router())
        .merge(guarded)
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Render a template into an HTML response.
pub(crate) fn render(template: &impl Template) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// Which modal the list page should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalRequest {
    Create,
    Edit(String),
}

/// Query string of a collection page.
#[derive(Debug, Default, Deserialize)]
pub struct ModalQuery {
    #[serde(default)]
    modal: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl ModalQuery {
    /// The modal to open, if the query names a valid one.
    #[must_use]
    pub fn request(&self) -> Option<ModalRequest> {
        match self.modal.as_deref() {
            Some("new") => Some(ModalRequest::Create),
            Some("edit") => self
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| ModalRequest::Edit(id.to_owned())),
            _ => None,
        }
    }
}

/// Body of the delete confirmation form.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    confirm: Option<String>,
}

impl DeleteForm {
    /// Only an explicit `confirm=yes` confirms; anything else stays pending.
    #[must_use]
    pub fn confirmation(&self) -> Confirmation {
        if self.confirm.as_deref() == Some("yes") {
            Confirmation::Confirmed
        } else {
            Confirmation::Pending
        }
    }
}

/// Delete confirmation page shared by every collection.
#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub active: &'static str,
    pub noun: &'static str,
    pub id: String,
    pub action: String,
    pub cancel: &'static str,
}

impl ConfirmDeleteTemplate {
    pub fn new(active: &'static str, noun: &'static str, id: &str) -> Self {
        Self {
            active,
            noun,
            id: id.to_owned(),
            action: format!("/{active}/{id}/delete"),
            cancel: collection_path(active),
        }
    }
}

fn collection_path(active: &'static str) -> &'static str {
    match active {
        "products" => "/products",
        "categories" => "/categories",
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(modal: Option<&str>, id: Option<&str>) -> ModalQuery {
        ModalQuery {
            modal: modal.map(String::from),
            id: id.map(String::from),
        }
    }

    #[test]
    fn test_modal_query() {
        assert_eq!(query(Some("new"), None).request(), Some(ModalRequest::Create));
        assert_eq!(
            query(Some("edit"), Some("12")).request(),
            Some(ModalRequest::Edit("12".to_string()))
        );
        assert_eq!(query(Some("edit"), Some(" ")).request(), None);
        assert_eq!(query(Some("bogus"), Some("12")).request(), None);
        assert_eq!(query(None, None).request(), None);
    }

    #[test]
    fn test_delete_form_confirmation() {
        let confirmed = DeleteForm {
            confirm: Some("yes".to_string()),
        };
        assert_eq!(confirmed.confirmation(), Confirmation::Confirmed);
        assert_eq!(DeleteForm::default().confirmation(), Confirmation::Pending);
    }

    #[test]
    fn test_delete_form_other_values_stay_pending() {
        for value in ["no", "0", "", "YES", "true"] {
            let form = DeleteForm {
                confirm: Some(value.to_string()),
            };
            assert_eq!(form.confirmation(), Confirmation::Pending, "{value}");
        }
    }

    #[test]
    fn test_confirm_delete_paths() {
        let page = ConfirmDeleteTemplate::new("categories", "category", "4");
        assert_eq!(page.action, "/categories/4/delete");
        assert_eq!(page.cancel, "/categories");
        let html = page.render().unwrap_or_default();
        assert!(html.contains("/categories/4/delete"));
    }
}
