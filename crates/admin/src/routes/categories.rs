//! Category management routes.

use askama::Template;
use axum::{
    Router,
    extract::{Form, Path, Query, State, rejection::FormRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use brightline_api::{Categories, Confirmation, CrudPage, DeleteOutcome, Resource, TokenStore};
use brightline_core::{Category, CategoryDraft, CategoryId};
use serde::Deserialize;
use tracing::instrument;

use super::{ConfirmDeleteTemplate, DeleteForm, ModalQuery, ModalRequest, render};
use crate::error::{AppError, Result};
use crate::middleware::AdminToken;
use crate::state::AppState;

const ACTIVE: &str = "categories";

/// Category form body.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<CategoryForm> for CategoryDraft {
    fn from(form: CategoryForm) -> Self {
        Self {
            name: form.name,
            description: form.description,
        }
    }
}

/// Category list row.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryModal {
    pub title: &'static str,
    pub action: String,
    pub name: String,
    pub description: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub active: &'static str,
    pub rows: Vec<CategoryRow>,
    pub fetched: bool,
    pub list_error: Option<String>,
    pub action_error: Option<String>,
    pub notice: Option<String>,
    pub form: Option<CategoryModal>,
}

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}", post(update))
        .route("/categories/{id}/delete", get(confirm_delete).post(delete))
}

#[instrument(skip(state, session))]
async fn index(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Query(query): Query<ModalQuery>,
) -> Result<Response> {
    let mut page = CrudPage::<Categories>::new(state.api(), &session);
    page.list().await?;

    let mut notice = None;
    match query.request() {
        Some(ModalRequest::Create) => page.open_create(),
        Some(ModalRequest::Edit(id)) => {
            if !page.open_edit(&CategoryId::new(id)) {
                notice = Some("That category no longer exists.".to_string());
            }
        }
        None => {}
    }

    Ok(render(&view(&page, notice))?.into_response())
}

#[instrument(skip(state, session, form))]
async fn create(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    form: std::result::Result<Form<CategoryForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut page = CrudPage::<Categories>::new(state.api(), &session);
    page.create(form.into()).await?;
    Ok(render(&view(&page, None))?.into_response())
}

#[instrument(skip(state, session, form))]
async fn update(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Path(id): Path<String>,
    form: std::result::Result<Form<CategoryForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut page = CrudPage::<Categories>::new(state.api(), &session);
    page.update(CategoryId::new(id), form.into()).await?;
    Ok(render(&view(&page, None))?.into_response())
}

async fn confirm_delete(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Path(id): Path<String>,
) -> Result<Response> {
    delete_category(&state, &session, id, Confirmation::Pending).await
}

async fn delete(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Path(id): Path<String>,
    form: std::result::Result<Form<DeleteForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    delete_category(&state, &session, id, form.confirmation()).await
}

#[instrument(skip(state, session))]
async fn delete_category(
    state: &AppState,
    session: &TokenStore,
    id: String,
    confirmation: Confirmation,
) -> Result<Response> {
    let id = CategoryId::new(id);
    let mut page = CrudPage::<Categories>::new(state.api(), session);

    match page.delete(&id, confirmation).await? {
        DeleteOutcome::AwaitingConfirmation => {
            let confirm = ConfirmDeleteTemplate::new(ACTIVE, Categories::NOUN, id.as_str());
            return Ok(render(&confirm)?.into_response());
        }
        DeleteOutcome::Deleted => {}
        DeleteOutcome::Failed => page.list().await?,
    }

    Ok(render(&view(&page, None))?.into_response())
}

fn view(page: &CrudPage<'_, Categories>, notice: Option<String>) -> CategoriesTemplate {
    let modal = page.modal();
    let form = modal.show.then(|| CategoryModal {
        title: if modal.is_editing() {
            "Edit category"
        } else {
            "New category"
        },
        action: modal
            .editing
            .as_ref()
            .map_or_else(|| "/categories".to_string(), |id| format!("/categories/{id}")),
        name: modal.initial.name.clone(),
        description: modal.initial.description.clone(),
        error: modal.error.clone(),
    });

    CategoriesTemplate {
        active: ACTIVE,
        rows: page.records().iter().map(CategoryRow::from).collect(),
        fetched: page.fetched(),
        list_error: page.state().error().map(String::from),
        action_error: page.action_error().map(String::from),
        notice,
        form,
    }
}
