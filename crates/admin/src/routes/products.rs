//! Product management routes.
//!
//! Product forms are multipart because they may carry an image file.

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Form, Multipart, Path, Query, State, rejection::FormRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use brightline_api::{
    ApiClient, Categories, Confirmation, CrudPage, DeleteOutcome, Products, Resource, SaveOutcome,
    TokenStore,
};
use brightline_core::{
    CategoryId, ImageInput, ImageUpload, Product, ProductDraft, ProductId,
};
use tracing::instrument;

use super::{ConfirmDeleteTemplate, DeleteForm, ModalQuery, ModalRequest, render};
use crate::error::{AppError, Result};
use crate::middleware::AdminToken;
use crate::state::AppState;

const ACTIVE: &str = "products";

/// Largest accepted product form, image included.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Product list row.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category_name.clone().unwrap_or_default(),
            image: product.image.clone(),
        }
    }
}

/// Option of the category select.
#[derive(Debug, Clone)]
pub struct CategoryChoice {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// The create/edit modal, flattened for the template.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub title: &'static str,
    pub action: String,
    pub editing: bool,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub categories: Vec<CategoryChoice>,
    pub category_error: Option<String>,
    pub error: Option<String>,
}

/// Category options for the product form, fetched on their own.
struct CategoryOptions {
    categories: Vec<(CategoryId, String)>,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub active: &'static str,
    pub rows: Vec<ProductRow>,
    pub fetched: bool,
    pub list_error: Option<String>,
    pub action_error: Option<String>,
    pub notice: Option<String>,
    pub form: Option<ProductForm>,
}

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/{id}", post(update))
        .route("/products/{id}/delete", get(confirm_delete).post(delete))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Product list, with the modal when the query asks for it.
#[instrument(skip(state, session))]
async fn index(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Query(query): Query<ModalQuery>,
) -> Result<Response> {
    let mut page = CrudPage::<Products>::new(state.api(), &session);
    page.list().await?;

    let mut notice = None;
    match query.request() {
        Some(ModalRequest::Create) => page.open_create(),
        Some(ModalRequest::Edit(id)) => {
            if !page.open_edit(&ProductId::new(id)) {
                notice = Some("That product no longer exists.".to_string());
            }
        }
        None => {}
    }

    let options = category_options(state.api(), &session, page.modal().show).await?;
    Ok(render(&view(&page, options, notice))?.into_response())
}

/// Create a product from the modal form.
#[instrument(skip(state, session, multipart))]
async fn create(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    multipart: Multipart,
) -> Result<Response> {
    let draft = read_product_form(multipart).await?;
    let mut page = CrudPage::<Products>::new(state.api(), &session);
    let outcome = page.create(draft).await?;
    saved_view(&state, &session, &page, outcome).await
}

/// Replace a product from the modal form.
#[instrument(skip(state, session, multipart))]
async fn update(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let draft = read_product_form(multipart).await?;
    let mut page = CrudPage::<Products>::new(state.api(), &session);
    let outcome = page.update(ProductId::new(id), draft).await?;
    saved_view(&state, &session, &page, outcome).await
}

/// After a save the page already holds the re-fetched list; after a rejected
/// save only the modal is shown again, with its error.
async fn saved_view(
    state: &AppState,
    session: &TokenStore,
    page: &CrudPage<'_, Products>,
    outcome: SaveOutcome,
) -> Result<Response> {
    let options = category_options(state.api(), session, outcome != SaveOutcome::Saved).await?;
    Ok(render(&view(page, options, None))?.into_response())
}

async fn confirm_delete(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Path(id): Path<String>,
) -> Result<Response> {
    delete_product(&state, &session, id, Confirmation::Pending).await
}

async fn delete(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    Path(id): Path<String>,
    form: std::result::Result<Form<DeleteForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    delete_product(&state, &session, id, form.confirmation()).await
}

#[instrument(skip(state, session))]
async fn delete_product(
    state: &AppState,
    session: &TokenStore,
    id: String,
    confirmation: Confirmation,
) -> Result<Response> {
    let id = ProductId::new(id);
    let mut page = CrudPage::<Products>::new(state.api(), session);

    match page.delete(&id, confirmation).await? {
        DeleteOutcome::AwaitingConfirmation => {
            let confirm = ConfirmDeleteTemplate::new(ACTIVE, Products::NOUN, id.as_str());
            return Ok(render(&confirm)?.into_response());
        }
        DeleteOutcome::Deleted => {}
        DeleteOutcome::Failed => page.list().await?,
    }

    let options = category_options(state.api(), session, false).await?;
    Ok(render(&view(&page, options, None))?.into_response())
}

/// Fetch categories for the form select when the modal is shown.
///
/// A failed fetch leaves the select empty; the form stays usable.
async fn category_options(
    api: &ApiClient,
    session: &TokenStore,
    modal_shown: bool,
) -> Result<CategoryOptions> {
    if !modal_shown {
        return Ok(CategoryOptions {
            categories: Vec::new(),
            error: None,
        });
    }

    let mut categories = CrudPage::<Categories>::new(api, session);
    categories.list().await?;

    Ok(CategoryOptions {
        categories: categories
            .records()
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect(),
        error: categories.state().error().map(String::from),
    })
}

fn view(
    page: &CrudPage<'_, Products>,
    options: CategoryOptions,
    notice: Option<String>,
) -> ProductsTemplate {
    let modal = page.modal();
    let form = modal.show.then(|| {
        let initial = &modal.initial;
        ProductForm {
            title: if modal.is_editing() {
                "Edit product"
            } else {
                "New product"
            },
            action: modal
                .editing
                .as_ref()
                .map_or_else(|| "/products".to_string(), |id| format!("/products/{id}")),
            editing: modal.is_editing(),
            name: initial.name.clone(),
            description: initial.description.clone(),
            price: initial.price.clone(),
            image_url: match &initial.image {
                ImageInput::Url(url) => url.clone(),
                _ => String::new(),
            },
            categories: options
                .categories
                .into_iter()
                .map(|(id, name)| CategoryChoice {
                    selected: initial.category_id.as_ref() == Some(&id),
                    id: id.to_string(),
                    name,
                })
                .collect(),
            category_error: options.error,
            error: modal.error.clone(),
        }
    });

    ProductsTemplate {
        active: ACTIVE,
        rows: page.records().iter().map(ProductRow::from).collect(),
        fetched: page.fetched(),
        list_error: page.state().error().map(String::from),
        action_error: page.action_error().map(String::from),
        notice,
        form,
    }
}

/// Read the multipart product form into a draft.
///
/// A non-empty file in `image` wins over `image_url`.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductDraft> {
    let mut draft = ProductDraft::default();
    let mut image_url = String::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            let content_type = field.content_type().map(String::from);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !bytes.is_empty() {
                upload = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "name" => draft.name = value,
            "description" => draft.description = value,
            "price" => draft.price = value,
            "category_id" => {
                let value = value.trim();
                draft.category_id = (!value.is_empty()).then(|| CategoryId::new(value));
            }
            "image_url" => image_url = value,
            _ => {}
        }
    }

    draft.image = match upload {
        Some(upload) => ImageInput::Upload(upload),
        None if !image_url.trim().is_empty() => ImageInput::Url(image_url),
        None => ImageInput::None,
    };

    Ok(draft)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brightline_core::Price;

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::from(7),
            name: "Cat6 Patch Cable".to_string(),
            image: Some("https://cdn.example/cat6.jpg".to_string()),
            description: "3m shielded patch cable".to_string(),
            price: Price::parse("12.5").unwrap(),
            category_id: Some(CategoryId::from(2)),
            category_name: Some("Networking".to_string()),
        }
    }

    #[test]
    fn test_product_row() {
        let row = ProductRow::from(&product());
        assert_eq!(row.id, "7");
        assert_eq!(row.price, "$12.50");
        assert_eq!(row.category, "Networking");
    }

    #[test]
    fn test_products_template_renders_form_error() {
        let template = ProductsTemplate {
            active: ACTIVE,
            rows: vec![ProductRow::from(&product())],
            fetched: true,
            list_error: None,
            action_error: None,
            notice: None,
            form: Some(ProductForm {
                title: "New product",
                action: "/products".to_string(),
                editing: false,
                name: String::new(),
                description: String::new(),
                price: String::new(),
                image_url: String::new(),
                categories: vec![CategoryChoice {
                    id: "2".to_string(),
                    name: "Networking".to_string(),
                    selected: true,
                }],
                category_error: None,
                error: Some("Name is required".to_string()),
            }),
        };

        let html = template.render().unwrap();
        assert!(html.contains("Cat6 Patch Cable"));
        assert!(html.contains("Name is required"));
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("<option value=\"2\" selected>"));
    }
}
