//! Public product listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use brightline_core::Product;
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::state::AppState;

/// Category filter link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChip {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/products.html")]
pub struct ProductsTemplate {
    pub active: &'static str,
    pub products: Vec<Product>,
    pub categories: Vec<CategoryChip>,
    pub filtered: bool,
    pub error: Option<String>,
}

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Display the product listing, optionally narrowed to one category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> ProductsTemplate {
    let selected = query.category.as_deref().filter(|c| !c.is_empty());

    match state.api().public_products().await {
        Ok(products) => {
            tracing::debug!(count = products.len(), "Products loaded");
            ProductsTemplate {
                active: "products",
                categories: category_chips(&products, selected),
                products: filter_by_category(products, selected),
                filtered: selected.is_some(),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            ProductsTemplate {
                active: "products",
                products: Vec::new(),
                categories: Vec::new(),
                filtered: selected.is_some(),
                error: Some(e.user_message("Failed to load products")),
            }
        }
    }
}

/// Distinct categories referenced by the products, in first-seen order.
///
/// Built from the products themselves, so the public site needs no call to the
/// authenticated category endpoint.
fn category_chips(products: &[Product], selected: Option<&str>) -> Vec<CategoryChip> {
    let mut chips: Vec<CategoryChip> = Vec::new();
    for product in products {
        let (Some(id), Some(name)) = (&product.category_id, &product.category_name) else {
            continue;
        };
        if chips.iter().any(|chip| chip.id == id.as_str()) {
            continue;
        }
        chips.push(CategoryChip {
            id: id.to_string(),
            name: name.clone(),
            selected: selected == Some(id.as_str()),
        });
    }
    chips
}

fn filter_by_category(products: Vec<Product>, selected: Option<&str>) -> Vec<Product> {
    match selected {
        Some(category) => products
            .into_iter()
            .filter(|p| p.category_id.as_ref().is_some_and(|id| id.as_str() == category))
            .collect(),
        None => products,
    }
}

/// Create the product routes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/products", get(index))
}
