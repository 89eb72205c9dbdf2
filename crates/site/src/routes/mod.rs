//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /about                  - About
//! GET  /services               - Services overview
//! GET  /electrical             - Electrical services
//! GET  /networking             - Networking services
//! GET  /contact                - Contact details
//! GET  /news                   - News
//! GET  /resources              - Resources
//! GET  /membership             - Membership plans
//! GET  /products               - Product listing (?category=<id>)
//! POST /newsletter/subscribe   - Footer newsletter form
//! ```

pub mod newsletter;
pub mod pages;
pub mod products;

use axum::{Router, http::Uri};

use crate::error::AppError;
use crate::state::AppState;

/// Create all page routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(pages::router())
        .merge(products::router())
        .merge(newsletter::router())
        .fallback(not_found)
}

/// Fallback for unknown paths.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}
