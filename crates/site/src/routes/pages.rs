//! Marketing page handlers.
//!
//! Every page extends `base.html`; `active` marks the current nav entry.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use brightline_core::Product;
use tracing::instrument;

use crate::filters;
use crate::state::AppState;

/// Products shown on the home page.
const FEATURED_PRODUCTS: usize = 3;

#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub active: &'static str,
    pub featured: Vec<Product>,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/services.html")]
pub struct ServicesTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/electrical.html")]
pub struct ElectricalTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/networking.html")]
pub struct NetworkingTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/news.html")]
pub struct NewsTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/resources.html")]
pub struct ResourcesTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/membership.html")]
pub struct MembershipTemplate {
    pub active: &'static str,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub active: &'static str,
}

/// Display the home page.
///
/// The featured strip is best-effort: if the API is down the page renders
/// without it.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    let featured = match state.api().public_products().await {
        Ok(mut products) => {
            products.truncate(FEATURED_PRODUCTS);
            products
        }
        Err(e) => {
            tracing::warn!(error = %e, "Featured products unavailable");
            Vec::new()
        }
    };

    HomeTemplate {
        active: "home",
        featured,
    }
}

pub async fn about() -> AboutTemplate {
    AboutTemplate { active: "about" }
}

pub async fn services() -> ServicesTemplate {
    ServicesTemplate { active: "services" }
}

pub async fn electrical() -> ElectricalTemplate {
    ElectricalTemplate {
        active: "electrical",
    }
}

pub async fn networking() -> NetworkingTemplate {
    NetworkingTemplate {
        active: "networking",
    }
}

pub async fn contact() -> ContactTemplate {
    ContactTemplate { active: "contact" }
}

pub async fn news() -> NewsTemplate {
    NewsTemplate { active: "news" }
}

pub async fn resources() -> ResourcesTemplate {
    ResourcesTemplate {
        active: "resources",
    }
}

pub async fn membership() -> MembershipTemplate {
    MembershipTemplate {
        active: "membership",
    }
}

/// Create the pages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/services", get(services))
        .route("/electrical", get(electrical))
        .route("/networking", get(networking))
        .route("/contact", get(contact))
        .route("/news", get(news))
        .route("/resources", get(resources))
        .route("/membership", get(membership))
}
