//! Integration tests for Brightline.
//!
//! Everything runs in-process: [`FakeApi`] stands in for the remote REST API
//! on an ephemeral port and records every call it receives, while the site
//! and admin routers are served on their own ephemeral ports and driven with
//! `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p brightline-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - `ApiClient` and `CrudPage` against the fake API
//! - `admin` - admin pages through a cookie-keeping browser client
//! - `site` - public pages and the newsletter form

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Router,
    body::Body,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use brightline_api::{ApiClient, ApiClientConfig};
use serde_json::{Value, json};
use url::Url;

/// Email of the admin account the fake API accepts.
pub const ADMIN_EMAIL: &str = "ops@brightline.example";
/// Password of the admin account the fake API accepts.
pub const ADMIN_PASSWORD: &str = "correct-horse";

/// One request received by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    /// Path without leading or trailing slashes, e.g. `category/3`.
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
struct FakeData {
    calls: Vec<RecordedCall>,
    products: Vec<Value>,
    categories: Vec<Value>,
    subscribers: Vec<Value>,
    admins: Vec<String>,
    next_id: u64,
    token: String,
    failure: Option<(StatusCode, String)>,
}

impl FakeData {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<FakeData>>;

fn lock(data: &Shared) -> MutexGuard<'_, FakeData> {
    data.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for the Brightline REST API.
pub struct FakeApi {
    addr: SocketAddr,
    data: Shared,
}

impl FakeApi {
    /// Start the fake API on an ephemeral port.
    pub async fn start() -> Self {
        let data: Shared = Arc::new(Mutex::new(FakeData {
            token: "token-1".to_string(),
            admins: vec![ADMIN_EMAIL.to_string()],
            ..FakeData::default()
        }));

        let app = Router::new().fallback(handle).with_state(data.clone());
        let addr = serve(app).await;

        Self { addr, data }
    }

    /// Base URL of the fake API.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("valid fake API url")
    }

    /// An `ApiClient` pointed at this fake.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiClientConfig::new(self.url())).expect("client builds")
    }

    /// The token issued by `POST /auth/login`.
    #[must_use]
    pub fn token(&self) -> String {
        lock(&self.data).token.clone()
    }

    /// Invalidate the issued token; requests carrying it get `401`.
    pub fn expire_token(&self) {
        lock(&self.data).token = "token-rotated".to_string();
    }

    /// Answer every following request with this status and raw body.
    pub fn fail_with(&self, status: StatusCode, body: &str) {
        lock(&self.data).failure = Some((status, body.to_string()));
    }

    pub fn clear_failure(&self) {
        lock(&self.data).failure = None;
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.data).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.data).calls.clear();
    }

    /// Number of calls with this method and path.
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        lock(&self.data)
            .calls
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    /// Add a category and return its id.
    pub fn seed_category(&self, name: &str, description: Option<&str>) -> String {
        let mut data = lock(&self.data);
        let id = data.next_id();
        data.categories.push(json!({
            "id": id,
            "name": name,
            "description": description,
        }));
        id.to_string()
    }

    /// Add a product and return its id.
    pub fn seed_product(&self, name: &str, price: &str, category_id: Option<&str>) -> String {
        let mut data = lock(&self.data);
        let id = data.next_id();
        let category_name = category_id.and_then(|c| category_name(&data, c));
        data.products.push(json!({
            "id": id,
            "name": name,
            "description": format!("{name} for trade and home installs"),
            "price": price,
            "image_url": format!("https://cdn.brightline.example/{id}.jpg"),
            "category_id": category_id,
            "category_name": category_name,
        }));
        id.to_string()
    }

    /// Add a newsletter subscriber.
    pub fn seed_subscriber(&self, email: &str) {
        let mut data = lock(&self.data);
        let id = data.next_id();
        data.subscribers.push(json!({
            "id": id,
            "email": email,
            "created_at": "2024-03-05T10:00:00Z",
        }));
    }

    /// Current categories, as the API would return them.
    #[must_use]
    pub fn categories(&self) -> Vec<Value> {
        lock(&self.data).categories.clone()
    }

    /// Current products, as the API would return them.
    #[must_use]
    pub fn products(&self) -> Vec<Value> {
        lock(&self.data).products.clone()
    }

    /// Current subscribers, as the API would return them.
    #[must_use]
    pub fn subscribers(&self) -> Vec<Value> {
        lock(&self.data).subscribers.clone()
    }
}

/// Serve a router on an ephemeral local port.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Serve the public site against `api`; returns its base URL.
pub async fn spawn_site(api: &FakeApi) -> String {
    let config = brightline_site::config::SiteConfig {
        host: "127.0.0.1".parse().expect("ip"),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        api: ApiClientConfig::new(api.url()),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
        json_logs: false,
    };
    let state = brightline_site::state::AppState::new(config).expect("site state");
    let addr = serve(brightline_site::with_error_tracking(brightline_site::app(state))).await;
    format!("http://{addr}")
}

/// Serve the admin against `api`; returns its base URL.
pub async fn spawn_admin(api: &FakeApi) -> String {
    let config = brightline_admin::config::AdminConfig {
        host: "127.0.0.1".parse().expect("ip"),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        api: ApiClientConfig::new(api.url()),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
        json_logs: false,
    };
    let state = brightline_admin::state::AppState::new(config).expect("admin state");
    let addr = serve(brightline_admin::with_error_tracking(brightline_admin::app(state))).await;
    format!("http://{addr}")
}

/// A browser-like client: keeps cookies, does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("browser client builds")
}

/// Log `browser` into the admin at `admin` with the fake's credentials.
pub async fn log_in(browser: &reqwest::Client, admin: &str) -> reqwest::Response {
    browser
        .post(format!("{admin}/auth/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .expect("login request")
}

// =============================================================================
// Fake API handlers
// =============================================================================

fn respond(status: StatusCode, body: &Value) -> Response {
    (status, axum::Json(body.clone())).into_response()
}

fn message(status: StatusCode, text: &str) -> Response {
    respond(status, &json!({ "message": text }))
}

fn id_string(value: &Value) -> String {
    match &value["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn category_name(data: &FakeData, id: &str) -> Option<String> {
    data.categories
        .iter()
        .find(|c| id_string(c) == id)
        .and_then(|c| c["name"].as_str().map(String::from))
}

async fn json_body(request: Request) -> Value {
    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Multipart product fields; an uploaded file becomes a fake hosted URL.
async fn product_fields(request: Request) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let Ok(mut multipart) = Multipart::from_request(request, &()).await else {
        return fields;
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            if field.bytes().await.is_ok_and(|b| !b.is_empty()) {
                fields.push((
                    "image".to_string(),
                    format!("https://cdn.brightline.example/uploads/{file_name}"),
                ));
            }
        } else if let Ok(value) = field.text().await {
            fields.push((name, value));
        }
    }
    fields
}

fn apply_product_fields(data: &FakeData, product: &mut Value, fields: Vec<(String, String)>) {
    for (name, value) in fields {
        match name.as_str() {
            "name" | "description" | "price" | "image" | "image_url" => {
                product[name.as_str()] = Value::String(value);
            }
            "category_id" => {
                product["category_name"] = json!(category_name(data, &value));
                product["category_id"] = Value::String(value);
            }
            _ => {}
        }
    }
}

async fn handle(State(data): State<Shared>, request: Request) -> Response {
    let method = request.method().as_str().to_owned();
    let path = request.uri().path().trim_matches('/').to_owned();
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let authorized = {
        let mut guard = lock(&data);
        guard.calls.push(RecordedCall {
            method: method.clone(),
            path: path.clone(),
            authorization: authorization.clone(),
        });
        if let Some((status, body)) = guard.failure.clone() {
            return (status, Body::from(body)).into_response();
        }
        authorization.as_deref() == Some(format!("Bearer {}", guard.token).as_str())
    };

    let segments: Vec<&str> = path.split('/').collect();
    let public = matches!(
        (method.as_str(), segments.as_slice()),
        ("POST", ["auth", "login"]) | ("GET", ["products"]) | ("POST", ["newsletter", "subscribe"])
    );
    if !public && !authorized {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "login"]) => {
            let body = json_body(request).await;
            let token = lock(&data).token.clone();
            if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
                respond(StatusCode::OK, &json!({ "token": token }))
            } else {
                message(StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
        }
        ("POST", ["auth", "register"]) => {
            let body = json_body(request).await;
            let email = body["email"].as_str().unwrap_or_default().to_string();
            let mut guard = lock(&data);
            if guard.admins.contains(&email) {
                return message(StatusCode::CONFLICT, "An admin with this email already exists");
            }
            guard.admins.push(email.clone());
            let id = guard.next_id();
            respond(StatusCode::CREATED, &json!({ "id": id, "email": email }))
        }
        ("GET", ["products"]) => respond(StatusCode::OK, &Value::from(lock(&data).products.clone())),
        ("POST", ["products"]) => {
            let fields = product_fields(request).await;
            let mut guard = lock(&data);
            let id = guard.next_id();
            let mut product = json!({ "id": id });
            apply_product_fields(&guard, &mut product, fields);
            guard.products.push(product.clone());
            respond(StatusCode::CREATED, &product)
        }
        ("PUT", ["products", id]) => {
            let id = (*id).to_string();
            let fields = product_fields(request).await;
            let mut guard = lock(&data);
            let Some(index) = guard.products.iter().position(|p| id_string(p) == id) else {
                return message(StatusCode::NOT_FOUND, "Product not found");
            };
            let mut product = guard.products.remove(index);
            apply_product_fields(&guard, &mut product, fields);
            guard.products.insert(index, product.clone());
            respond(StatusCode::OK, &product)
        }
        ("DELETE", ["products", id]) => {
            let mut guard = lock(&data);
            let before = guard.products.len();
            guard.products.retain(|p| id_string(p) != *id);
            if guard.products.len() == before {
                return message(StatusCode::NOT_FOUND, "Product not found");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        ("GET", ["category"]) => respond(StatusCode::OK, &Value::from(lock(&data).categories.clone())),
        ("POST", ["category"]) => {
            let body = json_body(request).await;
            let mut guard = lock(&data);
            let id = guard.next_id();
            let category = json!({
                "id": id,
                "name": body["name"],
                "description": body.get("description").cloned().unwrap_or(Value::Null),
            });
            guard.categories.push(category.clone());
            respond(StatusCode::CREATED, &category)
        }
        ("PUT", ["category", id]) => {
            let id = (*id).to_string();
            let body = json_body(request).await;
            let mut guard = lock(&data);
            let Some(category) = guard.categories.iter_mut().find(|c| id_string(c) == id) else {
                return message(StatusCode::NOT_FOUND, "Category not found");
            };
            category["name"] = body["name"].clone();
            category["description"] = body.get("description").cloned().unwrap_or(Value::Null);
            let category = category.clone();
            respond(StatusCode::OK, &category)
        }
        ("DELETE", ["category", id]) => {
            let mut guard = lock(&data);
            if guard
                .products
                .iter()
                .any(|p| p["category_id"].as_str() == Some(*id))
            {
                return message(StatusCode::CONFLICT, "Category is in use by products");
            }
            let before = guard.categories.len();
            guard.categories.retain(|c| id_string(c) != *id);
            if guard.categories.len() == before {
                return message(StatusCode::NOT_FOUND, "Category not found");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        ("GET", ["newsletter"]) => {
            respond(StatusCode::OK, &Value::from(lock(&data).subscribers.clone()))
        }
        ("POST", ["newsletter", "subscribe"]) => {
            let body = json_body(request).await;
            let email = body["email"].as_str().unwrap_or_default().to_string();
            let mut guard = lock(&data);
            if guard.subscribers.iter().any(|s| s["email"] == email.as_str()) {
                return message(StatusCode::CONFLICT, "This email is already subscribed");
            }
            let id = guard.next_id();
            guard.subscribers.push(json!({
                "id": id,
                "email": email,
                "created_at": "2024-03-05T10:00:00Z",
            }));
            StatusCode::CREATED.into_response()
        }
        _ => message(StatusCode::NOT_FOUND, "Not found"),
    }
}
