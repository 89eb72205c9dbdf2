//! The single request function every page goes through.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{ApiError, error_message};
use crate::session::TokenStore;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL every request path is appended to (e.g. `https://api.example.com/v1`).
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiClientConfig {
    /// Settings with the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Body of an API request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Sent as `multipart/form-data` (file uploads).
    Multipart(Form),
}

impl RequestBody {
    /// Serialize a value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json(value: &impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

/// A request relative to the API base URL.
///
/// Requests are authenticated by default; use [`ApiRequest::public`] for
/// endpoints that must not receive the token.
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
    auth: bool,
}

impl ApiRequest {
    /// Create a request with an explicit method.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            auth: true,
        }
    }

    /// `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT` request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Do not send the session token.
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.auth = false;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the session token is attached.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        self.auth
    }
}

/// Client for the Brightline REST API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ApiClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("brightline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve a request path against the base URL.
    ///
    /// Unlike `Url::join`, the last segment of the base path is kept:
    /// `https://api.example.com/v1` + `products` gives `.../v1/products`.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Send a request and return the raw response body.
    ///
    /// Authenticated requests carry the token as a bearer credential. A `401`
    /// on an authenticated request clears `session` and yields
    /// [`ApiError::SessionExpired`]. Other failures are normalized into
    /// [`ApiError::Status`] with the server's message when it sent one.
    #[instrument(
        name = "api_request",
        skip(self, session, request),
        fields(method = %request.method, path = %request.path, status = tracing::field::Empty)
    )]
    async fn execute(&self, session: &TokenStore, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&request.path)?;
        let mut builder = self.inner.client.request(request.method, url);

        if request.auth {
            if let Some(token) = session.get() {
                builder = builder.bearer_auth(token.expose_secret());
            }
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.inspect_err(|e| {
            warn!(error = %e, "API request failed to send");
        })?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        let body = response.bytes().await?.to_vec();

        if status == StatusCode::UNAUTHORIZED && request.auth {
            warn!("API rejected session token, clearing session");
            session.clear();
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), message = %message, "API request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "API request succeeded");
        Ok(body)
    }

    /// Send a request and decode its JSON response.
    ///
    /// Returns `Ok(None)` when the response body is empty.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        session: &TokenStore,
        request: ApiRequest,
    ) -> Result<Option<T>, ApiError> {
        let body = self.execute(session, request).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Send a request and ignore its response body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn send(&self, session: &TokenStore, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(session, request).await.map(drop)
    }

    /// `GET` a JSON document that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EmptyResponse`] when the body is empty, otherwise see
    /// [`ApiError`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        session: &TokenStore,
        path: &str,
    ) -> Result<T, ApiError> {
        self.request(session, ApiRequest::get(path))
            .await?
            .ok_or(ApiError::EmptyResponse)
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        session: &TokenStore,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let request = ApiRequest::post(path).body(RequestBody::json(body)?);
        self.request(session, request).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        session: &TokenStore,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let request = ApiRequest::put(path).body(RequestBody::json(body)?);
        self.request(session, request).await
    }

    /// `POST` a multipart form.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        session: &TokenStore,
        path: &str,
        form: Form,
    ) -> Result<Option<T>, ApiError> {
        let request = ApiRequest::post(path).body(RequestBody::Multipart(form));
        self.request(session, request).await
    }

    /// `PUT` a multipart form.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        session: &TokenStore,
        path: &str,
        form: Form,
    ) -> Result<Option<T>, ApiError> {
        let request = ApiRequest::put(path).body(RequestBody::Multipart(form));
        self.request(session, request).await
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn delete(&self, session: &TokenStore, path: &str) -> Result<(), ApiError> {
        self.send(session, ApiRequest::delete(path)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiClientConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://api.example.com/v1");
        assert_eq!(
            client.endpoint("products").unwrap().as_str(),
            "https://api.example.com/v1/products"
        );
        assert_eq!(
            client.endpoint("/category/4").unwrap().as_str(),
            "https://api.example.com/v1/category/4"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let client = client("http://127.0.0.1:5000/");
        assert_eq!(
            client.endpoint("/auth/login").unwrap().as_str(),
            "http://127.0.0.1:5000/auth/login"
        );
    }

    #[test]
    fn test_requests_are_authenticated_by_default() {
        let request = ApiRequest::get("products");
        assert!(request.requires_auth());
        assert_eq!(request.method(), Method::GET);
        assert!(!ApiRequest::post("newsletter/subscribe").public().requires_auth());
    }

    #[test]
    fn test_json_body() {
        let body = RequestBody::json(&serde_json::json!({"name": "Solar"})).unwrap();
        assert!(matches!(body, RequestBody::Json(v) if v["name"] == "Solar"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = client("http://127.0.0.1:9");
        let err = client
            .send(&TokenStore::new(), ApiRequest::get("products"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.user_message("Failed to load products"), "Failed to load products");
    }
}
