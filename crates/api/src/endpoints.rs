//! Endpoints outside the CRUD collections: auth and the public site.

use brightline_core::{Credentials, LoginResponse, Product, RegisteredAdmin, SubscribeRequest};
use tracing::{info, instrument};

use crate::client::{ApiClient, ApiRequest, RequestBody};
use crate::error::ApiError;
use crate::session::TokenStore;

impl ApiClient {
    /// Log in and store the returned token in `session`.
    ///
    /// Only the token is kept; the password never leaves `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] when the response carries no token,
    /// otherwise see [`ApiError`].
    #[instrument(skip(self, session, credentials), fields(email = %credentials.email))]
    pub async fn login(
        &self,
        session: &TokenStore,
        credentials: &Credentials,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post("auth/login")
            .body(RequestBody::json(credentials)?)
            .public();

        let response: LoginResponse = self
            .request(session, request)
            .await?
            .ok_or(ApiError::MissingToken)?;

        if response.token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        session.set(response.token);
        info!("Admin logged in");
        Ok(())
    }

    /// Create another admin account. Requires a logged-in admin.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    #[instrument(skip(self, session, credentials), fields(email = %credentials.email))]
    pub async fn register_admin(
        &self,
        session: &TokenStore,
        credentials: &Credentials,
    ) -> Result<RegisteredAdmin, ApiError> {
        let admin: RegisteredAdmin = self
            .post_json(session, "auth/register", credentials)
            .await?
            .ok_or(ApiError::EmptyResponse)?;
        info!(admin_id = %admin.id, "Admin registered");
        Ok(admin)
    }

    /// Subscribe an email to the newsletter.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    #[instrument(skip(self, request))]
    pub async fn subscribe(&self, request: &SubscribeRequest) -> Result<(), ApiError> {
        let request = ApiRequest::post("newsletter/subscribe")
            .body(RequestBody::json(request)?)
            .public();
        self.send(&TokenStore::detached(), request).await
    }

    /// Products shown on the public site.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    #[instrument(skip(self))]
    pub async fn public_products(&self) -> Result<Vec<Product>, ApiError> {
        let products = self
            .request(&TokenStore::detached(), ApiRequest::get("products").public())
            .await?
            .unwrap_or_default();
        Ok(products)
    }
}
