//! Route guard and token extractor for admin.
//!
//! The API token is the only thing the admin keeps in its session. The guard
//! turns it into a [`TokenStore`] for the handler and writes a logout back to
//! the session when the API rejected the token mid-request.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use brightline_api::{SESSION_TOKEN_KEY, TokenStore};
use secrecy::ExposeSecret;
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user};

/// Where unauthenticated admins are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Middleware that requires a session token before any guarded page runs.
///
/// Any non-empty token grants access; the API decides whether it is still
/// valid. If the handler's API calls were answered with `401`, the token
/// store is cleared and the token is dropped from the session too.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn require_admin_token(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = session_token(&session).await? else {
        tracing::debug!(path = %request.uri().path(), "No admin token, redirecting to login");
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    let store = TokenStore::with_token(token);
    request.extensions_mut().insert(store.clone());

    let response = next.run(request).await;

    if !store.is_authenticated() {
        clear_token(&session).await?;
        clear_sentry_user();
    }

    Ok(response)
}

/// Extractor giving handlers the request's [`TokenStore`].
///
/// Only available behind [`require_admin_token`]; anywhere else it redirects
/// to the login page.
pub struct AdminToken(pub TokenStore);

impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenStore>()
            .cloned()
            .map(Self)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// Token stored in the session, if any.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn session_token(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    Ok(session
        .get::<String>(SESSION_TOKEN_KEY)
        .await?
        .filter(|token| !token.is_empty()))
}

/// Move the token held by `store` into the session (login).
///
/// The session ID is cycled first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_token(
    session: &Session,
    store: &TokenStore,
) -> Result<(), tower_sessions::session::Error> {
    let Some(token) = store.get() else {
        return Ok(());
    };
    session.cycle_id().await?;
    session
        .insert(SESSION_TOKEN_KEY, token.expose_secret())
        .await
}

/// Remove the token from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(SESSION_TOKEN_KEY).await?;
    Ok(())
}
