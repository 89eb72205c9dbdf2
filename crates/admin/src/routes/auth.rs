//! Login, logout and admin registration.

use askama::Template;
use axum::{
    Router,
    extract::{Form, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use brightline_api::TokenStore;
use brightline_core::{Credentials, RegistrationDraft};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::render;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::AdminToken;
use crate::middleware::auth::{LOGIN_PATH, session_token, store_token};
use crate::state::AppState;

/// Login form body.
///
/// Implements `Debug` manually to redact the password.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Register-admin form body.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl From<RegisterForm> for RegistrationDraft {
    fn from(form: RegisterForm) -> Self {
        Self {
            email: form.email,
            password: form.password,
            confirm_password: form.confirm_password,
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub active: &'static str,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub active: &'static str,
    pub email: String,
    pub error: Option<String>,
    pub created: Option<String>,
}

/// Routes reachable without a token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Routes that need a logged-in admin.
pub fn guarded_router() -> Router<AppState> {
    Router::new().route("/auth/register", get(register_page).post(register))
}

async fn login_page(session: Session) -> Result<Response> {
    if session_token(&session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(render(&login_view(String::new(), None))?.into_response())
}

/// Validate, log in against the API and keep only the token.
#[instrument(skip(state, session, form))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let credentials = match Credentials::from_input(&form.email, &form.password) {
        Ok(credentials) => credentials,
        Err(e) => return Ok(render(&login_view(form.email, Some(e.to_string())))?.into_response()),
    };

    let store = TokenStore::new();
    if let Err(e) = state.api().login(&store, &credentials).await {
        tracing::info!(error = %e, "Login rejected");
        let message = e.user_message("Login failed");
        return Ok(render(&login_view(form.email, Some(message)))?.into_response());
    }

    store_token(&session, &store).await?;
    set_sentry_user(credentials.email.as_str());

    Ok(Redirect::to("/").into_response())
}

async fn logout(session: Session) -> Result<Redirect> {
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to(LOGIN_PATH))
}

async fn register_page() -> Result<Response> {
    Ok(render(&register_view(String::new(), None, None))?.into_response())
}

/// Create another admin account.
#[instrument(skip(state, session, form))]
async fn register(
    State(state): State<AppState>,
    AdminToken(session): AdminToken,
    form: std::result::Result<Form<RegisterForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let draft = RegistrationDraft::from(form);

    let credentials = match draft.validate() {
        Ok(credentials) => credentials,
        Err(e) => {
            return Ok(render(&register_view(draft.email, Some(e.to_string()), None))?
                .into_response());
        }
    };

    match state.api().register_admin(&session, &credentials).await {
        Ok(admin) => {
            let created = Some(admin.email.to_string());
            Ok(render(&register_view(String::new(), None, created))?.into_response())
        }
        Err(e) if e.is_session_expired() => Err(AppError::SessionExpired),
        Err(e) => {
            let message = e.user_message("Failed to register admin");
            Ok(render(&register_view(draft.email, Some(message), None))?.into_response())
        }
    }
}

const fn login_view(email: String, error: Option<String>) -> LoginTemplate {
    LoginTemplate {
        active: "login",
        email,
        error,
    }
}

const fn register_view(
    email: String,
    error: Option<String>,
    created: Option<String>,
) -> RegisterTemplate {
    RegisterTemplate {
        active: "register",
        email,
        error,
        created,
    }
}
