//! Brightline REST API client.
//!
//! Every page of the website and the admin talks to the remote REST API through
//! this crate. The API itself is an external service.
//!
//! # Architecture
//!
//! - [`TokenStore`] - explicit session context holding the admin's API token
//! - [`ApiClient`] - one request function with bearer-token injection, JSON and
//!   multipart bodies, and error normalization
//! - [`Resource`] - schema of a CRUD collection (path, record, draft, encoding)
//! - [`CrudPage`] - the list + modal state machine every admin page uses
//!
//! # Example
//!
//! ```rust,ignore
//! use brightline_api::{ApiClient, ApiClientConfig, CrudPage, Categories, TokenStore};
//!
//! let client = ApiClient::new(&ApiClientConfig::new(base_url))?;
//! let session = TokenStore::with_token(token);
//!
//! let mut page = CrudPage::<Categories>::new(&client, &session);
//! page.list().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
pub mod crud;
mod endpoints;
mod error;
pub mod resource;
pub mod session;

pub use client::{ApiClient, ApiClientConfig, ApiRequest, RequestBody};
pub use crud::{
    Confirmation, CrudPage, DeleteOutcome, ListState, ModalState, SaveOutcome, SessionExpired,
};
pub use error::ApiError;
pub use resource::{Categories, EditableResource, Products, Resource, Subscribers};
pub use session::{SESSION_TOKEN_KEY, TokenStore};
