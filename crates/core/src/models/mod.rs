//! Records mirrored from the REST API and the drafts the admin forms submit.
//!
//! The client never holds authoritative state: records are deserialized from
//! API responses, displayed, and discarded with the page that fetched them.

pub mod auth;
pub mod category;
pub mod product;
pub mod subscriber;

pub use auth::{Credentials, LoginResponse, RegisteredAdmin, RegistrationDraft};
pub use category::{Category, CategoryDraft, CategoryPayload};
pub use product::{ImageInput, ImageUpload, Product, ProductDraft, ProductPayload};
pub use subscriber::{SubscribeRequest, Subscriber};
