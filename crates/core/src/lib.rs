//! Brightline Core - Shared types library.
//!
//! This crate provides common types used across all Brightline components:
//! - `api` - REST API client and the generic admin CRUD controller
//! - `site` - Public marketing website
//! - `admin` - Admin back-office
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for opaque IDs, prices and emails
//! - [`models`] - Records mirrored from the REST API and their form drafts
//! - [`validation`] - Client-side form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::{FormMode, ValidationError};
