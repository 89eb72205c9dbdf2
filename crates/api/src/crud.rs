//! The list + modal controller shared by every admin page.
//!
//! A [`CrudPage`] lives for one admin request. It owns the list state of one
//! collection and the state of its create/edit modal, and turns every API
//! failure into a message rendered by the page. The only failure handed back
//! to the caller is [`SessionExpired`], which the caller answers with a
//! redirect to the login page.

use brightline_core::FormMode;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::client::{ApiClient, ApiRequest};
use crate::error::ApiError;
use crate::resource::{EditableResource, Resource};
use crate::session::TokenStore;

/// The API rejected the session token. The token store is already cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session expired")]
pub struct SessionExpired;

/// Fetch state of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<T>),
    Error(String),
}

impl<T> ListState<T> {
    /// Loaded records, empty in every other state.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Loaded(items) => items,
            _ => &[],
        }
    }

    /// Load failure message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// State of the create/edit modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState<Id, Draft> {
    pub show: bool,
    /// Record being edited; `None` means the modal creates a new record.
    pub editing: Option<Id>,
    /// Values the form is prefilled with.
    pub initial: Draft,
    /// Form-level error shown above the fields.
    pub error: Option<String>,
}

impl<Id, Draft: Default> Default for ModalState<Id, Draft> {
    fn default() -> Self {
        Self {
            show: false,
            editing: None,
            initial: Draft::default(),
            error: None,
        }
    }
}

impl<Id, Draft: Default> ModalState<Id, Draft> {
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    #[must_use]
    pub const fn mode(&self) -> FormMode {
        if self.is_editing() {
            FormMode::Update
        } else {
            FormMode::Create
        }
    }

    /// Show an empty form.
    pub fn open_create(&mut self) {
        *self = Self {
            show: true,
            ..Self::default()
        };
    }

    /// Show the form prefilled with a record.
    pub fn open_edit(&mut self, id: Id, initial: Draft) {
        *self = Self {
            show: true,
            editing: Some(id),
            initial,
            error: None,
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }
}

/// Whether the admin confirmed a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Pending,
    Confirmed,
}

/// Result of a create or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved; the modal is closed and the list re-fetched.
    Saved,
    /// Rejected by validation; nothing was sent.
    Invalid,
    /// Rejected by the API; the modal stays open with the message.
    Failed,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing was sent; the admin has to confirm first.
    AwaitingConfirmation,
    /// Deleted and the list re-fetched.
    Deleted,
    /// Rejected by the API; see [`CrudPage::action_error`].
    Failed,
}

/// List and modal controller for one collection.
pub struct CrudPage<'a, R: Resource> {
    client: &'a ApiClient,
    session: &'a TokenStore,
    state: ListState<R::Record>,
    fetched: bool,
    modal: ModalState<R::Id, R::Draft>,
    action_error: Option<String>,
}

impl<'a, R: Resource> CrudPage<'a, R> {
    #[must_use]
    pub fn new(client: &'a ApiClient, session: &'a TokenStore) -> Self {
        Self {
            client,
            session,
            state: ListState::Idle,
            fetched: false,
            modal: ModalState::default(),
            action_error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ListState<R::Record> {
        &self.state
    }

    /// Loaded records.
    #[must_use]
    pub fn records(&self) -> &[R::Record] {
        self.state.items()
    }

    /// Whether a fetch has succeeded at least once.
    #[must_use]
    pub const fn fetched(&self) -> bool {
        self.fetched
    }

    #[must_use]
    pub const fn modal(&self) -> &ModalState<R::Id, R::Draft> {
        &self.modal
    }

    /// Message of the last failed delete.
    #[must_use]
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    /// Loaded record with the given id.
    #[must_use]
    pub fn find(&self, id: &R::Id) -> Option<&R::Record> {
        self.records().iter().find(|record| R::record_id(record) == id)
    }

    /// Fetch the collection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionExpired`] when the API rejected the token. Every other
    /// failure is stored in [`ListState::Error`].
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn list(&mut self) -> Result<(), SessionExpired> {
        self.state = ListState::Loading;
        let result = self
            .client
            .request::<Vec<R::Record>>(self.session, ApiRequest::get(R::COLLECTION))
            .await;

        match result {
            Ok(records) => {
                let records = records.unwrap_or_default();
                debug!(count = records.len(), "Collection loaded");
                self.state = ListState::Loaded(records);
                self.fetched = true;
                Ok(())
            }
            Err(e) => match load_error(&e, R::PLURAL) {
                Ok(message) => {
                    self.state = ListState::Error(message);
                    Ok(())
                }
                Err(expired) => {
                    self.state = ListState::Idle;
                    Err(expired)
                }
            },
        }
    }
}

impl<R: EditableResource> CrudPage<'_, R> {
    /// Open an empty create form.
    pub fn open_create(&mut self) {
        self.modal.open_create();
    }

    /// Open the edit form for a loaded record.
    ///
    /// Returns `false` when no loaded record has this id.
    pub fn open_edit(&mut self, id: &R::Id) -> bool {
        let Some(draft) = self.find(id).map(R::draft_from) else {
            return false;
        };
        self.modal.open_edit(id.clone(), draft);
        true
    }

    /// Close the modal, fetching the list if it has never loaded.
    ///
    /// The server-rendered admin never holds a page across requests: dismissing
    /// a modal navigates to the bare list URL, whose handler always lists. This
    /// is for callers that keep a page alive between actions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionExpired`] when the API rejected the token.
    pub async fn close_modal(&mut self) -> Result<(), SessionExpired> {
        self.modal.close();
        if !self.fetched {
            self.list().await?;
        }
        Ok(())
    }

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionExpired`] when the API rejected the token.
    pub async fn create(&mut self, draft: R::Draft) -> Result<SaveOutcome, SessionExpired> {
        self.modal.open_create();
        self.save(draft).await
    }

    /// Replace a record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionExpired`] when the API rejected the token.
    pub async fn update(
        &mut self,
        id: R::Id,
        draft: R::Draft,
    ) -> Result<SaveOutcome, SessionExpired> {
        self.modal.open_edit(id, R::Draft::default());
        self.save(draft).await
    }

    #[instrument(skip(self, draft), fields(collection = R::COLLECTION, editing = self.modal.is_editing()))]
    async fn save(&mut self, draft: R::Draft) -> Result<SaveOutcome, SessionExpired> {
        let mode = self.modal.mode();
        self.modal.initial = draft.clone();

        let body = match R::encode(&draft, mode) {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "Form rejected by validation");
                self.modal.error = Some(e.to_string());
                return Ok(SaveOutcome::Invalid);
            }
        };

        let request = match &self.modal.editing {
            Some(id) => ApiRequest::put(R::member_path(id)),
            None => ApiRequest::post(R::COLLECTION),
        }
        .body(body);

        match self.client.send(self.session, request).await {
            Ok(()) => {
                self.modal.close();
                self.list().await?;
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                self.modal.error = Some(action_error(&e, "save", R::NOUN)?);
                Ok(SaveOutcome::Failed)
            }
        }
    }

    /// Delete a record once the admin has confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionExpired`] when the API rejected the token.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn delete(
        &mut self,
        id: &R::Id,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, SessionExpired> {
        if confirmation == Confirmation::Pending {
            return Ok(DeleteOutcome::AwaitingConfirmation);
        }

        match self.client.delete(self.session, &R::member_path(id)).await {
            Ok(()) => {
                self.action_error = None;
                self.list().await?;
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                self.action_error = Some(action_error(&e, "delete", R::NOUN)?);
                Ok(DeleteOutcome::Failed)
            }
        }
    }
}

fn load_error(error: &ApiError, plural: &str) -> Result<String, SessionExpired> {
    if error.is_session_expired() {
        return Err(SessionExpired);
    }
    Ok(error.user_message(&format!("Failed to load {plural}")))
}

fn action_error(error: &ApiError, verb: &str, noun: &str) -> Result<String, SessionExpired> {
    if error.is_session_expired() {
        return Err(SessionExpired);
    }
    Ok(error.user_message(&format!("Failed to {verb} {noun}")))
}
