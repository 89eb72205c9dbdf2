//! Newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, SubscriberId};
use crate::validation::ValidationError;

/// A newsletter subscriber as returned by `GET /newsletter`.
///
/// Read/create only: the admin never updates or deletes subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SubscriberWire")]
pub struct Subscriber {
    pub id: SubscriberId,
    pub email: Email,
    pub subscribed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct SubscriberWire {
    id: SubscriberId,
    email: Email,
    #[serde(default)]
    subscribed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<SubscriberWire> for Subscriber {
    fn from(wire: SubscriberWire) -> Self {
        Self {
            id: wire.id,
            email: wire.email,
            subscribed_at: wire.subscribed_at.or(wire.created_at),
        }
    }
}

/// JSON body for `POST /newsletter/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: Email,
}

impl SubscribeRequest {
    /// Validate a raw email typed into the subscribe form.
    ///
    /// The address is trimmed and lowercased before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Email`] when the address is malformed.
    pub fn from_input(input: &str) -> Result<Self, ValidationError> {
        let email = Email::parse(&input.trim().to_lowercase())?;
        Ok(Self { email })
    }
}
