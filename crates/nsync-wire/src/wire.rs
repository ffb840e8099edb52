//! Remote wire shapes
//!
//! Deserialization is non-strict: unknown fields are ignored so newer remote
//! versions keep decoding. Required fields are exactly those the reconcile
//! loop reads.

use nsync_model::{EventEntry, EventTypeId, IdentityKey, NotificationId, Parameter, SchemeId};
use serde::{Deserialize, Serialize};

/// Scheme as returned by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SchemeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub notification_scheme_events: Vec<RemoteEvent>,
}

impl RemoteScheme {
    /// Notifications of `event_type` matching `key`'s channel and parameter
    pub fn matching<'a>(
        &'a self,
        key: &'a IdentityKey,
    ) -> impl Iterator<Item = &'a RemoteNotification> + 'a {
        self.notification_scheme_events
            .iter()
            .filter(move |event| event.event.id == key.event_type())
            .flat_map(|event| event.notifications.iter())
            .filter(move |notification| notification.matches(key))
    }
}

/// Remote event with its notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub event: EventRef,
    pub notifications: Vec<RemoteNotification>,
}

/// Event type reference (`{ "id": 1 }`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    pub id: EventTypeId,
}

/// Remote notification binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNotification {
    /// Remote id; absent only in request bodies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NotificationId>,
    pub notification_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Parameter>,
}

impl RemoteNotification {
    /// Whether channel type and parameter match `key`
    #[inline]
    #[must_use]
    pub fn matches(&self, key: &IdentityKey) -> bool {
        self.notification_type == key.channel() && self.parameter.as_ref() == key.parameter()
    }
}

/// Body of the create call
///
/// The remote only accepts whole-event bodies, so one request carries every
/// added channel of a single event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotificationsRequest {
    pub notification_scheme_events: Vec<NewSchemeEvent>,
}

/// Event object inside a create body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchemeEvent {
    pub event: EventRef,
    pub notifications: Vec<NewNotification>,
}

/// Channel descriptor inside a create body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub notification_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Parameter>,
}

impl AddNotificationsRequest {
    /// Build a single-event body from entries of `event_type`
    ///
    /// Entries of other event types are ignored.
    #[must_use]
    pub fn for_event<'a>(
        event_type: EventTypeId,
        entries: impl IntoIterator<Item = &'a EventEntry>,
    ) -> Self {
        let notifications = entries
            .into_iter()
            .filter(|entry| entry.event_type() == event_type)
            .map(|entry| NewNotification {
                notification_type: entry.channel().to_string(),
                parameter: entry.parameter().cloned(),
            })
            .collect();

        Self {
            notification_scheme_events: vec![NewSchemeEvent {
                event: EventRef { id: event_type },
                notifications,
            }],
        }
    }

    /// Total number of channel descriptors in the body
    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notification_scheme_events
            .iter()
            .map(|e| e.notifications.len())
            .sum()
    }
}
