//! Declarative notification scheme
//!
//! This is the nested shape a user edits: scheme events, each pairing an
//! event type with an ordered list of notification channels. It is not the
//! remote wire shape; see `nsync-wire` for that.

use crate::identifiers::IdentifierMap;
use crate::ids::{EventTypeId, SchemeId};
use crate::key::Parameter;
use serde::{Deserialize, Serialize};

/// Declarative notification scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationScheme {
    /// Remote id, absent until the scheme is first created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SchemeId>,

    /// Scheme name
    pub name: String,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Event -> channel bindings
    pub notification_scheme_events: Vec<SchemeEvent>,

    /// Remote notification ids accumulated across deploys
    #[serde(default, skip_serializing_if = "IdentifierMap::is_empty")]
    pub notification_ids: IdentifierMap,
}

impl NotificationScheme {
    /// Create scheme with no events
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            notification_scheme_events: Vec::new(),
            notification_ids: IdentifierMap::new(),
        }
    }

    /// With remote id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: SchemeId) -> Self {
        self.id = Some(id);
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With an additional scheme event
    #[inline]
    #[must_use]
    pub fn with_event(mut self, event: SchemeEvent) -> Self {
        self.notification_scheme_events.push(event);
        self
    }

    /// With identifier map
    #[inline]
    #[must_use]
    pub fn with_notification_ids(mut self, ids: IdentifierMap) -> Self {
        self.notification_ids = ids;
        self
    }

    /// Back-reference used by projected entries
    #[inline]
    #[must_use]
    pub fn reference(&self) -> SchemeRef {
        SchemeRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// One event type with its notification channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeEvent {
    /// Event type this binding reacts to
    pub event_type: EventTypeId,

    /// Ordered channel descriptors
    pub notifications: Vec<Notification>,
}

impl SchemeEvent {
    /// Create event with no channels
    #[inline]
    #[must_use]
    pub fn new(event_type: EventTypeId) -> Self {
        Self {
            event_type,
            notifications: Vec::new(),
        }
    }

    /// With an additional channel
    #[inline]
    #[must_use]
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }
}

/// Delivery channel descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Channel type (e.g. `Group`, `Single_Email_Address`)
    #[serde(rename = "type")]
    pub notification_type: String,

    /// Channel parameter (group name, address, role id...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Parameter>,

    /// Resolved recipient, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl Notification {
    /// Create channel without parameter
    #[inline]
    #[must_use]
    pub fn new(notification_type: impl Into<String>) -> Self {
        Self {
            notification_type: notification_type.into(),
            parameter: None,
            recipient: None,
        }
    }

    /// With parameter
    #[inline]
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<Parameter>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// With recipient
    #[inline]
    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }
}

/// Scheme back-reference carried by each projected entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemeRef {
    /// Remote id (absent before creation)
    pub id: Option<SchemeId>,
    /// Scheme name
    pub name: String,
}
