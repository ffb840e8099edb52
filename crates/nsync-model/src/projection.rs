//! Canonical event projection
//!
//! Flattens a declarative scheme into one [`EventEntry`] per
//! (scheme event, notification channel) pair. Entries are the diffable unit:
//! the diff engine compares them by [`IdentityKey`] only.

use crate::ids::{EventTypeId, NotificationId};
use crate::key::{IdentityKey, Parameter};
use crate::scheme::{NotificationScheme, SchemeRef};

/// Flattened, diffable binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    /// Identity of the binding
    pub key: IdentityKey,

    /// Remote id recorded for `key` at projection time
    pub id: Option<NotificationId>,

    /// Owning scheme
    pub scheme: SchemeRef,
}

impl EventEntry {
    /// Event type of the binding
    #[inline]
    #[must_use]
    pub fn event_type(&self) -> EventTypeId {
        self.key.event_type()
    }

    /// Channel type of the binding
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &str {
        self.key.channel()
    }

    /// Channel parameter of the binding
    #[inline]
    #[must_use]
    pub fn parameter(&self) -> Option<&Parameter> {
        self.key.parameter()
    }
}

/// Project a scheme into canonical entries
///
/// Order is source order: scheme events outer, notifications inner. The only
/// state consulted besides the events themselves is the scheme's own
/// identifier map.
#[must_use]
pub fn project(scheme: &NotificationScheme) -> Vec<EventEntry> {
    let reference = scheme.reference();

    scheme
        .notification_scheme_events
        .iter()
        .flat_map(|event| {
            event.notifications.iter().map(move |notification| {
                IdentityKey::new(
                    event.event_type,
                    notification.notification_type.clone(),
                    notification.parameter.clone(),
                )
            })
        })
        .map(|key| EventEntry {
            id: scheme.notification_ids.get(&key),
            key,
            scheme: reference.clone(),
        })
        .collect()
}
