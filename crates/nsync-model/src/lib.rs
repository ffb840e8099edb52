//! nsync Model
//!
//! Declarative notification schemes and their canonical event projection.
//!
//! # Core Concepts
//!
//! - [`NotificationScheme`]: the declarative resource (events -> channels)
//! - [`IdentityKey`]: structured identity of one (event, channel, parameter) binding
//! - [`IdentifierMap`]: persisted identity key -> remote notification id
//! - [`EventEntry`]: flattened, diffable binding produced by [`project`]
//! - [`Change`]: tagged addition / modification / removal record
//!
//! # Example
//!
//! ```rust
//! use nsync_model::{project, EventTypeId, Notification, NotificationScheme, SchemeEvent};
//!
//! let scheme = NotificationScheme::new("Default").with_event(
//!     SchemeEvent::new(EventTypeId(1)).with_notification(Notification::new("CurrentAssignee")),
//! );
//!
//! let entries = project(&scheme);
//! assert_eq!(entries[0].key.to_string(), "1-CurrentAssignee-undefined");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod change;
mod identifiers;
mod ids;
mod key;
mod projection;
mod scheme;

// Re-exports
pub use change::{Change, ChangeKind};
pub use identifiers::IdentifierMap;
pub use ids::{EventTypeId, NotificationId, SchemeId};
pub use key::{IdentityKey, KeyParseError, Parameter, PARAMETER_ESCAPE, UNDEFINED_PARAMETER};
pub use projection::{project, EventEntry};
pub use scheme::{Notification, NotificationScheme, SchemeEvent, SchemeRef};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn declarative_round_trip_keeps_identifiers() {
        let key = IdentityKey::new(EventTypeId(1), "Group", Some(Parameter::new("devs")));
        let scheme = NotificationScheme::new("Default")
            .with_id(SchemeId(1))
            .with_event(
                SchemeEvent::new(EventTypeId(1))
                    .with_notification(Notification::new("Group").with_parameter("devs")),
            )
            .with_notification_ids([(key.clone(), NotificationId(9))].into_iter().collect());

        let json = serde_json::to_string(&scheme).unwrap();
        let back: NotificationScheme = serde_json::from_str(&json).unwrap();

        assert_eq!(back, scheme);
        assert_eq!(project(&back)[0].id, Some(NotificationId(9)));
    }

    #[test]
    fn reloaded_scheme_keeps_id_of_literal_undefined_parameter() {
        let key = IdentityKey::new(EventTypeId(1), "Group", Some(Parameter::new("undefined")));
        let scheme = NotificationScheme::new("Default")
            .with_event(
                SchemeEvent::new(EventTypeId(1))
                    .with_notification(Notification::new("Group").with_parameter("undefined")),
            )
            .with_notification_ids([(key, NotificationId(5))].into_iter().collect());

        let json = serde_json::to_string(&scheme).unwrap();
        let back: NotificationScheme = serde_json::from_str(&json).unwrap();

        assert_eq!(project(&back)[0].id, Some(NotificationId(5)));
    }
}
