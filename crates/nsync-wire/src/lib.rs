//! nsync Wire Layer
//!
//! The trusted boundary between remote/declarative JSON payloads and the
//! typed scheme model.
//!
//! # Core Operations
//!
//! - **Validate**: decode remote, read-back and declarative payloads or fail
//! - **Transform**: convert declarative schemes to the wire shape and back
//! - **Project**: decode a declarative payload straight into event entries
//!
//! # Architecture
//!
//! ```text
//! Value → decode_* → typed shape → reconcile loop
//!   ↑                                   │
//!   └──────── to_wire / from_wire ──────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use nsync_wire::{validate, decode_remote};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "notificationSchemeEvents": [
//!         { "event": { "id": 1 }, "notifications": [{ "id": 5, "notificationType": "Reporter" }] }
//!     ]
//! });
//! assert!(validate(&payload));
//! assert_eq!(decode_remote(&payload).unwrap().notification_scheme_events.len(), 1);
//! ```

#![allow(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod transform;
pub mod validate;
pub mod wire;

// Re-exports for convenience
pub use error::{DecodeError, PayloadKind};
pub use transform::{from_wire, to_wire, without_fields, IDS_FIELD, RECONCILED_FIELDS, SCHEME_ID_FIELD};
pub use validate::{
    decode_declarative, decode_read_back, decode_remote, project_value, validate, EVENTS_FIELD,
    EVENT_TYPE_FIELD,
};
pub use wire::{
    AddNotificationsRequest, EventRef, NewNotification, NewSchemeEvent, RemoteEvent,
    RemoteNotification, RemoteScheme,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with wire payloads
    pub use crate::error::{DecodeError, PayloadKind};
    pub use crate::transform::{from_wire, to_wire, without_fields};
    pub use crate::validate::{decode_declarative, decode_read_back, decode_remote, validate};
    pub use crate::wire::{AddNotificationsRequest, RemoteScheme};
}
