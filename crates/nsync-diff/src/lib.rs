//! nsync Diff Engine
//!
//! Computes the minimal set of primitive event operations between two
//! declarative snapshots of a notification scheme.
//!
//! # Core Concepts
//!
//! - [`diff`]: partition two projected entry lists by identity key
//! - [`diff_change`]: diff the snapshots carried by a change record
//! - [`EventDiff`]: removals, additions, unchanged keys and duplicates
//! - [`EventOperation`]: one primitive remote operation
//!
//! # Example
//!
//! ```rust
//! use nsync_diff::diff_change;
//! use nsync_model::{Change, EventTypeId, Notification, NotificationScheme, SchemeEvent};
//!
//! let scheme = |channel: &str| {
//!     NotificationScheme::new("Default")
//!         .with_event(SchemeEvent::new(EventTypeId(1)).with_notification(Notification::new(channel)))
//! };
//!
//! let diff = diff_change(&Change::Modification {
//!     before: scheme("Reporter"),
//!     after: scheme("Watcher"),
//! });
//! assert_eq!(diff.operations().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod diff;
mod operation;

// Re-exports
pub use diff::{diff, diff_change, EventDiff};
pub use operation::EventOperation;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
