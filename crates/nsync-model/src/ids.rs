//! Remote identifiers
//!
//! All identifiers are assigned by the remote service and are numeric on the
//! wire. Each gets its own newtype so a notification id can never be passed
//! where a scheme id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote notification scheme identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeId(pub i64);

/// Remote identifier of one notification binding inside a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

/// Remote event type identifier (e.g. "issue created")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTypeId(pub i64);

macro_rules! numeric_id {
    ($ty:ident) => {
        impl $ty {
            /// Raw numeric value
            #[inline]
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $ty {
            #[inline]
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(SchemeId);
numeric_id!(NotificationId);
numeric_id!(EventTypeId);
