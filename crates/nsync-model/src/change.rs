//! Change records
//!
//! A change is one lifecycle event of a declarative object. Consumers match
//! on it exhaustively instead of probing for which halves are present.

use serde::{Deserialize, Serialize};

/// Lifecycle change of a declarative object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Change<T> {
    /// Object is new
    #[serde(rename = "add")]
    Addition { after: T },

    /// Object exists on both sides
    #[serde(rename = "modify")]
    Modification { before: T, after: T },

    /// Object is gone
    #[serde(rename = "remove")]
    Removal { before: T },
}

/// Change kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// See [`Change::Addition`]
    Addition,
    /// See [`Change::Modification`]
    Modification,
    /// See [`Change::Removal`]
    Removal,
}

impl<T> Change<T> {
    /// Change kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Addition { .. } => ChangeKind::Addition,
            Self::Modification { .. } => ChangeKind::Modification,
            Self::Removal { .. } => ChangeKind::Removal,
        }
    }

    /// State before the change, if any
    #[inline]
    #[must_use]
    pub fn before(&self) -> Option<&T> {
        match self {
            Self::Addition { .. } => None,
            Self::Modification { before, .. } | Self::Removal { before } => Some(before),
        }
    }

    /// State after the change, if any
    #[inline]
    #[must_use]
    pub fn after(&self) -> Option<&T> {
        match self {
            Self::Addition { after } | Self::Modification { after, .. } => Some(after),
            Self::Removal { .. } => None,
        }
    }

    /// The most recent state: `after` when present, else `before`
    #[inline]
    #[must_use]
    pub fn data(&self) -> &T {
        match self {
            Self::Addition { after } | Self::Modification { after, .. } => after,
            Self::Removal { before } => before,
        }
    }

    /// Map both halves through `f`
    pub fn map<U, F>(self, mut f: F) -> Change<U>
    where
        F: FnMut(T) -> U,
    {
        match self {
            Self::Addition { after } => Change::Addition { after: f(after) },
            Self::Modification { before, after } => Change::Modification {
                before: f(before),
                after: f(after),
            },
            Self::Removal { before } => Change::Removal { before: f(before) },
        }
    }

    /// Map both halves through a fallible `f`
    ///
    /// # Errors
    /// Returns the first error produced by `f`
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<Change<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(match self {
            Self::Addition { after } => Change::Addition { after: f(after)? },
            Self::Modification { before, after } => Change::Modification {
                before: f(before)?,
                after: f(after)?,
            },
            Self::Removal { before } => Change::Removal { before: f(before)? },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn change_accessors() {
        let change = Change::Modification {
            before: 1,
            after: 2,
        };
        assert_eq!(change.kind(), ChangeKind::Modification);
        assert_eq!(change.before(), Some(&1));
        assert_eq!(change.after(), Some(&2));
        assert_eq!(*change.data(), 2);

        let removal = Change::Removal { before: 3 };
        assert_eq!(removal.after(), None);
        assert_eq!(*removal.data(), 3);
    }

    #[test]
    fn change_serde_is_tagged_by_action() {
        let change: Change<i32> =
            serde_json::from_value(json!({ "action": "modify", "before": 1, "after": 2 }))
                .unwrap();
        assert_eq!(
            change,
            Change::Modification {
                before: 1,
                after: 2
            }
        );

        let value = serde_json::to_value(Change::Addition { after: 5 }).unwrap();
        assert_eq!(value, json!({ "action": "add", "after": 5 }));
    }

    #[test]
    fn try_map_stops_at_first_error() {
        let change = Change::Modification {
            before: "1",
            after: "x",
        };
        let result: Result<Change<i32>, _> = change.try_map(str::parse::<i32>);
        assert!(result.is_err());
    }
}
