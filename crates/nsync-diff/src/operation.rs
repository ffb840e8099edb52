//! Primitive remote operations derived from an [`EventDiff`]

use crate::diff::EventDiff;
use indexmap::IndexMap;
use nsync_model::{EventEntry, EventTypeId};
use std::fmt;

/// One primitive remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOperation<'a> {
    /// Delete the remote notification bound to this entry
    Remove(&'a EventEntry),
    /// Create the binding described by this entry
    Add(&'a EventEntry),
}

impl<'a> EventOperation<'a> {
    /// Entry the operation acts on
    #[inline]
    #[must_use]
    pub fn entry(&self) -> &'a EventEntry {
        match self {
            Self::Remove(entry) | Self::Add(entry) => entry,
        }
    }

    /// Whether this is a removal
    #[inline]
    #[must_use]
    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove(_))
    }
}

impl fmt::Display for EventOperation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove(entry) => write!(f, "- {}", entry.key),
            Self::Add(entry) => write!(f, "+ {}", entry.key),
        }
    }
}

impl EventDiff {
    /// All primitive operations, removals first
    #[must_use]
    pub fn operations(&self) -> Vec<EventOperation<'_>> {
        self.to_remove
            .iter()
            .map(EventOperation::Remove)
            .chain(self.to_add.iter().map(EventOperation::Add))
            .collect()
    }

    /// Added entries grouped by event type, groups in first-seen order
    ///
    /// Each group maps to exactly one create call.
    #[must_use]
    pub fn additions_by_event(&self) -> Vec<(EventTypeId, Vec<&EventEntry>)> {
        let mut groups: IndexMap<EventTypeId, Vec<&EventEntry>> = IndexMap::new();
        for entry in &self.to_add {
            groups.entry(entry.event_type()).or_default().push(entry);
        }
        groups.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsync_model::{IdentityKey, SchemeRef};
    use pretty_assertions::assert_eq;

    fn entry(event: i64, channel: &str) -> EventEntry {
        EventEntry {
            key: IdentityKey::new(EventTypeId(event), channel, None),
            id: None,
            scheme: SchemeRef {
                id: None,
                name: "s".to_string(),
            },
        }
    }

    #[test]
    fn removals_come_before_additions() {
        let diff = EventDiff {
            to_remove: vec![entry(1, "Watcher")],
            to_add: vec![entry(2, "Reporter")],
            ..EventDiff::default()
        };
        let rendered: Vec<String> = diff.operations().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["- 1-Watcher-undefined", "+ 2-Reporter-undefined"]);
        assert!(diff.operations()[0].is_remove());
    }

    #[test]
    fn additions_group_by_event_in_first_seen_order() {
        let diff = EventDiff {
            to_add: vec![
                entry(5, "Reporter"),
                entry(2, "Watcher"),
                entry(5, "CurrentAssignee"),
            ],
            ..EventDiff::default()
        };
        let groups: Vec<(EventTypeId, Vec<String>)> = diff
            .additions_by_event()
            .into_iter()
            .map(|(event, entries)| (event, entries.iter().map(|e| e.channel().to_string()).collect()))
            .collect();
        assert_eq!(
            groups,
            vec![
                (EventTypeId(5), vec!["Reporter".to_string(), "CurrentAssignee".to_string()]),
                (EventTypeId(2), vec!["Watcher".to_string()]),
            ]
        );
    }
}
