//! Key-indexed event diff
//!
//! Both sides are indexed by [`IdentityKey`] in an order-preserving map, so
//! results follow source order and the diff is linear in the entry count.

use indexmap::IndexMap;
use nsync_model::{project, Change, EventEntry, IdentityKey, NotificationScheme};

/// Result of diffing two projected snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDiff {
    /// Entries only present before, in before order
    pub to_remove: Vec<EventEntry>,

    /// Entries only present after, in after order
    pub to_add: Vec<EventEntry>,

    /// Keys present on both sides
    pub unchanged: Vec<IdentityKey>,

    /// Keys seen more than once within one side
    pub duplicates: Vec<IdentityKey>,
}

impl EventDiff {
    /// Whether no remote operation is needed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Number of primitive operations (removals plus additions)
    #[inline]
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.to_remove.len() + self.to_add.len()
    }
}

/// Diff two canonical entry lists by identity key
///
/// Within a side, a repeated key keeps its last entry and is recorded in
/// [`EventDiff::duplicates`].
#[must_use]
pub fn diff(before: &[EventEntry], after: &[EventEntry]) -> EventDiff {
    let mut duplicates = Vec::new();
    let before_index = index(before, &mut duplicates);
    let after_index = index(after, &mut duplicates);

    let to_remove = before_index
        .iter()
        .filter(|(key, _)| !after_index.contains_key(*key))
        .map(|(_, entry)| (*entry).clone())
        .collect();

    let (unchanged, added): (Vec<_>, Vec<_>) = after_index
        .iter()
        .partition(|(key, _)| before_index.contains_key(*key));

    let result = EventDiff {
        to_remove,
        to_add: added.into_iter().map(|(_, entry)| (*entry).clone()).collect(),
        unchanged: unchanged.into_iter().map(|(key, _)| (*key).clone()).collect(),
        duplicates,
    };

    tracing::debug!(
        removed = result.to_remove.len(),
        added = result.to_add.len(),
        unchanged = result.unchanged.len(),
        "computed event diff"
    );
    result
}

/// Diff the event bindings carried by a change record
///
/// - Addition: everything in `after` is new
/// - Modification: projections of both snapshots are compared
/// - Removal: nothing to reconcile; the scheme goes away as a whole
#[must_use]
pub fn diff_change(change: &Change<NotificationScheme>) -> EventDiff {
    match change {
        Change::Addition { after } => diff(&[], &project(after)),
        Change::Modification { before, after } => diff(&project(before), &project(after)),
        Change::Removal { .. } => EventDiff::default(),
    }
}

fn index<'a>(
    entries: &'a [EventEntry],
    duplicates: &mut Vec<IdentityKey>,
) -> IndexMap<&'a IdentityKey, &'a EventEntry> {
    let mut map = IndexMap::with_capacity(entries.len());
    for entry in entries {
        if map.insert(&entry.key, entry).is_some() {
            tracing::warn!(key = %entry.key, "duplicate event binding, keeping last");
            duplicates.push(entry.key.clone());
        }
    }
    map
}
