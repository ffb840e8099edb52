//! Identifier map: identity key -> remote notification id
//!
//! The map is carried in the declarative model across deploys. The
//! reconciliation loop only ever inserts or removes single entries; it never
//! replaces the map wholesale.

use crate::ids::NotificationId;
use crate::key::IdentityKey;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Persisted mapping from identity key to remote notification id
///
/// Serialized as a JSON object keyed by the textual identity key, e.g.
/// `{ "1-CurrentAssignee-undefined": 10100 }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    inner: BTreeMap<IdentityKey, NotificationId>,
}

impl IdentifierMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id recorded for key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &IdentityKey) -> Option<NotificationId> {
        self.inner.get(key).copied()
    }

    /// Record id for key, returning the previous id
    #[inline]
    pub fn insert(&mut self, key: IdentityKey, id: NotificationId) -> Option<NotificationId> {
        self.inner.insert(key, id)
    }

    /// Forget key, returning its id
    #[inline]
    pub fn remove(&mut self, key: &IdentityKey) -> Option<NotificationId> {
        self.inner.remove(key)
    }

    /// Whether key is recorded
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &IdentityKey) -> bool {
        self.inner.contains_key(key)
    }

    /// Whether any key maps to `id`
    #[must_use]
    pub fn contains_id(&self, id: NotificationId) -> bool {
        self.inner.values().any(|v| *v == id)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, NotificationId)> {
        self.inner.iter().map(|(k, v)| (k, *v))
    }

    /// Iterate keys in order
    pub fn keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.inner.keys()
    }
}

impl FromIterator<(IdentityKey, NotificationId)> for IdentifierMap {
    fn from_iter<I: IntoIterator<Item = (IdentityKey, NotificationId)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Extend<(IdentityKey, NotificationId)> for IdentifierMap {
    fn extend<I: IntoIterator<Item = (IdentityKey, NotificationId)>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl Serialize for IdentifierMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.inner.iter().map(|(k, v)| (k.to_string(), v)))
    }
}

impl<'de> Deserialize<'de> for IdentifierMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, NotificationId>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| k.parse::<IdentityKey>().map(|key| (key, v)))
            .collect::<Result<_, _>>()
            .map_err(D::Error::custom)
    }
}
