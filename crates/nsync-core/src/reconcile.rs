//! Reconciliation apply loop
//!
//! Executes an [`EventDiff`] against a remote that only exposes per-event
//! create and delete:
//!
//! - removals: one delete per binding
//! - additions: one create per event-type group, then one read-back to
//!   recover the ids the remote assigned
//!
//! There is no transaction. Each binding succeeds or fails on its own, and
//! the identifier map only changes for bindings that succeeded.

use crate::api::NotificationApi;
use crate::config::SyncConfig;
use crate::error::{EntryError, EntryFailure, OperationKind};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use nsync_diff::EventDiff;
use nsync_model::{EventEntry, EventTypeId, IdentifierMap, IdentityKey, NotificationId, SchemeId};
use nsync_wire::{decode_read_back, AddNotificationsRequest, RemoteScheme};
use std::collections::HashSet;
use std::sync::Arc;

/// Result of applying one diff
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Identifier map after every successful operation
    pub identifiers: IdentifierMap,
    /// Bindings that failed, in completion order
    pub failures: Vec<EntryFailure>,
    /// Successful deletes
    pub removed: usize,
    /// Successful creates with a recovered id
    pub added: usize,
}

impl ReconcileOutcome {
    /// Whether every binding succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Completed unit of work
enum Step {
    Removed {
        key: IdentityKey,
        result: Result<(), EntryError>,
    },
    Created {
        results: Vec<(IdentityKey, Result<NotificationId, EntryError>)>,
    },
}

/// Applies event diffs through a [`NotificationApi`]
#[derive(Clone)]
pub struct Reconciler {
    api: Arc<dyn NotificationApi>,
    max_in_flight: usize,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("api", &"<notification api>")
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}

impl Reconciler {
    /// Create reconciler
    #[inline]
    #[must_use]
    pub fn new(api: Arc<dyn NotificationApi>, config: &SyncConfig) -> Self {
        Self {
            api,
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    /// Apply `diff` to `scheme_id`, returning the updated identifier map
    ///
    /// `identifiers` is the current map; it is consulted for ids of removed
    /// bindings that did not carry one, and only receives inserts/removals
    /// for operations that succeeded. A removed binding with no id anywhere
    /// is looked up in the read-back. Waits for every operation.
    pub async fn apply(
        &self,
        scheme_id: SchemeId,
        diff: &EventDiff,
        mut identifiers: IdentifierMap,
    ) -> ReconcileOutcome {
        let mut failures = Vec::new();
        let mut steps: Vec<BoxFuture<'_, Step>> = Vec::new();

        let tracked = &identifiers;
        for entry in &diff.to_remove {
            let step = match entry.id.or_else(|| tracked.get(&entry.key)) {
                Some(id) => self.remove(scheme_id, entry, id).boxed(),
                None => self.remove_untracked(scheme_id, entry, tracked).boxed(),
            };
            steps.push(step);
        }

        for (event_type, entries) in diff.additions_by_event() {
            steps.push(self.create(scheme_id, event_type, entries, tracked).boxed());
        }

        tracing::debug!(
            scheme_id = %scheme_id,
            operations = steps.len(),
            "reconciling notification scheme events"
        );

        let completed: Vec<Step> = futures::stream::iter(steps)
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        let (mut removed, mut added) = (0, 0);
        for step in completed {
            match step {
                Step::Removed { key, result } => match result {
                    Ok(()) => {
                        identifiers.remove(&key);
                        removed += 1;
                    }
                    Err(error) => failures.push(failed(key, OperationKind::Remove, error)),
                },
                Step::Created { results } => {
                    for (key, result) in results {
                        match result {
                            Ok(id) => {
                                identifiers.insert(key, id);
                                added += 1;
                            }
                            Err(error) => failures.push(failed(key, OperationKind::Add, error)),
                        }
                    }
                }
            }
        }

        tracing::info!(
            scheme_id = %scheme_id,
            removed,
            added,
            failed = failures.len(),
            "notification scheme events reconciled"
        );

        ReconcileOutcome {
            identifiers,
            failures,
            removed,
            added,
        }
    }

    async fn remove(&self, scheme_id: SchemeId, entry: &EventEntry, id: NotificationId) -> Step {
        tracing::debug!(scheme_id = %scheme_id, key = %entry.key, notification_id = %id, "deleting notification");
        let result = self
            .api
            .delete_notification(scheme_id, id)
            .await
            .map_err(EntryError::from);
        Step::Removed {
            key: entry.key.clone(),
            result,
        }
    }

    /// Delete a binding whose id was never recorded
    ///
    /// The id is looked up in the read-back; a binding the remote no longer
    /// has counts as removed.
    async fn remove_untracked(
        &self,
        scheme_id: SchemeId,
        entry: &EventEntry,
        tracked: &IdentifierMap,
    ) -> Step {
        tracing::debug!(scheme_id = %scheme_id, key = %entry.key, "no notification id recorded, looking it up");
        let result = match self.lookup(scheme_id, &entry.key, tracked).await {
            Ok(Some(id)) => {
                tracing::debug!(scheme_id = %scheme_id, key = %entry.key, notification_id = %id, "deleting notification");
                self.api
                    .delete_notification(scheme_id, id)
                    .await
                    .map_err(EntryError::from)
            }
            Ok(None) => {
                tracing::info!(scheme_id = %scheme_id, key = %entry.key, "binding already absent on remote");
                Ok(())
            }
            Err(error) => Err(error),
        };
        Step::Removed {
            key: entry.key.clone(),
            result,
        }
    }

    async fn lookup(
        &self,
        scheme_id: SchemeId,
        key: &IdentityKey,
        tracked: &IdentifierMap,
    ) -> Result<Option<NotificationId>, EntryError> {
        let page = self.api.get_scheme(scheme_id).await?;
        let remote = decode_read_back(&page)?;
        let id = remote
            .matching(key)
            .filter_map(|notification| notification.id)
            .find(|id| !tracked.contains_id(*id));
        Ok(id)
    }

    async fn create(
        &self,
        scheme_id: SchemeId,
        event_type: EventTypeId,
        entries: Vec<&EventEntry>,
        tracked: &IdentifierMap,
    ) -> Step {
        let body = AddNotificationsRequest::for_event(event_type, entries.iter().copied());
        tracing::debug!(
            scheme_id = %scheme_id,
            event_type = %event_type,
            notifications = body.notification_count(),
            "creating notifications"
        );

        let remote = match self.create_and_read_back(scheme_id, &body).await {
            Ok(remote) => remote,
            Err(error) => {
                let results = entries
                    .iter()
                    .map(|entry| (entry.key.clone(), Err(error.clone())))
                    .collect();
                return Step::Created { results };
            }
        };

        let mut claimed = HashSet::new();
        let results = entries
            .iter()
            .map(|entry| {
                let result = locate(&remote, &entry.key, tracked, &claimed)
                    .map(|id| {
                        claimed.insert(id);
                        id
                    })
                    .ok_or(EntryError::ReadBackMiss);
                (entry.key.clone(), result)
            })
            .collect();
        Step::Created { results }
    }

    async fn create_and_read_back(
        &self,
        scheme_id: SchemeId,
        body: &AddNotificationsRequest,
    ) -> Result<RemoteScheme, EntryError> {
        self.api.add_notifications(scheme_id, body).await?;
        let page = self.api.get_scheme(scheme_id).await?;
        Ok(decode_read_back(&page)?)
    }
}

/// Find the remote id of a freshly created binding
///
/// Ids already tracked or claimed by a sibling entry are only used when no
/// other descriptor matches.
fn locate(
    remote: &RemoteScheme,
    key: &IdentityKey,
    tracked: &IdentifierMap,
    claimed: &HashSet<NotificationId>,
) -> Option<NotificationId> {
    let candidates: Vec<NotificationId> = remote
        .matching(key)
        .filter_map(|notification| notification.id)
        .filter(|id| !claimed.contains(id))
        .collect();

    candidates
        .iter()
        .copied()
        .find(|id| !tracked.contains_id(*id))
        .or_else(|| candidates.first().copied())
}

fn failed(key: IdentityKey, operation: OperationKind, error: EntryError) -> EntryFailure {
    tracing::warn!(key = %key, operation = %operation, error = %error, "event binding failed");
    EntryFailure::new(key, operation, error)
}
