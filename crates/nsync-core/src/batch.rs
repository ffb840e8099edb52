//! Batch deploys across schemes

use crate::deploy::{SchemeDeployOutcome, SchemeDeployer};
use crate::error::SyncError;
use futures::StreamExt;
use nsync_model::{Change, ChangeKind, NotificationScheme};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use ulid::Ulid;

/// Failed change with its context
#[derive(Debug)]
pub struct FailedChange {
    /// Name of the scheme the change targeted
    pub name: String,
    /// Change kind
    pub kind: ChangeKind,
    /// Partially updated scheme, if any
    pub scheme: Option<NotificationScheme>,
    /// Cause
    pub error: SyncError,
}

/// Outcome of a batch of scheme changes
#[derive(Debug)]
pub struct DeployReport {
    /// Run identifier, also attached to log events
    pub run_id: Ulid,
    /// Fully applied schemes, updated with new identifiers
    pub applied: Vec<NotificationScheme>,
    /// Failed changes
    pub failed: Vec<FailedChange>,
    /// Changes the target could not take
    pub deferred: Vec<Change<NotificationScheme>>,
}

impl DeployReport {
    /// Empty report for a new run
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Ulid::new(),
            applied: Vec::new(),
            failed: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Whether no change failed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fold one change outcome into the report
    pub fn record(&mut self, name: String, kind: ChangeKind, outcome: SchemeDeployOutcome) {
        match outcome {
            SchemeDeployOutcome::Applied(scheme) => self.applied.push(scheme),
            SchemeDeployOutcome::Failed { scheme, error } => self.failed.push(FailedChange {
                name,
                kind,
                scheme,
                error,
            }),
            SchemeDeployOutcome::Deferred(change) => self.deferred.push(change),
        }
    }

    /// Human-readable summary
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!(
            "run {}: {} applied, {} failed, {} deferred",
            self.run_id,
            self.applied.len(),
            self.failed.len(),
            self.deferred.len()
        );
        for failure in &self.failed {
            let _ = write!(out, "\n  {} ({:?}): {}", failure.name, failure.kind, failure.error);
        }
        out
    }

    /// Serializable view for JSON output
    #[must_use]
    pub fn view(&self) -> ReportView {
        ReportView {
            run_id: self.run_id,
            success: self.is_success(),
            applied: self.applied.iter().map(|s| s.name.clone()).collect(),
            failed: self
                .failed
                .iter()
                .map(|f| FailureView {
                    name: f.name.clone(),
                    error: f.error.to_string(),
                    failed_bindings: f.error.failures().iter().map(|b| b.key.to_string()).collect(),
                })
                .collect(),
            deferred: self.deferred.iter().map(|c| c.data().name.clone()).collect(),
        }
    }
}

impl Default for DeployReport {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON shape of a [`DeployReport`]
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub run_id: Ulid,
    pub success: bool,
    pub applied: Vec<String>,
    pub failed: Vec<FailureView>,
    pub deferred: Vec<String>,
}

/// JSON shape of a [`FailedChange`]
#[derive(Debug, Clone, Serialize)]
pub struct FailureView {
    pub name: String,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_bindings: Vec<String>,
}

/// Deploy every change, concurrently up to the configured bound
///
/// Each scheme owns its identifier map, so changes are independent; one
/// failing change never stops the others.
pub async fn deploy_all(
    deployer: &SchemeDeployer,
    changes: Vec<Change<NotificationScheme>>,
) -> DeployReport {
    let report = DeployReport::new();
    let limit = deployer.config().max_in_flight.max(1);
    tracing::info!(
        run_id = %report.run_id,
        changes = changes.len(),
        "deploying notification schemes"
    );

    let outcomes: Vec<_> = futures::stream::iter(changes)
        .map(|change| async move {
            let name = change.data().name.clone();
            let kind = change.kind();
            (name, kind, deployer.deploy(change).await)
        })
        .buffered(limit)
        .collect()
        .await;

    finish(report, outcomes)
}

/// Deploy raw changes, decoding each snapshot first
///
/// Changes whose snapshots fail shape validation are reported as failed
/// without reaching the remote.
pub async fn deploy_all_values(
    deployer: &SchemeDeployer,
    changes: Vec<Change<Value>>,
) -> DeployReport {
    let report = DeployReport::new();
    let limit = deployer.config().max_in_flight.max(1);
    tracing::info!(
        run_id = %report.run_id,
        changes = changes.len(),
        "deploying raw notification scheme changes"
    );

    let outcomes: Vec<_> = futures::stream::iter(changes)
        .map(|change| async move {
            let name = change
                .data()
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(UNNAMED)
                .to_string();
            let kind = change.kind();
            (name, kind, deployer.deploy_value(change).await)
        })
        .buffered(limit)
        .collect()
        .await;

    finish(report, outcomes)
}

const UNNAMED: &str = "<unnamed>";

fn finish(
    mut report: DeployReport,
    outcomes: Vec<(String, ChangeKind, SchemeDeployOutcome)>,
) -> DeployReport {
    for (name, kind, outcome) in outcomes {
        report.record(name, kind, outcome);
    }

    tracing::info!(
        run_id = %report.run_id,
        applied = report.applied.len(),
        failed = report.failed.len(),
        deferred = report.deferred.len(),
        "notification scheme deploy finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::error::{EntryError, EntryFailure, OperationKind};
    use nsync_model::{EventTypeId, IdentityKey};

    #[test]
    fn summary_lists_failures() {
        let mut report = DeployReport::new();
        report.record(
            "Default".into(),
            ChangeKind::Addition,
            SchemeDeployOutcome::Applied(NotificationScheme::new("Default")),
        );
        report.record(
            "Ops".into(),
            ChangeKind::Modification,
            SchemeDeployOutcome::Failed {
                scheme: None,
                error: SyncError::FieldDeploy(ApiError::status(500, "boom")),
            },
        );

        let summary = report.summary();
        assert!(summary.contains("1 applied, 1 failed, 0 deferred"));
        assert!(summary.contains("Ops (Modification): field deploy failed"));
        assert!(!report.is_success());
    }

    #[test]
    fn view_lists_failed_bindings() {
        let mut report = DeployReport::new();
        report.record(
            "Ops".into(),
            ChangeKind::Modification,
            SchemeDeployOutcome::Failed {
                scheme: None,
                error: SyncError::Reconcile {
                    failures: vec![EntryFailure::new(
                        IdentityKey::new(EventTypeId(2), "Watcher", None),
                        OperationKind::Add,
                        EntryError::ReadBackMiss,
                    )],
                },
            },
        );

        let view = serde_json::to_value(report.view()).unwrap();
        assert_eq!(view["success"], false);
        assert_eq!(view["failed"][0]["failed_bindings"][0], "2-Watcher-undefined");
    }
}
