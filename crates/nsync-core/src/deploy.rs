//! Scheme-level deploy orchestration
//!
//! # Workflow
//! 1. Defer untouched when the target has no per-event endpoints
//! 2. Pre-transform the change into wire shape
//! 3. Deploy whole-scheme fields, withholding the reconciled fields
//! 4. Reconcile event bindings (modification and creation paths)
//! 5. Post-transform the updated scheme back to declarative shape

use crate::api::{FieldDeployer, NotificationApi};
use crate::config::{DeployTarget, SyncConfig};
use crate::error::SyncError;
use crate::reconcile::Reconciler;
use nsync_diff::diff_change;
use nsync_model::{Change, IdentifierMap, NotificationScheme, SchemeId};
use nsync_wire::{decode_declarative, from_wire, to_wire};
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

/// Result of deploying one scheme change
#[derive(Debug)]
pub enum SchemeDeployOutcome {
    /// Fields and every event binding applied
    Applied(NotificationScheme),

    /// Something failed; `scheme` carries whatever was applied
    Failed {
        /// Partially updated scheme, when one could be built
        scheme: Option<NotificationScheme>,
        /// Cause
        error: SyncError,
    },

    /// Target cannot take per-event changes; change returned as-is
    Deferred(Change<NotificationScheme>),
}

impl SchemeDeployOutcome {
    /// Whether the change was fully applied
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Scheme after the deploy, if any
    #[must_use]
    pub fn scheme(&self) -> Option<&NotificationScheme> {
        match self {
            Self::Applied(scheme) => Some(scheme),
            Self::Failed { scheme, .. } => scheme.as_ref(),
            Self::Deferred(change) => Some(change.data()),
        }
    }

    fn failed(scheme: Option<NotificationScheme>, error: SyncError) -> Self {
        tracing::warn!(error = %error, "notification scheme deploy failed");
        Self::Failed { scheme, error }
    }
}

/// Deploys notification scheme changes
#[derive(Clone)]
pub struct SchemeDeployer {
    fields: Arc<dyn FieldDeployer>,
    reconciler: Reconciler,
    config: SyncConfig,
}

impl std::fmt::Debug for SchemeDeployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeDeployer")
            .field("fields", &"<field deployer>")
            .field("reconciler", &self.reconciler)
            .field("config", &self.config)
            .finish()
    }
}

impl SchemeDeployer {
    /// Create deployer
    ///
    /// # Errors
    /// [`SyncError::Config`] when `config` is invalid
    pub fn new(
        api: Arc<dyn NotificationApi>,
        fields: Arc<dyn FieldDeployer>,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            reconciler: Reconciler::new(api, &config),
            fields,
            config,
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Decode a raw change and deploy it
    ///
    /// A snapshot failing shape validation fails the change without any
    /// remote call.
    pub async fn deploy_value(&self, change: Change<Value>) -> SchemeDeployOutcome {
        match change.try_map(|value| decode_declarative(&value)) {
            Ok(change) => self.deploy(change).await,
            Err(error) => SchemeDeployOutcome::failed(None, SyncError::Decode(error)),
        }
    }

    /// Deploy one scheme change
    pub async fn deploy(&self, change: Change<NotificationScheme>) -> SchemeDeployOutcome {
        if self.config.target == DeployTarget::Secondary {
            tracing::info!(
                scheme = %change.data().name,
                "target has no per-event endpoints, deferring notification scheme"
            );
            return SchemeDeployOutcome::Deferred(change);
        }

        let span = tracing::info_span!(
            "deploy_scheme",
            scheme = %change.data().name,
            action = ?change.kind()
        );
        self.deploy_primary(change).instrument(span).await
    }

    async fn deploy_primary(&self, change: Change<NotificationScheme>) -> SchemeDeployOutcome {
        let wire = change.clone().map(|scheme| to_wire(&scheme));
        let deployed_id = match self
            .fields
            .deploy_fields(&wire, &self.config.exclude_fields)
            .await
        {
            Ok(id) => id,
            Err(error) => {
                return SchemeDeployOutcome::failed(
                    change.before().cloned(),
                    SyncError::FieldDeploy(error),
                )
            }
        };

        match change {
            Change::Removal { mut before } => {
                before.notification_ids = IdentifierMap::new();
                tracing::info!("notification scheme removed");
                SchemeDeployOutcome::Applied(before)
            }
            Change::Addition { after } => {
                let identifiers = after.notification_ids.clone();
                self.reconcile(Change::Addition { after }, deployed_id, identifiers)
                    .await
            }
            Change::Modification { before, after } => {
                let mut identifiers = before.notification_ids.clone();
                identifiers.extend(after.notification_ids.iter().map(|(k, id)| (k.clone(), id)));
                self.reconcile(Change::Modification { before, after }, deployed_id, identifiers)
                    .await
            }
        }
    }

    async fn reconcile(
        &self,
        change: Change<NotificationScheme>,
        deployed_id: Option<SchemeId>,
        identifiers: IdentifierMap,
    ) -> SchemeDeployOutcome {
        let diff = diff_change(&change);
        let before_id = change.before().and_then(|scheme| scheme.id);
        let Some(mut after) = change.after().cloned() else {
            return SchemeDeployOutcome::Applied(change.data().clone());
        };

        let Some(scheme_id) = deployed_id.or(after.id).or(before_id) else {
            return SchemeDeployOutcome::failed(
                Some(after.clone()),
                SyncError::MissingSchemeId { name: after.name },
            );
        };
        after.id = Some(scheme_id);

        let outcome = self.reconciler.apply(scheme_id, &diff, identifiers).await;
        after.notification_ids = outcome.identifiers;

        let updated = match post_transform(&after) {
            Ok(updated) => updated,
            Err(error) => return SchemeDeployOutcome::failed(Some(after), error),
        };

        if outcome.failures.is_empty() {
            SchemeDeployOutcome::Applied(updated)
        } else {
            SchemeDeployOutcome::failed(
                Some(updated),
                SyncError::Reconcile {
                    failures: outcome.failures,
                },
            )
        }
    }
}

/// Render the updated scheme on the wire and read it back declaratively
fn post_transform(scheme: &NotificationScheme) -> Result<NotificationScheme, SyncError> {
    Ok(from_wire(to_wire(scheme))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use nsync_model::{EventTypeId, Notification, NotificationId, SchemeEvent};
    use nsync_wire::AddNotificationsRequest;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationApi for Recorder {
        async fn add_notifications(
            &self,
            _scheme_id: SchemeId,
            _body: &AddNotificationsRequest,
        ) -> Result<(), ApiError> {
            self.calls.lock().push("add".into());
            Ok(())
        }

        async fn get_scheme(&self, _scheme_id: SchemeId) -> Result<Value, ApiError> {
            Ok(json!({ "values": [{ "notificationSchemeEvents": [] }] }))
        }

        async fn delete_notification(
            &self,
            _scheme_id: SchemeId,
            notification_id: NotificationId,
        ) -> Result<(), ApiError> {
            self.calls.lock().push(format!("delete {notification_id}"));
            Ok(())
        }
    }

    #[async_trait]
    impl FieldDeployer for Recorder {
        async fn deploy_fields(
            &self,
            change: &Change<Value>,
            exclude: &[String],
        ) -> Result<Option<SchemeId>, ApiError> {
            assert!(exclude.iter().any(|field| field == "notificationSchemeEvents"));
            self.calls.lock().push(format!("fields {:?}", change.kind()));
            Ok(match change {
                Change::Removal { .. } => None,
                _ => Some(SchemeId(77)),
            })
        }
    }

    fn deployer(recorder: &Arc<Recorder>, config: SyncConfig) -> SchemeDeployer {
        SchemeDeployer::new(recorder.clone(), recorder.clone(), config).unwrap()
    }

    fn scheme() -> NotificationScheme {
        NotificationScheme::new("Default").with_id(SchemeId(77)).with_event(
            SchemeEvent::new(EventTypeId(1)).with_notification(Notification::new("Reporter")),
        )
    }

    #[tokio::test]
    async fn secondary_target_defers_without_calls() {
        let recorder = Arc::new(Recorder::default());
        let deployer = deployer(
            &recorder,
            SyncConfig::new().with_target(DeployTarget::Secondary),
        );

        let outcome = deployer.deploy(Change::Addition { after: scheme() }).await;

        assert!(matches!(outcome, SchemeDeployOutcome::Deferred(_)));
        assert!(recorder.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn removal_clears_identifiers_without_event_calls() {
        let recorder = Arc::new(Recorder::default());
        let key = nsync_model::IdentityKey::new(EventTypeId(1), "Reporter", None);
        let before = scheme().with_notification_ids([(key, NotificationId(3))].into_iter().collect());

        let outcome = deployer(&recorder, SyncConfig::default())
            .deploy(Change::Removal { before })
            .await;

        match outcome {
            SchemeDeployOutcome::Applied(scheme) => assert!(scheme.notification_ids.is_empty()),
            other => panic!("expected applied, got {other:?}"),
        }
        assert_eq!(*recorder.calls.lock(), vec!["fields Removal".to_string()]);
    }

    #[tokio::test]
    async fn malformed_value_fails_before_any_call() {
        let recorder = Arc::new(Recorder::default());
        let outcome = deployer(&recorder, SyncConfig::default())
            .deploy_value(Change::Addition {
                after: json!({ "name": "no events" }),
            })
            .await;

        match outcome {
            SchemeDeployOutcome::Failed { scheme, error } => {
                assert!(scheme.is_none());
                assert!(matches!(error, SyncError::Decode(_)));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(recorder.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn read_back_miss_fails_the_scheme_but_keeps_it() {
        let recorder = Arc::new(Recorder::default());
        let outcome = deployer(&recorder, SyncConfig::default())
            .deploy(Change::Addition { after: scheme() })
            .await;

        match outcome {
            SchemeDeployOutcome::Failed { scheme, error } => {
                let scheme = scheme.unwrap();
                assert_eq!(scheme.id, Some(SchemeId(77)));
                assert!(scheme.notification_ids.is_empty());
                assert_eq!(error.failures().len(), 1);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let recorder = Arc::new(Recorder::default());
        let result = SchemeDeployer::new(
            recorder.clone(),
            recorder,
            SyncConfig::new().with_max_in_flight(0),
        );
        assert!(matches!(result, Err(SyncError::Config(_))));
    }
}
