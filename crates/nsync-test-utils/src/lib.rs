//! Testing utilities for the nsync workspace
//!
//! Shared fixtures plus in-memory stand-ins for the remote collaborators.

#![allow(missing_docs)]

use async_trait::async_trait;
use nsync_core::{ApiError, FieldDeployer, NotificationApi};
use nsync_model::{
    Change, ChangeKind, EventEntry, EventTypeId, IdentityKey, Notification, NotificationId,
    NotificationScheme, Parameter, SchemeEvent, SchemeId, SchemeRef,
};
use nsync_wire::{AddNotificationsRequest, RemoteNotification};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};

/// Remote call observed by [`MockNotificationApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Add {
        scheme_id: SchemeId,
        event_type: EventTypeId,
        notifications: usize,
    },
    Get {
        scheme_id: SchemeId,
    },
    Delete {
        scheme_id: SchemeId,
        notification_id: NotificationId,
    },
}

#[derive(Debug, Default)]
struct RemoteState {
    schemes: BTreeMap<SchemeId, BTreeMap<EventTypeId, Vec<RemoteNotification>>>,
    next_id: i64,
    calls: Vec<ApiCall>,
}

/// In-memory remote with per-event create/delete and read-back
///
/// Assigns sequential notification ids starting at the configured value.
#[derive(Debug)]
pub struct MockNotificationApi {
    state: Mutex<RemoteState>,
    failing_events: HashSet<EventTypeId>,
    failing_deletes: HashSet<NotificationId>,
    malformed_read_back: bool,
    hide_created: bool,
}

impl Default for MockNotificationApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotificationApi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RemoteState {
                next_id: 100,
                ..RemoteState::default()
            }),
            failing_events: HashSet::new(),
            failing_deletes: HashSet::new(),
            malformed_read_back: false,
            hide_created: false,
        }
    }

    /// First id handed out by create calls
    #[must_use]
    pub fn with_next_id(self, next_id: i64) -> Self {
        self.state.lock().next_id = next_id;
        self
    }

    /// Reject create calls for `event_type`
    #[must_use]
    pub fn with_failing_event(mut self, event_type: EventTypeId) -> Self {
        self.failing_events.insert(event_type);
        self
    }

    /// Reject deletes of `id`
    #[must_use]
    pub fn with_failing_delete(mut self, id: NotificationId) -> Self {
        self.failing_deletes.insert(id);
        self
    }

    /// Serve read-back pages without the events array
    #[must_use]
    pub fn with_malformed_read_back(mut self) -> Self {
        self.malformed_read_back = true;
        self
    }

    /// Accept creates but never show them in read-back
    #[must_use]
    pub fn with_hidden_creates(mut self) -> Self {
        self.hide_created = true;
        self
    }

    /// Pre-populate a remote notification
    #[must_use]
    pub fn with_notification(
        self,
        scheme_id: SchemeId,
        event_type: EventTypeId,
        id: NotificationId,
        channel: &str,
        parameter: Option<&str>,
    ) -> Self {
        self.state
            .lock()
            .schemes
            .entry(scheme_id)
            .or_default()
            .entry(event_type)
            .or_default()
            .push(RemoteNotification {
                id: Some(id),
                notification_type: channel.to_string(),
                parameter: parameter.map(Parameter::new),
            });
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    pub fn add_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, ApiCall::Add { .. }))
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, ApiCall::Delete { .. }))
            .collect()
    }

    /// Remote ids currently stored for `scheme_id`
    pub fn notification_ids(&self, scheme_id: SchemeId) -> Vec<NotificationId> {
        self.state
            .lock()
            .schemes
            .get(&scheme_id)
            .into_iter()
            .flat_map(|events| events.values().flatten())
            .filter_map(|n| n.id)
            .collect()
    }
}

#[async_trait]
impl NotificationApi for MockNotificationApi {
    async fn add_notifications(
        &self,
        scheme_id: SchemeId,
        body: &AddNotificationsRequest,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        for event in &body.notification_scheme_events {
            state.calls.push(ApiCall::Add {
                scheme_id,
                event_type: event.event.id,
                notifications: event.notifications.len(),
            });
            if self.failing_events.contains(&event.event.id) {
                return Err(ApiError::status(400, format!("event {} rejected", event.event.id)));
            }
            if self.hide_created {
                continue;
            }
            for notification in &event.notifications {
                let id = NotificationId(state.next_id);
                state.next_id += 1;
                state
                    .schemes
                    .entry(scheme_id)
                    .or_default()
                    .entry(event.event.id)
                    .or_default()
                    .push(RemoteNotification {
                        id: Some(id),
                        notification_type: notification.notification_type.clone(),
                        parameter: notification.parameter.clone(),
                    });
            }
        }
        Ok(())
    }

    async fn get_scheme(&self, scheme_id: SchemeId) -> Result<Value, ApiError> {
        let mut state = self.state.lock();
        state.calls.push(ApiCall::Get { scheme_id });

        if self.malformed_read_back {
            return Ok(json!({ "values": [{ "id": scheme_id.get(), "name": "broken" }] }));
        }

        let events: Vec<Value> = state
            .schemes
            .get(&scheme_id)
            .into_iter()
            .flatten()
            .map(|(event_type, notifications)| {
                json!({
                    "event": { "id": event_type.get() },
                    "notifications": notifications,
                })
            })
            .collect();

        Ok(json!({
            "values": [{
                "id": scheme_id.get(),
                "name": format!("scheme {scheme_id}"),
                "notificationSchemeEvents": events,
            }],
        }))
    }

    async fn delete_notification(
        &self,
        scheme_id: SchemeId,
        notification_id: NotificationId,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls.push(ApiCall::Delete {
            scheme_id,
            notification_id,
        });
        if self.failing_deletes.contains(&notification_id) {
            return Err(ApiError::status(500, "delete failed"));
        }

        let removed = state
            .schemes
            .get_mut(&scheme_id)
            .into_iter()
            .flat_map(|events| events.values_mut())
            .any(|notifications| {
                let before = notifications.len();
                notifications.retain(|n| n.id != Some(notification_id));
                notifications.len() != before
            });

        if removed {
            Ok(())
        } else {
            Err(ApiError::status(404, format!("notification {notification_id} not found")))
        }
    }
}

/// Field deploy observed by [`MockFieldDeployer`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCall {
    pub kind: ChangeKind,
    pub data: Value,
    pub exclude: Vec<String>,
}

/// Field deployer that records calls and assigns a fixed id on creation
#[derive(Debug)]
pub struct MockFieldDeployer {
    assigned_id: SchemeId,
    fail: bool,
    calls: Mutex<Vec<FieldCall>>,
}

impl MockFieldDeployer {
    #[must_use]
    pub fn new(assigned_id: SchemeId) -> Self {
        Self {
            assigned_id,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(SchemeId(0))
        }
    }

    pub fn calls(&self) -> Vec<FieldCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl FieldDeployer for MockFieldDeployer {
    async fn deploy_fields(
        &self,
        change: &Change<Value>,
        exclude: &[String],
    ) -> Result<Option<SchemeId>, ApiError> {
        let data = nsync_wire::without_fields(
            change.data(),
            &exclude.iter().map(String::as_str).collect::<Vec<_>>(),
        );
        self.calls.lock().push(FieldCall {
            kind: change.kind(),
            data: data.clone(),
            exclude: exclude.to_vec(),
        });

        if self.fail {
            return Err(ApiError::status(500, "field deploy failed"));
        }
        Ok(match change {
            Change::Addition { .. } => Some(self.assigned_id),
            Change::Modification { .. } => data.get("id").and_then(Value::as_i64).map(SchemeId),
            Change::Removal { .. } => None,
        })
    }
}

/// Scheme `Default` (id 10000): event 1 -> CurrentAssignee, Group(jira-admins)
pub fn default_scheme() -> NotificationScheme {
    NotificationScheme::new("Default")
        .with_id(SchemeId(10000))
        .with_description("Default notification scheme")
        .with_event(
            SchemeEvent::new(EventTypeId(1))
                .with_notification(Notification::new("CurrentAssignee"))
                .with_notification(Notification::new("Group").with_parameter("jira-admins")),
        )
}

/// Canonical entry fixture
pub fn entry(event_type: i64, channel: &str, parameter: Option<&str>) -> EventEntry {
    EventEntry {
        key: key(event_type, channel, parameter),
        id: None,
        scheme: SchemeRef {
            id: Some(SchemeId(10000)),
            name: "Default".to_string(),
        },
    }
}

/// Identity key fixture
pub fn key(event_type: i64, channel: &str, parameter: Option<&str>) -> IdentityKey {
    IdentityKey::new(EventTypeId(event_type), channel, parameter.map(Parameter::new))
}
