//! Pre/post transforms between the declarative and wire scheme shapes
//!
//! Declarative: `eventType`, `type`, `id`.
//! Wire: `event: { id }`, `notificationType`, `id` mirrored into `schemeId`.

use crate::error::{DecodeError, PayloadKind};
use crate::validate::{decode_declarative, EVENTS_FIELD, EVENT_TYPE_FIELD};
use nsync_model::{IdentifierMap, Notification, NotificationScheme, SchemeEvent};
use serde_json::{Map, Value};

/// Identifier map field, never sent to the remote
pub const IDS_FIELD: &str = "notificationIds";

/// Scheme id mirror added for the field deployer
pub const SCHEME_ID_FIELD: &str = "schemeId";

/// Fields handled by the reconcile loop rather than the field deployer
pub const RECONCILED_FIELDS: [&str; 2] = [EVENTS_FIELD, IDS_FIELD];

/// Render a declarative scheme in wire shape
#[must_use]
pub fn to_wire(scheme: &NotificationScheme) -> Value {
    let mut object = Map::new();

    if let Some(id) = scheme.id {
        object.insert("id".into(), Value::from(id.get()));
        object.insert(SCHEME_ID_FIELD.into(), Value::from(id.get()));
    }
    object.insert("name".into(), Value::String(scheme.name.clone()));
    if let Some(description) = &scheme.description {
        object.insert("description".into(), Value::String(description.clone()));
    }
    object.insert(
        EVENTS_FIELD.into(),
        Value::Array(scheme.notification_scheme_events.iter().map(wire_event).collect()),
    );
    if !scheme.notification_ids.is_empty() {
        object.insert(IDS_FIELD.into(), ids_value(&scheme.notification_ids));
    }

    Value::Object(object)
}

fn wire_event(event: &SchemeEvent) -> Value {
    let mut reference = Map::new();
    reference.insert("id".into(), Value::from(event.event_type.get()));

    let mut object = Map::new();
    object.insert("event".into(), Value::Object(reference));
    object.insert(
        "notifications".into(),
        Value::Array(event.notifications.iter().map(wire_notification).collect()),
    );
    Value::Object(object)
}

fn wire_notification(notification: &Notification) -> Value {
    let mut object = Map::new();
    object.insert(
        "notificationType".into(),
        Value::String(notification.notification_type.clone()),
    );
    if let Some(parameter) = &notification.parameter {
        object.insert("parameter".into(), Value::String(parameter.as_str().to_string()));
    }
    if let Some(recipient) = &notification.recipient {
        object.insert("recipient".into(), Value::String(recipient.clone()));
    }
    Value::Object(object)
}

fn ids_value(ids: &IdentifierMap) -> Value {
    Value::Object(
        ids.iter()
            .map(|(key, id)| (key.to_string(), Value::from(id.get())))
            .collect(),
    )
}

/// Read a wire-shaped scheme back into the declarative shape
///
/// Strips `schemeId` and renames wire fields back. Payloads already in
/// declarative shape pass through unchanged.
///
/// # Errors
/// [`DecodeError`] when the result is not a valid declarative scheme
pub fn from_wire(wire: Value) -> Result<NotificationScheme, DecodeError> {
    let mut object = match wire {
        Value::Object(object) => object,
        other => {
            return Err(DecodeError::malformed(
                PayloadKind::Declarative,
                "scheme is not an object",
                &other,
            ))
        }
    };

    if let Some(mirror) = object.remove(SCHEME_ID_FIELD) {
        object.entry("id").or_insert(mirror);
    }

    if let Some(Value::Array(events)) = object.get_mut(EVENTS_FIELD) {
        for event in events.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(reference) = event.remove("event") {
                let id = reference.get("id").cloned().unwrap_or(reference);
                event.entry(EVENT_TYPE_FIELD).or_insert(id);
            }
            let notifications = event.get_mut("notifications").and_then(Value::as_array_mut);
            for notification in notifications.into_iter().flatten() {
                let Some(notification) = notification.as_object_mut() else {
                    continue;
                };
                if let Some(channel) = notification.remove("notificationType") {
                    notification.entry("type").or_insert(channel);
                }
                notification.remove("id");
            }
        }
    }

    decode_declarative(&Value::Object(object))
}

/// Copy of `value` without the top-level `fields`
#[must_use]
pub fn without_fields(value: &Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(name, _)| !fields.contains(&name.as_str()))
                .map(|(name, v)| (name.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsync_model::{EventTypeId, IdentityKey, NotificationId, Parameter, SchemeId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn scheme() -> NotificationScheme {
        NotificationScheme::new("Default")
            .with_id(SchemeId(10000))
            .with_description("desc")
            .with_event(
                SchemeEvent::new(EventTypeId(1))
                    .with_notification(Notification::new("Group").with_parameter("devs")),
            )
            .with_notification_ids(
                [(
                    IdentityKey::new(EventTypeId(1), "Group", Some(Parameter::new("devs"))),
                    NotificationId(7),
                )]
                .into_iter()
                .collect(),
            )
    }

    #[test]
    fn wire_shape_renames_fields_and_mirrors_id() {
        assert_eq!(
            to_wire(&scheme()),
            json!({
                "id": 10000,
                "schemeId": 10000,
                "name": "Default",
                "description": "desc",
                "notificationSchemeEvents": [{
                    "event": { "id": 1 },
                    "notifications": [{ "notificationType": "Group", "parameter": "devs" }],
                }],
                "notificationIds": { "1-Group-devs": 7 },
            })
        );
    }

    #[test]
    fn from_wire_restores_declarative_scheme() {
        let original = scheme();
        assert_eq!(from_wire(to_wire(&original)).unwrap(), original);
    }

    #[test]
    fn from_wire_accepts_remote_objects_with_ids() {
        let scheme = from_wire(json!({
            "id": 5,
            "name": "Remote",
            "notificationSchemeEvents": [{
                "event": { "id": 2, "name": "Issue updated" },
                "notifications": [{ "id": 99, "notificationType": "Reporter" }],
            }],
        }))
        .unwrap();
        assert_eq!(scheme.id, Some(SchemeId(5)));
        assert_eq!(scheme.notification_scheme_events[0].event_type, EventTypeId(2));
        assert_eq!(
            scheme.notification_scheme_events[0].notifications[0].notification_type,
            "Reporter"
        );
    }

    #[test]
    fn from_wire_rejects_non_objects() {
        assert!(from_wire(json!([1, 2])).is_err());
    }

    #[test]
    fn without_fields_drops_only_named_top_level_fields() {
        let stripped = without_fields(&to_wire(&scheme()), &RECONCILED_FIELDS);
        assert_eq!(
            stripped,
            json!({
                "id": 10000,
                "schemeId": 10000,
                "name": "Default",
                "description": "desc",
            })
        );
    }
}
