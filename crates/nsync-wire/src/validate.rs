//! Shape validation: typed decode-or-fail at every payload boundary
//!
//! Every decoder either returns a fully typed structure or a
//! [`DecodeError`]; internal logic never re-checks optionality. Failures are
//! logged with the offending payload before being returned.

use crate::error::{DecodeError, PayloadKind};
use crate::wire::RemoteScheme;
use nsync_model::{project, EventEntry, NotificationScheme};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Field holding the scheme events, on both the declarative and wire shapes
pub const EVENTS_FIELD: &str = "notificationSchemeEvents";

/// Declarative event-type field
pub const EVENT_TYPE_FIELD: &str = "eventType";

/// Whether `payload` is a remote scheme the reconcile loop can safely read
#[must_use]
pub fn validate(payload: &Value) -> bool {
    decode_remote(payload).is_ok()
}

/// Decode a remote scheme object
///
/// # Errors
/// [`DecodeError::Malformed`] when the events array, an event id, a
/// notifications array or a notification type is missing or mistyped
pub fn decode_remote(payload: &Value) -> Result<RemoteScheme, DecodeError> {
    decode(PayloadKind::Remote, payload.clone(), payload)
}

/// Decode a read-back page and return its first scheme
///
/// # Errors
/// [`DecodeError::Malformed`] when the page has no `values` array, the array
/// is empty, or its first element fails [`decode_remote`]
pub fn decode_read_back(page: &Value) -> Result<RemoteScheme, DecodeError> {
    let first = page
        .get("values")
        .and_then(Value::as_array)
        .ok_or("missing 'values' array")
        .and_then(|values| values.first().ok_or("empty 'values' array"));

    match first {
        Ok(scheme) => decode(PayloadKind::ReadBack, scheme.clone(), page),
        Err(reason) => Err(reject(DecodeError::malformed(
            PayloadKind::ReadBack,
            reason,
            page,
        ))),
    }
}

/// Decode a declarative snapshot
///
/// `eventType` may be an integer id or an object carrying one (a resolved
/// reference); it is normalized to the integer before decoding.
///
/// # Errors
/// - [`DecodeError::TypeMismatch`] when an `eventType` is neither
/// - [`DecodeError::Malformed`] for any other structural problem
pub fn decode_declarative(payload: &Value) -> Result<NotificationScheme, DecodeError> {
    let mut normalized = payload.clone();

    if let Some(events) = normalized.get_mut(EVENTS_FIELD).and_then(Value::as_array_mut) {
        for (index, event) in events.iter_mut().enumerate() {
            let Some(event_type) = event.get_mut(EVENT_TYPE_FIELD) else {
                continue;
            };
            if let Some(id) = event_type_id(event_type) {
                *event_type = Value::from(id);
            } else {
                return Err(reject(DecodeError::TypeMismatch {
                    field: format!("{EVENTS_FIELD}[{index}].{EVENT_TYPE_FIELD}"),
                    expected: "event type id (integer or object with integer 'id')",
                    found: json_kind(event_type),
                }));
            }
        }
    }

    decode(PayloadKind::Declarative, normalized, payload)
}

/// Decode and project a declarative snapshot
///
/// # Errors
/// Any error from [`decode_declarative`]
pub fn project_value(payload: &Value) -> Result<Vec<EventEntry>, DecodeError> {
    decode_declarative(payload).map(|scheme| project(&scheme))
}

fn event_type_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Object(map) => map.get("id").and_then(Value::as_i64),
        _ => None,
    }
}

fn decode<T: DeserializeOwned>(
    kind: PayloadKind,
    value: Value,
    original: &Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(value)
        .map_err(|err| reject(DecodeError::malformed(kind, err.to_string(), original)))
}

fn reject(error: DecodeError) -> DecodeError {
    match &error {
        DecodeError::Malformed { payload, .. } => {
            tracing::error!(error = %error, payload = %payload, "payload failed shape validation");
        }
        DecodeError::TypeMismatch { .. } => {
            tracing::error!(error = %error, "declarative payload has a mistyped field");
        }
    }
    error
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsync_model::{EventTypeId, NotificationId, Parameter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn remote_payload() -> Value {
        json!({
            "id": 10000,
            "name": "Default",
            "expand": "notificationSchemeEvents",
            "notificationSchemeEvents": [{
                "event": { "id": 10, "name": "Issue created" },
                "notifications": [{
                    "id": 555,
                    "notificationType": "Single_Email_Address",
                    "parameter": "ops@example.com",
                    "emailAddress": "ops@example.com",
                }],
            }],
        })
    }

    #[test]
    fn accepts_well_formed_remote_payload_with_extra_fields() {
        let scheme = decode_remote(&remote_payload()).unwrap();
        let notification = &scheme.notification_scheme_events[0].notifications[0];
        assert_eq!(notification.id, Some(NotificationId(555)));
        assert_eq!(notification.parameter, Some(Parameter::new("ops@example.com")));
        assert!(validate(&remote_payload()));
    }

    #[test]
    fn rejects_missing_events_array() {
        let payload = json!({ "id": 1, "name": "x" });
        assert!(!validate(&payload));
        assert!(decode_remote(&payload).unwrap_err().is_malformed());
    }

    #[test]
    fn rejects_events_without_ids() {
        let payload = json!({
            "notificationSchemeEvents": [{ "event": {}, "notifications": [] }],
        });
        assert!(!validate(&payload));
    }

    #[test]
    fn rejects_notifications_without_type() {
        let payload = json!({
            "notificationSchemeEvents": [{
                "event": { "id": 1 },
                "notifications": [{ "id": 3 }],
            }],
        });
        assert!(!validate(&payload));
    }

    #[test]
    fn malformed_error_carries_payload() {
        let payload = json!({ "unexpected": true });
        match decode_remote(&payload) {
            Err(DecodeError::Malformed { kind, payload: text, .. }) => {
                assert_eq!(kind, PayloadKind::Remote);
                assert!(text.contains("unexpected"));
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn read_back_takes_first_value() {
        let page = json!({ "values": [remote_payload()], "total": 1 });
        let scheme = decode_read_back(&page).unwrap();
        assert_eq!(scheme.notification_scheme_events[0].event.id, EventTypeId(10));
    }

    #[test]
    fn read_back_rejects_empty_or_missing_values() {
        assert!(decode_read_back(&json!({ "values": [] })).is_err());
        assert!(decode_read_back(&json!({})).is_err());
        assert!(decode_read_back(&json!({ "values": [{ "name": "x" }] })).is_err());
    }

    #[test]
    fn declarative_accepts_reference_objects_for_event_type() {
        let scheme = decode_declarative(&json!({
            "name": "s",
            "notificationSchemeEvents": [
                { "eventType": { "id": 3, "name": "Issue resolved" }, "notifications": [] },
                { "eventType": 4, "notifications": [{ "type": "Reporter" }] },
            ],
        }))
        .unwrap();
        assert_eq!(scheme.notification_scheme_events[0].event_type, EventTypeId(3));
        assert_eq!(scheme.notification_scheme_events[1].event_type, EventTypeId(4));
    }

    #[test]
    fn declarative_rejects_mistyped_event_type() {
        let err = decode_declarative(&json!({
            "name": "s",
            "notificationSchemeEvents": [{ "eventType": "created", "notifications": [] }],
        }))
        .unwrap_err();
        match err {
            DecodeError::TypeMismatch { field, found, .. } => {
                assert_eq!(field, "notificationSchemeEvents[0].eventType");
                assert_eq!(found, "string");
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn project_value_rejects_invalid_snapshots() {
        assert!(project_value(&json!({ "name": "s" })).is_err());

        let entries = project_value(&json!({
            "name": "s",
            "notificationSchemeEvents": [
                { "eventType": 1, "notifications": [{ "type": "Group", "parameter": 10010 }] },
            ],
        }))
        .unwrap();
        assert_eq!(entries[0].key.to_string(), "1-Group-10010");
    }
}
