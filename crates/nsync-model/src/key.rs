//! Identity keys for canonical event entries
//!
//! An [`IdentityKey`] names one logical binding: an event type, a delivery
//! channel type and an optional channel parameter. Two entries are the same
//! binding iff their keys are equal.
//!
//! The key is structured in memory. Its textual form
//! (`"{event}-{channel}-{parameter}"`, with `undefined` for a missing
//! parameter) is only used where the key must be persisted, such as the keys
//! of an [`IdentifierMap`](crate::IdentifierMap). A present parameter that
//! reads `undefined` or starts with [`PARAMETER_ESCAPE`] is written with one
//! leading escape, so the text form stays reversible.

use crate::ids::EventTypeId;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Placeholder used in the textual key form for an absent parameter
pub const UNDEFINED_PARAMETER: &str = "undefined";

/// Prefix marking a present parameter that would otherwise read ambiguously
pub const PARAMETER_ESCAPE: char = '\\';

/// Normalized channel parameter
///
/// Remote payloads carry parameters as either strings or numbers. Both are
/// normalized to their textual form on decode, so `"10010"` and `10010`
/// name the same parameter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parameter(String);

impl Parameter {
    /// Create parameter from text
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parameter text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for Parameter {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for Parameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ParameterVisitor)
    }
}

struct ParameterVisitor;

impl Visitor<'_> for ParameterVisitor {
    type Value = Parameter;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or numeric notification parameter")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Parameter, E> {
        Ok(Parameter::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Parameter, E> {
        Ok(Parameter(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Parameter, E> {
        Ok(Parameter(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Parameter, E> {
        Ok(Parameter(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Parameter, E> {
        if v.is_finite() {
            Ok(Parameter(v.to_string()))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

/// Structured identity of one event binding
///
/// Ordering is by event type, then channel type, then parameter, which gives
/// identifier maps a stable iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey {
    event_type: EventTypeId,
    channel: String,
    parameter: Option<Parameter>,
}

impl IdentityKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub fn new(
        event_type: EventTypeId,
        channel: impl Into<String>,
        parameter: Option<Parameter>,
    ) -> Self {
        Self {
            event_type,
            channel: channel.into(),
            parameter,
        }
    }

    /// Event type component
    #[inline]
    #[must_use]
    pub fn event_type(&self) -> EventTypeId {
        self.event_type
    }

    /// Channel type component (e.g. `Group`, `CurrentAssignee`)
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Parameter component
    #[inline]
    #[must_use]
    pub fn parameter(&self) -> Option<&Parameter> {
        self.parameter.as_ref()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-", self.event_type, self.channel)?;
        match self.parameter.as_ref().map(Parameter::as_str) {
            None => f.write_str(UNDEFINED_PARAMETER),
            Some(p) if p == UNDEFINED_PARAMETER || p.starts_with(PARAMETER_ESCAPE) => {
                write!(f, "{PARAMETER_ESCAPE}{p}")
            }
            Some(p) => f.write_str(p),
        }
    }
}

impl FromStr for IdentityKey {
    type Err = KeyParseError;

    /// Parse the textual form
    ///
    /// Splits on the first two `-` separators only, so parameters may contain
    /// dashes (e-mail addresses often do). Channel types never contain one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let event = parts.next().unwrap_or_default();
        let channel = parts
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| KeyParseError::MissingSegment {
                key: s.to_string(),
                segment: "channel",
            })?;
        let parameter = parts.next().ok_or_else(|| KeyParseError::MissingSegment {
            key: s.to_string(),
            segment: "parameter",
        })?;

        let event_type = event
            .parse::<i64>()
            .map_err(|source| KeyParseError::InvalidEventType {
                key: s.to_string(),
                source,
            })?;

        let parameter = (parameter != UNDEFINED_PARAMETER).then(|| {
            Parameter::new(parameter.strip_prefix(PARAMETER_ESCAPE).unwrap_or(parameter))
        });

        Ok(Self::new(EventTypeId(event_type), channel, parameter))
    }
}

/// Errors parsing a textual identity key
#[derive(Debug, thiserror::Error)]
pub enum KeyParseError {
    /// A segment is absent
    #[error("identity key '{key}' has no {segment} segment")]
    MissingSegment {
        key: String,
        segment: &'static str,
    },

    /// Event type segment is not numeric
    #[error("identity key '{key}' has a non-numeric event type: {source}")]
    InvalidEventType {
        key: String,
        #[source]
        source: std::num::ParseIntError,
    },
}
