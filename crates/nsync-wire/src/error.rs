//! Error types for the wire boundary

use std::fmt;

/// Which boundary a payload crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Remote scheme object
    Remote,
    /// Read-back query page (`{ values: [...] }`)
    ReadBack,
    /// Declarative snapshot from the host model
    Declarative,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote scheme",
            Self::ReadBack => "read-back",
            Self::Declarative => "declarative scheme",
        })
    }
}

/// Decoding failures at the wire boundary
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// Payload does not have the required structure
    #[error("malformed {kind} payload: {reason}")]
    Malformed {
        /// Boundary crossed
        kind: PayloadKind,
        /// Decoder message
        reason: String,
        /// Serialized offending payload
        payload: String,
    },

    /// Event type reference has the wrong type
    #[error("type mismatch at {field}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Path of the offending field
        field: String,
        /// Expected type description
        expected: &'static str,
        /// JSON type found
        found: &'static str,
    },
}

impl DecodeError {
    /// Create malformed-payload error
    pub fn malformed(
        kind: PayloadKind,
        reason: impl Into<String>,
        payload: &serde_json::Value,
    ) -> Self {
        Self::Malformed {
            kind,
            reason: reason.into(),
            payload: payload.to_string(),
        }
    }

    /// Whether this is a malformed-payload error
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
