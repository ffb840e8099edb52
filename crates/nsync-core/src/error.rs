//! Error types for reconciliation and deploys
//!
//! Two levels:
//! - [`EntryError`]: one binding failed; isolated, identifier map untouched
//! - [`SyncError`]: the scheme as a whole could not be applied

use crate::api::ApiError;
use nsync_model::IdentityKey;
use nsync_wire::DecodeError;
use std::fmt;

/// Failure of a single event binding
#[derive(Debug, Clone, thiserror::Error)]
pub enum EntryError {
    /// Remote call failed
    #[error("api call failed: {0}")]
    Api(#[from] ApiError),

    /// Read-back payload failed shape validation
    #[error("read-back rejected: {0}")]
    Decode(#[from] DecodeError),

    /// Created binding not found in the read-back
    #[error("created notification not found in read-back")]
    ReadBackMiss,
}

impl EntryError {
    /// Check if a retry could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_retryable(),
            Self::ReadBackMiss => true,
            Self::Decode(_) => false,
        }
    }
}

/// Direction of a primitive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Delete
    Remove,
    /// Create plus read-back
    Add,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remove => "remove",
            Self::Add => "add",
        })
    }
}

/// Failed binding with context
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} {key}: {error}")]
pub struct EntryFailure {
    /// Binding identity
    pub key: IdentityKey,
    /// Operation attempted
    pub operation: OperationKind,
    /// Cause
    #[source]
    pub error: EntryError,
}

impl EntryFailure {
    /// Create failure record
    #[inline]
    #[must_use]
    pub fn new(key: IdentityKey, operation: OperationKind, error: EntryError) -> Self {
        Self {
            key,
            operation,
            error,
        }
    }
}

/// Scheme-level deploy failure
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Snapshot failed shape validation
    #[error("invalid scheme payload: {0}")]
    Decode(#[from] DecodeError),

    /// Generic field deploy failed
    #[error("field deploy failed: {0}")]
    FieldDeploy(#[source] ApiError),

    /// No scheme id available to address event endpoints
    #[error("scheme '{name}' has no remote id")]
    MissingSchemeId {
        /// Scheme name
        name: String,
    },

    /// One or more bindings failed
    #[error("{} event binding(s) failed: {}", .failures.len(), summarize(.failures))]
    Reconcile {
        /// Per-binding failures
        failures: Vec<EntryFailure>,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Check if retrying the whole change could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::FieldDeploy(err) => err.is_retryable(),
            Self::Reconcile { failures } => failures.iter().all(|f| f.error.is_retryable()),
            Self::Decode(_) | Self::MissingSchemeId { .. } | Self::Config(_) => false,
        }
    }

    /// Per-binding failures, empty for scheme-level errors
    #[must_use]
    pub fn failures(&self) -> &[EntryFailure] {
        match self {
            Self::Reconcile { failures } => failures,
            _ => &[],
        }
    }
}

fn summarize(failures: &[EntryFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
