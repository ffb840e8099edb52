//! Sync configuration

use crate::error::SyncError;
use nsync_wire::RECONCILED_FIELDS;
use serde::{Deserialize, Serialize};

/// Remote deployment mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployTarget {
    /// Supports per-event notification endpoints
    #[default]
    Primary,
    /// Does not; scheme changes are deferred
    Secondary,
}

/// Reconciliation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Deployment mode of the remote
    pub target: DeployTarget,
    /// Maximum concurrent remote operations per scheme (and schemes per batch)
    pub max_in_flight: usize,
    /// Top-level fields withheld from the field deployer
    pub exclude_fields: Vec<String>,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With deployment target
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: DeployTarget) -> Self {
        self.target = target;
        self
    }

    /// With concurrency bound
    #[inline]
    #[must_use]
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// Withhold an additional field from the field deployer
    #[inline]
    #[must_use]
    pub fn with_excluded_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.exclude_fields.contains(&field) {
            self.exclude_fields.push(field);
        }
        self
    }

    /// Check invariants
    ///
    /// # Errors
    /// [`SyncError::Config`] when `max_in_flight` is zero or a reconciled
    /// field is not excluded
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.max_in_flight == 0 {
            return Err(SyncError::Config("max_in_flight must be at least 1".into()));
        }
        if let Some(missing) = RECONCILED_FIELDS
            .iter()
            .find(|field| !self.exclude_fields.iter().any(|f| f == *field))
        {
            return Err(SyncError::Config(format!(
                "exclude_fields must contain '{missing}'"
            )));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            target: DeployTarget::Primary,
            max_in_flight: 8,
            exclude_fields: RECONCILED_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }
}
