//! Remote collaborator interfaces
//!
//! The reconcile loop only talks to the remote through [`NotificationApi`];
//! whole-scheme field changes go through [`FieldDeployer`]. Both are shared
//! as `Arc<dyn ...>` and must be stateless from the caller's point of view.

use async_trait::async_trait;
use nsync_model::{Change, NotificationId, SchemeId};
use nsync_wire::AddNotificationsRequest;
use serde_json::Value;

/// Per-event notification endpoints
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Create every notification in `body` under `scheme_id`
    ///
    /// The remote does not return the assigned ids; callers read them back.
    async fn add_notifications(
        &self,
        scheme_id: SchemeId,
        body: &AddNotificationsRequest,
    ) -> Result<(), ApiError>;

    /// Query page for `scheme_id` with events expanded (`{ "values": [...] }`)
    async fn get_scheme(&self, scheme_id: SchemeId) -> Result<Value, ApiError>;

    /// Delete one notification binding
    async fn delete_notification(
        &self,
        scheme_id: SchemeId,
        notification_id: NotificationId,
    ) -> Result<(), ApiError>;
}

/// Generic whole-object field deploy path
#[async_trait]
pub trait FieldDeployer: Send + Sync {
    /// Deploy a wire-shaped change, ignoring the `exclude` top-level fields
    ///
    /// Returns the scheme id: the remote-assigned one for an addition, the
    /// existing one for a modification, `None` for a removal.
    async fn deploy_fields(
        &self,
        change: &Change<Value>,
        exclude: &[String],
    ) -> Result<Option<SchemeId>, ApiError>;
}

/// Remote call failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Non-success HTTP status
    #[error("remote returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Connection, timeout or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be read
    #[error("response decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Create status error
    #[inline]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Check if a retry could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            Self::Decode(_) => false,
        }
    }
}
