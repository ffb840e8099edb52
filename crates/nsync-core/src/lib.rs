//! nsync Core
//!
//! Reconciles declarative notification schemes against a remote that only
//! exposes per-event create and delete endpoints.
//!
//! # Core Concepts
//!
//! - [`NotificationApi`]: per-event remote endpoints
//! - [`FieldDeployer`]: generic whole-scheme field deploy path
//! - [`Reconciler`]: applies an event diff, returning a new identifier map
//! - [`SchemeDeployer`]: sequences field deploy, event reconcile and transforms
//! - [`deploy_all`]: runs a batch of changes into a [`DeployReport`]
//!
//! # Example
//!
//! ```rust,ignore
//! use nsync_core::{deploy_all, SchemeDeployer, SyncConfig};
//!
//! # async fn example(api: std::sync::Arc<dyn nsync_core::NotificationApi>,
//! #                  fields: std::sync::Arc<dyn nsync_core::FieldDeployer>,
//! #                  changes: Vec<nsync_model::Change<nsync_model::NotificationScheme>>)
//! #     -> Result<(), nsync_core::SyncError> {
//! let deployer = SchemeDeployer::new(api, fields, SyncConfig::default())?;
//! let report = deploy_all(&deployer, changes).await;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod api;
pub mod batch;
pub mod config;
pub mod deploy;
pub mod error;
pub mod reconcile;

// Re-exports
pub use api::{ApiError, FieldDeployer, NotificationApi};
pub use batch::{deploy_all, deploy_all_values, DeployReport, FailedChange, FailureView, ReportView};
pub use config::{DeployTarget, SyncConfig};
pub use deploy::{SchemeDeployOutcome, SchemeDeployer};
pub use error::{EntryError, EntryFailure, OperationKind, SyncError};
pub use reconcile::{ReconcileOutcome, Reconciler};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
