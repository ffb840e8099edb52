//! nsync CLI
//!
//! File-driven front end over the reconciliation crates.
//!
//! # Commands
//!
//! - `nsync plan --after <file> [--before <file>]`: print the event operations
//! - `nsync validate <file> [--kind remote|read-back|declarative]`: shape check
//! - `nsync deploy <changes> [--config <file>] [--out <dir>]`: apply changes
//!
//! Exit codes: `0` success, `1` failed check or change, `2` usage or I/O error.

#![warn(unreachable_pub)]

pub mod commands;
pub mod config;
pub mod files;
pub mod observability;

// Re-exports
pub use commands::{deploy, plan, run_deploy, validate, DeployOptions, PayloadShape};
pub use config::CliConfig;
pub use observability::LogFormat;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
