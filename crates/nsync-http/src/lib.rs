//! nsync HTTP backend
//!
//! `reqwest` implementation of [`nsync_core::NotificationApi`] and
//! [`nsync_core::FieldDeployer`] against the notification scheme REST
//! endpoints:
//!
//! - `GET /notificationscheme?id={id}&expand=notificationSchemeEvents`
//! - `PUT /notificationscheme/{schemeId}/notification`
//! - `DELETE /notificationscheme/{schemeId}/notification/{notificationId}`
//! - `POST|PUT|DELETE /notificationscheme[/{id}]` for scheme fields
//!
//! Retry, rate limiting and pagination are left to the caller.

#![warn(unreachable_pub)]

mod client;
mod config;

pub use client::HttpNotificationClient;
pub use config::{HttpConfig, BASE_URL_ENV, TOKEN_ENV};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
