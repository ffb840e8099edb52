//! Subcommand implementations
//!
//! Each command writes its report to `out` and returns whether it succeeded;
//! `main` turns that into the exit code.

use crate::config::CliConfig;
use crate::files::{load_changes, load_value, write_scheme};
use anyhow::{Context, Result};
use nsync_core::{deploy_all_values, DeployReport, SchemeDeployer};
use nsync_diff::{diff_change, EventDiff};
use nsync_http::HttpNotificationClient;
use nsync_model::{Change, IdentityKey, NotificationScheme};
use nsync_wire::{decode_declarative, decode_read_back, decode_remote};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Payload shape checked by `validate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadShape {
    /// Remote scheme object
    #[default]
    Remote,
    /// Paged read-back response
    ReadBack,
    /// Declarative scheme document
    Declarative,
}

impl PayloadShape {
    /// Accepted `--kind` values
    pub const NAMES: [&'static str; 3] = ["remote", "read-back", "declarative"];

    /// Parse a `--kind` value
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "remote" => Some(Self::Remote),
            "read-back" => Some(Self::ReadBack),
            "declarative" => Some(Self::Declarative),
            _ => None,
        }
    }
}

/// Check a payload file against the expected shape
///
/// # Errors
/// Unreadable or unparseable file
pub fn validate(path: &Path, shape: PayloadShape, out: &mut impl Write) -> Result<bool> {
    let value = load_value(path)?;
    let checked = match shape {
        PayloadShape::Remote => decode_remote(&value).map(|s| s.notification_scheme_events.len()),
        PayloadShape::ReadBack => {
            decode_read_back(&value).map(|s| s.notification_scheme_events.len())
        }
        PayloadShape::Declarative => {
            decode_declarative(&value).map(|s| s.notification_scheme_events.len())
        }
    };

    match checked {
        Ok(events) => {
            writeln!(out, "{}: valid ({events} events)", path.display())?;
            Ok(true)
        }
        Err(err) => {
            writeln!(out, "{}: invalid: {err}", path.display())?;
            Ok(false)
        }
    }
}

#[derive(Serialize)]
struct PlanView {
    remove: Vec<String>,
    add: Vec<String>,
    unchanged: Vec<String>,
    duplicates: Vec<String>,
}

fn key_strings<'a>(keys: impl Iterator<Item = &'a IdentityKey>) -> Vec<String> {
    keys.map(ToString::to_string).collect()
}

/// Print the event operations a deploy would issue
///
/// Without `before` the scheme is treated as new.
///
/// # Errors
/// Unreadable file or a snapshot failing shape validation
pub fn plan(
    before: Option<&Path>,
    after: &Path,
    json: bool,
    out: &mut impl Write,
) -> Result<EventDiff> {
    let after = load_scheme(after)?;
    let change = match before {
        Some(path) => Change::Modification {
            before: load_scheme(path)?,
            after,
        },
        None => Change::Addition { after },
    };
    let diff = diff_change(&change);

    if json {
        let view = PlanView {
            remove: key_strings(diff.to_remove.iter().map(|e| &e.key)),
            add: key_strings(diff.to_add.iter().map(|e| &e.key)),
            unchanged: key_strings(diff.unchanged.iter()),
            duplicates: key_strings(diff.duplicates.iter()),
        };
        serde_json::to_writer_pretty(&mut *out, &view)?;
        writeln!(out)?;
    } else {
        for operation in diff.operations() {
            writeln!(out, "{operation}")?;
        }
        for key in &diff.duplicates {
            writeln!(out, "! duplicate {key}")?;
        }
        writeln!(
            out,
            "{} to remove, {} to add, {} unchanged",
            diff.to_remove.len(),
            diff.to_add.len(),
            diff.unchanged.len()
        )?;
    }
    Ok(diff)
}

fn load_scheme(path: &Path) -> Result<NotificationScheme> {
    let value = load_value(path)?;
    decode_declarative(&value).with_context(|| format!("invalid scheme in {}", path.display()))
}

/// `deploy` options
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Configuration file
    pub config: Option<PathBuf>,
    /// Change records file
    pub changes: PathBuf,
    /// Directory receiving applied schemes
    pub out_dir: Option<PathBuf>,
    /// Print the report as JSON
    pub json: bool,
}

/// Deploy change records against the configured remote
///
/// # Errors
/// Invalid configuration or change file, or an output write failure.
/// Per-change failures are reported, not returned.
pub async fn deploy(options: &DeployOptions, out: &mut impl Write) -> Result<bool> {
    let config = CliConfig::load(options.config.as_deref())?;
    let client = Arc::new(HttpNotificationClient::new(&config.http)?);
    tracing::debug!(base_url = %config.http.base_url, target = ?config.sync.target, "remote configured");

    let deployer = SchemeDeployer::new(client.clone(), client, config.sync)?;
    run_deploy(&deployer, options, out).await
}

/// Deploy with an already constructed deployer
///
/// # Errors
/// See [`deploy`]
pub async fn run_deploy(
    deployer: &SchemeDeployer,
    options: &DeployOptions,
    out: &mut impl Write,
) -> Result<bool> {
    let changes = load_changes(&options.changes)?;
    let report = deploy_all_values(deployer, changes).await;

    if let Some(dir) = &options.out_dir {
        write_applied(dir, &report)?;
    }

    if options.json {
        serde_json::to_writer_pretty(&mut *out, &report.view())?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", report.summary())?;
    }
    Ok(report.is_success())
}

fn write_applied(dir: &Path, report: &DeployReport) -> Result<()> {
    let partial = report.failed.iter().filter_map(|f| f.scheme.as_ref());
    for scheme in report.applied.iter().chain(partial) {
        let path = write_scheme(dir, scheme)?;
        tracing::debug!(path = %path.display(), scheme = %scheme.name, "wrote scheme");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn scheme(channels: &[&str]) -> serde_json::Value {
        json!({
            "name": "Default",
            "notificationSchemeEvents": [{
                "eventType": 1,
                "notifications": channels
                    .iter()
                    .map(|c| json!({ "type": c }))
                    .collect::<Vec<_>>(),
            }],
        })
    }

    #[test]
    fn plan_prints_operations_and_totals() {
        let dir = tempfile::tempdir().unwrap();
        let before = write(dir.path(), "before.json", &scheme(&["Reporter", "Watcher"]));
        let after = write(dir.path(), "after.json", &scheme(&["Reporter", "CurrentAssignee"]));

        let mut out = Vec::new();
        let diff = plan(Some(&before), &after, false, &mut out).unwrap();

        assert_eq!(diff.operation_count(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "- 1-Watcher-undefined\n+ 1-CurrentAssignee-undefined\n1 to remove, 1 to add, 1 unchanged\n"
        );
    }

    #[test]
    fn plan_without_before_adds_everything() {
        let dir = tempfile::tempdir().unwrap();
        let after = write(dir.path(), "after.json", &scheme(&["Reporter", "Watcher"]));

        let mut out = Vec::new();
        plan(None, &after, true, &mut out).unwrap();

        let view: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(view["add"], json!(["1-Reporter-undefined", "1-Watcher-undefined"]));
        assert_eq!(view["remove"], json!([]));
    }

    #[test]
    fn plan_rejects_malformed_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let after = write(dir.path(), "after.json", &json!({ "name": "Default" }));

        let err = plan(None, &after, false, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("invalid scheme"));
    }

    #[test]
    fn validate_reports_each_shape() {
        let dir = tempfile::tempdir().unwrap();
        let remote = write(
            dir.path(),
            "remote.json",
            &json!({
                "id": 10000,
                "notificationSchemeEvents": [{
                    "event": { "id": 1 },
                    "notifications": [{ "id": 1, "notificationType": "Reporter" }],
                }],
            }),
        );

        let mut out = Vec::new();
        assert!(validate(&remote, PayloadShape::Remote, &mut out).unwrap());
        assert!(!validate(&remote, PayloadShape::ReadBack, &mut out).unwrap());
        assert!(!validate(&remote, PayloadShape::Declarative, &mut out).unwrap());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("valid (1 events)"));
        assert_eq!(text.matches("invalid").count(), 2);
    }

    #[test]
    fn payload_shape_names_parse() {
        for name in PayloadShape::NAMES {
            assert!(PayloadShape::parse(name).is_some());
        }
        assert_eq!(PayloadShape::parse("page"), None);
    }
}
