//! Snapshot and change files
//!
//! `.yaml` / `.yml` files are read as YAML, everything else as JSON.

use anyhow::{Context, Result};
use nsync_model::{Change, NotificationScheme};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Read a single document
///
/// # Errors
/// Unreadable file or invalid document
pub fn load_value(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let value = if is_yaml(path) {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    Ok(value)
}

/// Read a list of change records
///
/// A file holding one record (rather than a list) is accepted too.
///
/// # Errors
/// Unreadable file or a record without a valid `action`
pub fn load_changes(path: &Path) -> Result<Vec<Change<Value>>> {
    let value = load_value(path)?;
    let records = match value {
        Value::Array(records) => records,
        single => vec![single],
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record)
                .with_context(|| format!("invalid change record #{index} in {}", path.display()))
        })
        .collect()
}

/// Write an applied scheme as pretty JSON under `dir`
///
/// # Errors
/// I/O failure
pub fn write_scheme(dir: &Path, scheme: &NotificationScheme) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(format!("{}.json", file_stem(&scheme.name)));
    let json = serde_json::to_string_pretty(scheme)?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsync_model::ChangeKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reads_json_and_yaml_alike() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("scheme.json");
        let yaml_path = dir.path().join("scheme.yaml");
        std::fs::write(&json_path, r#"{ "name": "Default", "notificationSchemeEvents": [] }"#).unwrap();
        std::fs::write(&yaml_path, "name: Default\nnotificationSchemeEvents: []\n").unwrap();

        assert_eq!(load_value(&json_path).unwrap(), load_value(&yaml_path).unwrap());
    }

    #[test]
    fn reads_change_lists_and_single_records() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("changes.yml");
        std::fs::write(
            &list,
            "- action: add\n  after: { name: A }\n- action: remove\n  before: { name: B }\n",
        )
        .unwrap();
        let single = dir.path().join("change.json");
        std::fs::write(&single, r#"{ "action": "modify", "before": {}, "after": {} }"#).unwrap();

        let kinds: Vec<_> = load_changes(&list).unwrap().iter().map(Change::kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Addition, ChangeKind::Removal]);
        assert_eq!(load_changes(&single).unwrap()[0].kind(), ChangeKind::Modification);
    }

    #[test]
    fn rejects_records_without_action() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.json");
        std::fs::write(&path, json!([{ "after": {} }]).to_string()).unwrap();

        let err = load_changes(&path).unwrap_err();
        assert!(err.to_string().contains("invalid change record #0"));
    }

    #[test]
    fn writes_scheme_under_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_scheme(dir.path(), &NotificationScheme::new("Ops / Critical")).unwrap();

        assert_eq!(path.file_name().unwrap(), "Ops___Critical.json");
        let written: NotificationScheme =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.name, "Ops / Critical");
    }
}
