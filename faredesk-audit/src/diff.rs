use crate::models::FieldChange;
use serde_json::Value;
use std::collections::BTreeMap;

/// Forward field diff: for every key in `new`, compare against `old` and emit
/// the pair when they differ. Keys absent from `new` are ignored, so a field
/// dropped from a snapshot never shows up as a deletion.
pub fn diff(old: &Value, new: &Value) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();
    let Some(new_map) = new.as_object() else {
        return changes;
    };
    for (key, new_value) in new_map {
        let old_value = old.get(key).cloned().unwrap_or(Value::Null);
        if &old_value != new_value {
            changes.insert(
                key.clone(),
                FieldChange {
                    from: old_value,
                    to: new_value.clone(),
                },
            );
        }
    }
    changes
}

/// Synthesize CREATE changes: every persisted field goes from null to its
/// initial value. Identity/timestamp fields are skipped.
pub fn creation_changes(snapshot: &Value, skip: &[&str]) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();
    let Some(map) = snapshot.as_object() else {
        return changes;
    };
    for (key, value) in map {
        if skip.contains(&key.as_str()) {
            continue;
        }
        changes.insert(
            key.clone(),
            FieldChange {
                from: Value::Null,
                to: value.clone(),
            },
        );
    }
    changes
}

/// Synthesize DELETE changes: the mirror of `creation_changes`.
pub fn deletion_changes(snapshot: &Value, skip: &[&str]) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();
    let Some(map) = snapshot.as_object() else {
        return changes;
    };
    for (key, value) in map {
        if skip.contains(&key.as_str()) {
            continue;
        }
        changes.insert(
            key.clone(),
            FieldChange {
                from: value.clone(),
                to: Value::Null,
            },
        );
    }
    changes
}

/// Diff for UPDATE entries: the forward diff minus identity/timestamp
/// fields. A save that only bumps `updated_at` yields an empty map, which
/// the recorder turns into no audit row at all.
pub fn update_changes(old: &Value, new: &Value) -> BTreeMap<String, FieldChange> {
    let mut changes = diff(old, new);
    for key in IDENTITY_FIELDS {
        changes.remove(*key);
    }
    changes
}

/// Fields never worth an audit line on their own.
pub const IDENTITY_FIELDS: &[&str] = &["id", "created_at", "updated_at"];
