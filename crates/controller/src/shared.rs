//! Cross-control field exclusivity: a dataset field consumed by one member
//! of a shared-controls group is withheld from the lists offered to the
//! other members.

use log::warn;
use serde_json::Value;

use propeller_model::{
    Control, DatasetMetadata, FieldRef, PropertyId, SharedControlsGroup,
};

use crate::session::FormSession;
use crate::store::PropertyStore;

/// Filters `dataset` down to the fields not consumed by the other members
/// of the group `id` belongs to. Best-effort by contract: a broken group
/// registration must never block rendering, so internal failures are
/// logged and the metadata comes back unfiltered.
pub fn filter_shared_fields(
    store: &PropertyStore,
    session: &FormSession,
    groups: &[SharedControlsGroup],
    id: &PropertyId,
    dataset: DatasetMetadata,
) -> DatasetMetadata {
    let Some(group) = groups.iter().find(|group| group.contains(&id.name)) else {
        return dataset;
    };
    match consumed_fields(store, session, group, &id.name) {
        Ok(consumed) => {
            let mut dataset = dataset;
            dataset.retain_fields(|schema, field| {
                !consumed.iter().any(|name| consumes(name, schema, &field.name))
            });
            dataset
        }
        Err(err) => {
            warn!(
                "shared-control filtering for \"{}\" failed: {err}; fields left unfiltered",
                id.name
            );
            dataset
        }
    }
}

/// Whether a consumed-name entry claims `field_name` in schema `schema`.
/// Qualified entries (`schema.field`) claim within their schema only;
/// unqualified entries claim the field name in every schema.
fn consumes(consumed: &str, schema: &str, field_name: &str) -> bool {
    match consumed.split_once('.') {
        Some((qualifier, name)) => qualifier == schema && name == field_name,
        None => consumed == field_name,
    }
}

fn consumed_fields(
    store: &PropertyStore,
    session: &FormSession,
    group: &SharedControlsGroup,
    current: &str,
) -> Result<Vec<String>, String> {
    let mut consumed = Vec::new();
    for entry in &group.control_names {
        let other = entry.control_name.as_str();
        if other == current {
            continue;
        }
        let Some(control) = session.control_by_name(other) else {
            continue;
        };
        let Some(value) = store.property_value(&PropertyId::new(other)) else {
            continue;
        };
        collect_field_names(control, value, &mut consumed)?;
    }
    Ok(consumed)
}

fn push_reference(value: &Value, out: &mut Vec<String>) {
    match FieldRef::from_value(value) {
        Some(FieldRef::Name(name)) if !name.is_empty() => out.push(name),
        Some(FieldRef::Link {
            link_ref,
            field_name,
        }) => out.push(format!("{link_ref}.{field_name}")),
        _ => {}
    }
}

fn collect_field_names(
    control: &Control,
    value: &Value,
    out: &mut Vec<String>,
) -> Result<(), String> {
    match value {
        Value::String(_) | Value::Object(_) => push_reference(value, out),
        Value::Array(rows) if !control.sub_controls.is_empty() => {
            let col = control.key_column().ok_or_else(|| {
                format!(
                    "table control \"{}\" in a shared group has no column-role sub-control",
                    control.name
                )
            })?;
            for row in rows {
                if let Some(cell) = row.as_array().and_then(|cells| cells.get(col)) {
                    push_reference(cell, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                push_reference(item, out);
            }
        }
        _ => {}
    }
    Ok(())
}
