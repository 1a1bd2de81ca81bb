//! The default-field flattener.
//!
//! A fixed, ordered extractor list drives row emission over the raw
//! record: one row per key, in declared order, with dedicated formatting
//! rules for enums, child-item lists and foreign-key id arrays. The order
//! of [`DEFAULT_FIELD_KEYS`] is a public contract.
//!
//! Nothing in here aborts the pass: a missing key becomes a sentinel row,
//! and resolution failures degrade to partial or empty joined strings.

use serde_json::Value;

use crate::cache::NameCache;
use crate::diag::DiagnosticSink;
use crate::resolver::{resolve_joined, CatalogLookup, ReferenceKind};
use crate::text::field_label;
use crate::types::{FieldRow, ServiceItem};

/// The extractor list. The first 22 keys mirror the upstream record; the
/// trailing `subject` is derived from `configs.subject`.
pub const DEFAULT_FIELD_KEYS: [&str; 23] = [
    "id",
    "category_id",
    "category_name",
    "name",
    "display_id",
    "short_description",
    "description",
    "visibility",
    "delivery_time",
    "delivery_time_visibility",
    "cost",
    "agent_group_visibility",
    "agent_workspace_visibilities_workspace_id",
    "agent_group_visibilities_group_id",
    "group_visibility",
    "group_visibilities_group_id",
    "allow_attachments",
    "icon_url",
    "workspace_id",
    "workspace_name",
    "child_items",
    "create_child",
    "subject",
];

/// Keys whose rows are derived/display-only: present in the table but not
/// real upstream API fields, so their `api_name` is forced to `None`.
const DERIVED_NAME_KEYS: [&str; 2] = ["category_name", "workspace_name"];

/// The sentinel emitted when a key is absent from the record.
pub fn missing_property(key: &str) -> String {
    format!("Err: Property not found '{key}'")
}

/// Flattens the record into one ordered row per extractor key.
///
/// `item` is expected to already carry the pre-resolved `category_name`/
/// `workspace_name` enrichments (see [`crate::report::build_report`]); this
/// function resolves only the array-valued foreign-key fields, each with a
/// concurrent per-id fan-out.
pub async fn flatten_default_fields(
    item: &ServiceItem,
    lookup: &dyn CatalogLookup,
    cache: &mut NameCache,
    diag: &dyn DiagnosticSink,
) -> Vec<FieldRow> {
    let mut rows: Vec<FieldRow> = Vec::new();

    for key in DEFAULT_FIELD_KEYS {
        let Some(value) = item.get(key) else {
            if key == "subject" {
                rows.push(subject_row(item));
            } else {
                rows.push(FieldRow {
                    id: key.to_string(),
                    label: field_label(key),
                    value: missing_property(key),
                    api_name: Some(key.to_string()),
                    mandatory: None,
                });
            }
            continue;
        };

        match key {
            "allow_attachments" => {
                let attachment_mandatory = item
                    .configs()
                    .and_then(|configs| configs.get("attachment_mandatory"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                rows.push(FieldRow {
                    id: key.to_string(),
                    label: field_label(key),
                    value: display_value(value),
                    api_name: Some(key.to_string()),
                    mandatory: Some(attachment_mandatory),
                });
            }
            "child_items" => {
                rows.push(plain_row(key, format_child_items(value)));
            }
            "agent_group_visibility" => {
                let name = match value.as_i64() {
                    Some(1) => "All agents",
                    Some(2) => "Selected agent groups",
                    _ => "Selected workspace",
                };
                rows.push(plain_row(key, name.to_string()));
            }
            "group_visibility" => {
                let name = match value.as_i64() {
                    Some(1) => "All requesters",
                    _ => "Selected requesters",
                };
                rows.push(plain_row(key, name.to_string()));
            }
            "visibility" => {
                let name = match value.as_i64() {
                    Some(1) => "Draft",
                    _ => "Published",
                };
                rows.push(plain_row(key, name.to_string()));
            }
            "agent_workspace_visibilities_workspace_id" => {
                push_reference_rows(
                    key,
                    value,
                    ReferenceKind::Workspace,
                    "Agent Workspace Visibilities Name",
                    lookup,
                    cache,
                    diag,
                    &mut rows,
                )
                .await;
            }
            "agent_group_visibilities_group_id" => {
                push_reference_rows(
                    key,
                    value,
                    ReferenceKind::AgentGroup,
                    "Agent Visibilities Group Name",
                    lookup,
                    cache,
                    diag,
                    &mut rows,
                )
                .await;
            }
            "group_visibilities_group_id" => {
                push_reference_rows(
                    key,
                    value,
                    ReferenceKind::RequesterGroup,
                    "Requester Visibilities Group Name",
                    lookup,
                    cache,
                    diag,
                    &mut rows,
                )
                .await;
            }
            _ if DERIVED_NAME_KEYS.contains(&key) => {
                rows.push(FieldRow {
                    id: key.to_string(),
                    label: field_label(key),
                    value: display_value(value),
                    api_name: None,
                    mandatory: None,
                });
            }
            _ => {
                rows.push(plain_row(key, display_value(value)));
            }
        }
    }

    rows
}

fn plain_row(key: &str, value: String) -> FieldRow {
    FieldRow {
        id: key.to_string(),
        label: field_label(key),
        value,
        api_name: Some(key.to_string()),
        mandatory: None,
    }
}

/// `subject` is never a top-level key; its value comes from
/// `configs.subject` and falls back to the missing-property sentinel. It
/// is always required.
fn subject_row(item: &ServiceItem) -> FieldRow {
    let value = item
        .configs()
        .and_then(|configs| configs.get("subject"))
        .and_then(Value::as_str)
        .filter(|subject| !subject.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| missing_property("subject"));
    FieldRow {
        id: "subject".to_string(),
        label: field_label("subject"),
        value,
        api_name: Some("subject".to_string()),
        mandatory: Some(true),
    }
}

/// Scalars are stringified as-is; arrays and objects without a dedicated
/// rule keep their verbatim JSON serialization.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// `{id} - {name} - mandatory - {true|false}` per child item, one per
/// line. The upstream `mandatory` flag is an integer 0/1.
fn format_child_items(value: &Value) -> String {
    let Some(items) = value.as_array() else {
        return display_value(value);
    };
    items
        .iter()
        .map(|item| {
            let id = item.get("id").map(display_value).unwrap_or_default();
            let name = item.get("name").map(display_value).unwrap_or_default();
            let mandatory = item.get("mandatory").and_then(Value::as_i64) == Some(1);
            format!("{id} - {name} - mandatory - {mandatory}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emits the primary id-list row for a foreign-key field and, when any
/// name resolves, the synthetic companion row that carries the joined
/// display names.
#[allow(clippy::too_many_arguments)]
async fn push_reference_rows(
    key: &str,
    value: &Value,
    kind: ReferenceKind,
    name_label: &str,
    lookup: &dyn CatalogLookup,
    cache: &mut NameCache,
    diag: &dyn DiagnosticSink,
    rows: &mut Vec<FieldRow>,
) {
    let ids: Vec<u64> = value
        .as_array()
        .map(|entries| entries.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default();

    let id_list = if ids.is_empty() {
        "-".to_string()
    } else {
        ids.iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    rows.push(plain_row(key, id_list));

    let joined = resolve_joined(kind, &ids, lookup, cache, diag).await;
    if !joined.is_empty() {
        rows.push(FieldRow {
            id: format!("{key}name"),
            label: name_label.to_string(),
            value: joined,
            api_name: None,
            mandatory: None,
        });
    }
}
