//! The custom-field tree extractor.
//!
//! Walks the record's `custom_fields` array, including nested fields and
//! conditional sections, and produces one flat row per leaf field. Rows
//! emitted from a section carry the parent field and section name that
//! trigger their display. A null or malformed node is skipped with a
//! diagnostic; one bad field never aborts the export.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::diag::{DiagnosticEvent, DiagnosticSink};
use crate::text::strip_html;
use crate::types::CustomFieldRow;

const DROPDOWN_FIELD_TYPE: &str = "custom_dropdown";
const RICH_TEXT_FIELD_TYPE: &str = "custom_static_rich_text";

/// A custom-field node as the tenant configures it. Everything is
/// optional: the extractor works with whatever survives deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub field_type: String,
    /// Display flags keyed by fixed option names; when an option shares a
    /// name with a tracked attribute it takes precedence over the node's
    /// own value.
    #[serde(default)]
    pub field_options: Map<String, Value>,
    /// Ordered `(value, label)` choice pairs for dropdown types. Kept
    /// loosely typed: tenants ship both pairs and wider tuples here.
    #[serde(default)]
    pub choices: Vec<Vec<Value>>,
    #[serde(default)]
    pub nested_fields: Vec<Value>,
    #[serde(default)]
    pub nested_field_choices: Vec<NestedChoice>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// `[label, value, sub-choices]` triple attached to a parent dropdown
/// with nested fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NestedChoice(pub String, pub Value, pub Vec<Vec<Value>>);

/// A named group of conditionally-displayed fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Value>,
}

/// The per-leaf extraction result, before conversion into the exported
/// row shape. `nested_choices` is synthesized here but, matching the
/// sheet-2 column contract, dropped by the [`CustomFieldRow`] conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafDetails {
    pub label: String,
    pub name: String,
    pub placeholder: String,
    pub field_type: String,
    pub drop_down_values: Option<String>,
    pub nested_choices: Option<String>,
    pub dependent_fields: Option<String>,
    pub dependent_field_value: Option<String>,
}

impl From<LeafDetails> for CustomFieldRow {
    fn from(details: LeafDetails) -> Self {
        let id = if details.name.is_empty() {
            details.label.clone()
        } else {
            details.name.clone()
        };
        CustomFieldRow {
            id,
            label: details.label,
            name: details.name,
            placeholder: details.placeholder,
            field_type: details.field_type,
            drop_down_values: details.drop_down_values.unwrap_or_default(),
            dependent_fields: details.dependent_fields.unwrap_or_default(),
            dependent_field_value: details.dependent_field_value.unwrap_or_default(),
        }
    }
}

/// Extracts one flat ordered row sequence from the raw custom-field
/// nodes: each node's own leaf row, then its nested fields (carrying the
/// parent's nested-choice lists), then its section fields tagged with
/// their dependency provenance.
pub fn extract_custom_fields(nodes: &[Value], diag: &dyn DiagnosticSink) -> Vec<CustomFieldRow> {
    let mut rows: Vec<CustomFieldRow> = Vec::new();

    for (position, node) in nodes.iter().enumerate() {
        let Some(field) = parse_node(node, position, diag) else {
            continue;
        };

        rows.push(extract_leaf(&field, None).into());

        for nested_node in &field.nested_fields {
            let Some(nested) = parse_node(nested_node, position, diag) else {
                continue;
            };
            let choices = (!field.nested_field_choices.is_empty())
                .then_some(field.nested_field_choices.as_slice());
            rows.push(extract_leaf(&nested, choices).into());
        }

        for section in &field.sections {
            for section_node in &section.fields {
                let Some(section_field) = parse_node(section_node, position, diag) else {
                    continue;
                };
                let mut details = extract_leaf(&section_field, None);
                details.dependent_fields = Some(field.name.clone().unwrap_or_default());
                details.dependent_field_value = Some(section.name.clone());
                rows.push(details.into());
            }
        }
    }

    rows
}

fn parse_node(node: &Value, position: usize, diag: &dyn DiagnosticSink) -> Option<CustomField> {
    if node.is_null() {
        diag.emit(DiagnosticEvent::MalformedCustomField { position });
        return None;
    }
    match serde_json::from_value::<CustomField>(node.clone()) {
        Ok(field) => Some(field),
        Err(_) => {
            diag.emit(DiagnosticEvent::MalformedCustomField { position });
            None
        }
    }
}

/// Extracts the tracked attributes of one leaf field.
///
/// For each of label / api-name / placeholder / field-type, a same-named
/// entry in `field_options` wins; otherwise the node's own attribute is
/// used, stripped of HTML when the field is a rich-text static type.
pub fn extract_leaf(field: &CustomField, nested_choices: Option<&[NestedChoice]>) -> LeafDetails {
    let mut details = LeafDetails {
        label: tracked_attribute(field, "label", field.label.as_deref()),
        name: tracked_attribute(field, "name", field.name.as_deref()),
        placeholder: tracked_attribute(field, "placeholder", field.placeholder.as_deref()),
        field_type: tracked_attribute(field, "field_type", Some(field.field_type.as_str())),
        ..LeafDetails::default()
    };

    if field.field_type == DROPDOWN_FIELD_TYPE && !field.choices.is_empty() {
        details.drop_down_values = Some(
            field
                .choices
                .iter()
                .filter_map(|choice| choice.first())
                .map(choice_text)
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    if let Some(choices) = nested_choices {
        details.nested_choices = Some(
            choices
                .iter()
                .map(|NestedChoice(label, _, sub_choices)| {
                    let values = sub_choices
                        .iter()
                        .filter_map(|sub| sub.first())
                        .map(choice_text)
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{label}-{values}")
                })
                .collect::<Vec<_>>()
                .join(", "),
        );
    }

    details
}

fn tracked_attribute(field: &CustomField, key: &str, fallback: Option<&str>) -> String {
    if let Some(option) = field.field_options.get(key) {
        return option_text(option);
    }
    let fallback = fallback.unwrap_or_default();
    if field.field_type == RICH_TEXT_FIELD_TYPE {
        strip_html(fallback)
    } else {
        fallback.to_string()
    }
}

fn option_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn choice_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
