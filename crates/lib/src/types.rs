use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resolved reference entity: the `{id, name}` pair every secondary
/// lookup (category, group, workspace) boils down to. Extra upstream
/// fields are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

/// The upstream service-catalog item as received.
///
/// The payload is deliberately kept as a raw JSON object: the flattener
/// walks it by key and must tolerate any shape the tenant sends, so a
/// fully typed struct would be both brittle and lossy. Typed accessors
/// cover the handful of fields the orchestration layer needs.
///
/// The record is never mutated after fetch; the resolver-derived
/// `category_name`/`workspace_name` enrichments are merged into a copy via
/// [`ServiceItem::with_derived`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceItem(Map<String, Value>);

impl ServiceItem {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn u64_field(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The nested `configs` object, when present.
    pub fn configs(&self) -> Option<&Map<String, Value>> {
        self.0.get("configs").and_then(Value::as_object)
    }

    /// The raw custom-field nodes. Malformed entries are kept as-is here;
    /// the extractor decides per node whether it is usable.
    pub fn custom_fields(&self) -> &[Value] {
        self.0
            .get("custom_fields")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns a copy of the record with a derived display-only field
    /// merged in. Used for `category_name`/`workspace_name`, which are
    /// resolver outputs rather than upstream truth.
    pub fn with_derived(&self, key: &str, value: impl Into<String>) -> Self {
        let mut fields = self.0.clone();
        fields.insert(key.to_string(), Value::String(value.into()));
        Self(fields)
    }
}

impl TryFrom<Value> for ServiceItem {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

/// One row of the default-fields view. Insertion order is significant and
/// preserved end-to-end into the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRow {
    pub id: String,
    pub label: String,
    pub value: String,
    /// The upstream API field name; `None` for derived rows (resolved-name
    /// companion rows, `category_name`, `workspace_name`).
    pub api_name: Option<String>,
    /// `None` for most rows; `Some(true)` only for `subject`, and sourced
    /// from `configs.attachment_mandatory` for `allow_attachments`.
    pub mandatory: Option<bool>,
}

/// One row per leaf custom field. Rows emitted from a conditional section
/// carry the parent field and section name that trigger their display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CustomFieldRow {
    pub id: String,
    pub label: String,
    pub name: String,
    pub placeholder: String,
    pub field_type: String,
    pub drop_down_values: String,
    pub dependent_fields: String,
    pub dependent_field_value: String,
}
