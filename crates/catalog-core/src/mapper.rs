//! Turns raw catalog records into engine documents.
//!
//! Two policies exist (see [`MappingMode`]). Under `fixed-schema` the mapper
//! pulls a fixed set of flat fields out of the record and keeps the whole
//! record as a JSON string in `doc`, so the façade can hand it back later
//! without a second lookup. Under `passthrough-minimal` the record keeps
//! every field; only the identifier is rewritten and nested objects become
//! strings.

use serde_json::{Map, Value};

use crate::error::MappingError;
use crate::types::{IndexedDocument, MappingMode};

const ID_FIELD: &str = "_id";
const OID_KEY: &str = "$oid";

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMapper {
    mode: MappingMode,
}

impl DocumentMapper {
    pub fn new(mode: MappingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MappingMode {
        self.mode
    }

    pub fn map(&self, record: &Value) -> Result<IndexedDocument, MappingError> {
        let fields = record.as_object().ok_or(MappingError::NotAnObject)?;
        let id = extract_id(fields)?;
        let document = match self.mode {
            MappingMode::FixedSchema => fixed_schema(record, fields, id),
            MappingMode::PassthroughMinimal => passthrough_minimal(fields, id),
        };
        Ok(IndexedDocument::from_fields(document))
    }
}

/// Reads `_id` as either `{"$oid": <scalar>}` or a bare scalar.
pub fn extract_id(record: &Map<String, Value>) -> Result<String, MappingError> {
    let raw = record.get(ID_FIELD).ok_or(MappingError::MissingId)?;
    let inner = match raw {
        Value::Object(wrapper) => wrapper
            .get(OID_KEY)
            .ok_or_else(|| MappingError::UnrecognizedId(raw.to_string()))?,
        scalar => scalar,
    };
    match inner {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(MappingError::UnrecognizedId(raw.to_string())),
    }
}

fn fixed_schema(record: &Value, fields: &Map<String, Value>, id: String) -> Map<String, Value> {
    let empty_str = || Value::String(String::new());
    let empty_seq = || Value::Array(Vec::new());
    let zero = || Value::from(0);

    let mut out = Map::new();
    out.insert("id".into(), Value::String(id));
    out.insert("doc".into(), Value::String(record.to_string()));
    out.insert("alias".into(), field_or(fields, "alias", empty_str));
    out.insert(
        "collections".into(),
        field_or(fields, "collections", empty_seq),
    );
    out.insert("tags".into(), field_or(fields, "tags", empty_seq));
    out.insert("handle".into(), field_or(fields, "handle", empty_str));
    out.insert("title".into(), field_or(fields, "title", empty_str));
    out.insert(
        "description".into(),
        field_or(fields, "description", empty_str),
    );
    out.insert("rank".into(), field_or(fields, "rank", zero));
    out.insert(
        "variants_titles".into(),
        Value::Array(pluck(fields, "variants", "title")),
    );
    out.insert(
        "variants_colors".into(),
        Value::Array(pluck(fields, "variants", "Color")),
    );
    out.insert(
        "options_values".into(),
        Value::Array(flatten_option_values(fields)),
    );
    out.insert("price".into(), field_or(fields, "price", zero));
    out
}

fn passthrough_minimal(fields: &Map<String, Value>, id: String) -> Map<String, Value> {
    let mut out = Map::with_capacity(fields.len());
    out.insert("id".into(), Value::String(id));
    for (key, value) in fields {
        if key == ID_FIELD || key == "id" {
            continue;
        }
        let value = match value {
            Value::Object(_) => Value::String(value.to_string()),
            other => other.clone(),
        };
        out.insert(key.clone(), value);
    }
    out
}

fn field_or(fields: &Map<String, Value>, key: &str, default: impl FnOnce() -> Value) -> Value {
    fields.get(key).cloned().unwrap_or_else(default)
}

fn entries<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Values of `key` from every entry of the `list` array that has it, in order.
fn pluck(fields: &Map<String, Value>, list: &str, key: &str) -> Vec<Value> {
    entries(fields, list)
        .filter_map(|entry| entry.get(key).cloned())
        .collect()
}

/// Concatenates `values` of every `options` entry. Entries without a
/// `values` array contribute nothing.
fn flatten_option_values(fields: &Map<String, Value>) -> Vec<Value> {
    entries(fields, "options")
        .filter_map(|option| option.get("values").and_then(Value::as_array))
        .flatten()
        .cloned()
        .collect()
}
