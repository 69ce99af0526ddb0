//! Domain types shared by the bulk loader and the query façade.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Query text the engine treats as "match everything".
pub const MATCH_ALL: &str = "*";

/// How raw records are turned into engine documents.
///
/// The two policies produce incompatible collections: a collection created
/// for one will reject documents produced by the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingMode {
    /// Extract a fixed field set and keep the full record as a `doc` string.
    #[default]
    FixedSchema,
    /// Keep every field, only renaming the identifier and stringifying
    /// nested objects.
    PassthroughMinimal,
}

/// A flattened record as sent to the engine.
///
/// Always carries a string `id`; only [`crate::mapper::DocumentMapper`]
/// builds these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexedDocument(Map<String, Value>);

impl IndexedDocument {
    pub(crate) fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn id(&self) -> &str {
        self.0.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

/// Caller-owned collection definition, forwarded to the engine as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CollectionSchema(Map<String, Value>);

impl CollectionSchema {
    pub fn name(&self) -> &str {
        self.0.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn definition(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for CollectionSchema {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(definition) = value else {
            return Err("schema must be a JSON object".to_string());
        };
        match definition.get("name") {
            Some(Value::String(name)) if !name.is_empty() => Ok(Self(definition)),
            _ => Err("schema must have a non-empty string `name`".to_string()),
        }
    }
}

/// Structured restrictions on a search. Empty sets and `None` bounds mean
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub collections: Vec<String>,
    pub tags: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
            && self.tags.is_empty()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Free text; `None` or blank means match everything.
    pub text: Option<String>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub filters: SearchFilters,
    pub facet_fields: Vec<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: SearchFilters::default(),
            facet_fields: Vec::new(),
        }
    }
}

/// What the façade hands back to clients; serializes to the `/search`
/// response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub documents: Vec<Value>,
    pub has_more: bool,
    pub total: u64,
    pub facets: Vec<Value>,
}

/// Search parameters in the engine's own vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSearchRequest {
    pub q: String,
    pub query_by: String,
    pub page: u32,
    pub per_page: u32,
    pub sort_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineSearchResponse {
    pub found: u64,
    #[serde(default)]
    pub hits: Vec<EngineHit>,
    #[serde(default)]
    pub facet_counts: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineHit {
    pub document: Map<String, Value>,
}

/// Result of importing one document in a bulk call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// The rejected document, echoed back by the engine.
    #[serde(default)]
    pub document: Option<String>,
}

impl ImportOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            document: None,
        }
    }

    pub fn failed(error: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            document: Some(document.into()),
        }
    }
}
