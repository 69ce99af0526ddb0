//! Query façade: turns a [`SearchQuery`] into an engine request and the
//! engine's answer into a [`SearchResult`].

use std::sync::Arc;

use serde_json::{Map, Value};

use catalog_core::error::{Result, TransportError, TransportErrorKind};
use catalog_core::traits::SearchTransport;
use catalog_core::types::{
    EngineHit, EngineSearchRequest, MappingMode, SearchQuery, SearchResult, MATCH_ALL,
};

use crate::filter::build_filter;

/// Results are always ordered by ascending `rank`.
pub const SORT_BY: &str = "rank:asc";

pub struct QueryFacade {
    transport: Arc<dyn SearchTransport>,
    collection: String,
    mode: MappingMode,
    query_by: String,
}

impl QueryFacade {
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        collection: impl Into<String>,
        mode: MappingMode,
    ) -> Self {
        Self {
            transport,
            collection: collection.into(),
            mode,
            query_by: MATCH_ALL.to_string(),
        }
    }

    pub fn with_query_by(mut self, query_by: impl Into<String>) -> Self {
        self.query_by = query_by.into();
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn build_request(&self, query: &SearchQuery) -> Result<EngineSearchRequest> {
        let q = match query.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => MATCH_ALL.to_string(),
        };
        Ok(EngineSearchRequest {
            q,
            query_by: self.query_by.clone(),
            page: query.page,
            per_page: query.page_size,
            sort_by: SORT_BY.to_string(),
            filter_by: build_filter(&query.filters)?,
            facet_by: (!query.facet_fields.is_empty())
                .then(|| query.facet_fields.join(",")),
        })
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        let request = self.build_request(query)?;
        let response = self.transport.search(&self.collection, &request).await?;
        let documents = response
            .hits
            .into_iter()
            .map(|hit| self.decode_hit(hit))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(SearchResult {
            documents,
            has_more: has_more(query.page, query.page_size, response.found),
            total: response.found,
            facets: response.facet_counts,
        })
    }

    fn decode_hit(&self, hit: EngineHit) -> std::result::Result<Value, TransportError> {
        match self.mode {
            MappingMode::FixedSchema => decode_doc_field(&hit.document),
            MappingMode::PassthroughMinimal => Ok(Value::Object(hit.document)),
        }
    }
}

/// Recovers the original record stored in the `doc` string field.
fn decode_doc_field(document: &Map<String, Value>) -> std::result::Result<Value, TransportError> {
    let id = document.get("id").and_then(Value::as_str).unwrap_or("?");
    let raw = document
        .get("doc")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            TransportError::new(
                TransportErrorKind::Decode,
                format!("hit {id} has no `doc` field"),
            )
        })?;
    serde_json::from_str(raw).map_err(|e| {
        TransportError::new(
            TransportErrorKind::Decode,
            format!("hit {id} has an unreadable `doc`: {e}"),
        )
    })
}

/// True when pages after `page` still hold results.
pub fn has_more(page: u32, page_size: u32, found: u64) -> bool {
    u64::from(page) * u64::from(page_size) < found
}
