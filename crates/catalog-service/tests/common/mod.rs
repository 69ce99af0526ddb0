//! In-memory stand-in for the search engine.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use catalog_core::error::{TransportError, TransportErrorKind};
use catalog_core::traits::SearchTransport;
use catalog_core::types::{
    CollectionSchema, EngineHit, EngineSearchRequest, EngineSearchResponse, ImportOutcome,
    IndexedDocument,
};
use serde_json::{Map, Value};

#[derive(Default)]
pub struct FakeEngine {
    collections: Mutex<HashMap<String, Vec<IndexedDocument>>>,
    searches: Mutex<Vec<EngineSearchRequest>>,
    canned: Mutex<Option<EngineSearchResponse>>,
    outage: Mutex<Option<TransportErrorKind>>,
    deletes: Mutex<usize>,
    outcome_limit: Mutex<Option<usize>>,
}

impl FakeEngine {
    pub fn with_collection(name: &str) -> Self {
        let engine = Self::default();
        engine
            .collections
            .lock()
            .unwrap()
            .insert(name.to_string(), Vec::new());
        engine
    }

    pub fn answer_with(&self, response: EngineSearchResponse) {
        *self.canned.lock().unwrap() = Some(response);
    }

    pub fn go_down(&self, kind: TransportErrorKind) {
        *self.outage.lock().unwrap() = Some(kind);
    }

    /// Answers imports with at most `limit` outcome lines.
    pub fn report_outcomes_up_to(&self, limit: usize) {
        *self.outcome_limit.lock().unwrap() = Some(limit);
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.lock().unwrap().contains_key(name)
    }

    pub fn documents(&self, name: &str) -> Vec<IndexedDocument> {
        self.collections
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn searches(&self) -> Vec<EngineSearchRequest> {
        self.searches.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> usize {
        *self.deletes.lock().unwrap()
    }

    fn check_up(&self) -> Result<(), TransportError> {
        match *self.outage.lock().unwrap() {
            Some(kind) => Err(TransportError::new(kind, "engine unavailable")),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchTransport for FakeEngine {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), TransportError> {
        self.check_up()?;
        let mut collections = self.collections.lock().unwrap();
        if collections.contains_key(schema.name()) {
            return Err(TransportError::new(
                TransportErrorKind::AlreadyExists,
                format!(
                    "A collection with name `{}` already exists.",
                    schema.name()
                ),
            ));
        }
        collections.insert(schema.name().to_string(), Vec::new());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), TransportError> {
        self.check_up()?;
        *self.deletes.lock().unwrap() += 1;
        match self.collections.lock().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(TransportError::new(
                TransportErrorKind::NotFound,
                "Not Found",
            )),
        }
    }

    async fn import_documents(
        &self,
        collection: &str,
        documents: &[IndexedDocument],
    ) -> Result<Vec<ImportOutcome>, TransportError> {
        self.check_up()?;
        let mut collections = self.collections.lock().unwrap();
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| TransportError::new(TransportErrorKind::NotFound, "Not Found"))?;
        let mut outcomes = Vec::with_capacity(documents.len());
        for doc in documents {
            if stored.iter().any(|d| d.id() == doc.id()) {
                outcomes.push(ImportOutcome::failed(
                    format!("A document with id {} already exists.", doc.id()),
                    serde_json::to_string(doc).unwrap(),
                ));
            } else {
                stored.push(doc.clone());
                outcomes.push(ImportOutcome::ok());
            }
        }
        if let Some(limit) = *self.outcome_limit.lock().unwrap() {
            outcomes.truncate(limit);
        }
        Ok(outcomes)
    }

    async fn search(
        &self,
        _collection: &str,
        request: &EngineSearchRequest,
    ) -> Result<EngineSearchResponse, TransportError> {
        self.check_up()?;
        self.searches.lock().unwrap().push(request.clone());
        let canned = self.canned.lock().unwrap().clone();
        Ok(canned.unwrap_or(EngineSearchResponse {
            found: 0,
            hits: Vec::new(),
            facet_counts: Vec::new(),
        }))
    }
}

/// A hit as the engine stores it under fixed-schema mapping.
pub fn stored_hit(record: &Value) -> EngineHit {
    let mut document = Map::new();
    document.insert("id".into(), record["_id"]["$oid"].clone());
    document.insert("doc".into(), Value::String(record.to_string()));
    EngineHit { document }
}
