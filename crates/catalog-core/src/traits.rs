use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{
    CollectionSchema, EngineSearchRequest, EngineSearchResponse, ImportOutcome, IndexedDocument,
};

/// The narrow surface both components need from the external engine.
///
/// Implementations report failures with a [`crate::error::TransportErrorKind`]
/// so callers can tell "already exists" and "not found" apart from real
/// outages without inspecting messages.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), TransportError>;

    async fn delete_collection(&self, name: &str) -> Result<(), TransportError>;

    /// Bulk import with create semantics; one outcome per submitted document.
    async fn import_documents(
        &self,
        collection: &str,
        documents: &[IndexedDocument],
    ) -> Result<Vec<ImportOutcome>, TransportError>;

    async fn search(
        &self,
        collection: &str,
        request: &EngineSearchRequest,
    ) -> Result<EngineSearchResponse, TransportError>;
}
