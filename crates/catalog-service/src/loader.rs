use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use catalog_core::error::{Error, Result};
use catalog_core::mapper::DocumentMapper;
use catalog_core::records::RecordStream;
use catalog_core::traits::SearchTransport;
use catalog_core::types::{CollectionSchema, IndexedDocument};

/// Totals from one bulk import. Per-document failures are counted, not fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub submitted: usize,
    pub failed: usize,
}

pub struct BulkLoader {
    transport: Arc<dyn SearchTransport>,
    mapper: DocumentMapper,
}

impl BulkLoader {
    pub fn new(transport: Arc<dyn SearchTransport>, mapper: DocumentMapper) -> Self {
        Self { transport, mapper }
    }

    /// Creates (or recreates) the collection described by `schema_path` and
    /// imports every record from `records_path` into it.
    ///
    /// Both files are checked before the engine is touched.
    pub async fn load(
        &self,
        schema_path: &Path,
        records_path: &Path,
        overwrite: bool,
    ) -> Result<ImportReport> {
        let schema = read_schema(schema_path)?;
        let records = RecordStream::open(records_path)?;

        self.ensure_collection(&schema, overwrite).await?;

        tracing::info!(path = %records_path.display(), "Importing documents");
        let documents = self.map_records(records)?;
        tracing::info!(count = documents.len(), "Found documents to import");
        self.import(schema.name(), &documents).await
    }

    pub async fn ensure_collection(
        &self,
        schema: &CollectionSchema,
        overwrite: bool,
    ) -> Result<()> {
        let name = schema.name();
        if overwrite {
            tracing::info!(collection = name, "Dropping collection (overwrite mode)");
            match self.transport.delete_collection(name).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::debug!(collection = name, "nothing to drop");
                }
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!(collection = name, "Creating collection with schema");
        match self.transport.create_collection(schema).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_already_exists() => Err(Error::CollectionExists(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Maps records in input order; the first bad record aborts the batch.
    pub fn map_records<R: BufRead>(
        &self,
        records: RecordStream<R>,
    ) -> Result<Vec<IndexedDocument>> {
        records
            .enumerate()
            .map(|(position, record)| {
                let record: Value = record?;
                self.mapper
                    .map(&record)
                    .map_err(|source| Error::Mapping { position, source })
            })
            .collect()
    }

    /// One bulk call with create semantics. Rejected documents are logged and
    /// counted; only a failed call is an error.
    ///
    /// Outcomes pair with documents by position. A document the engine gave
    /// no outcome for counts as failed.
    pub async fn import(
        &self,
        collection: &str,
        documents: &[IndexedDocument],
    ) -> Result<ImportReport> {
        if documents.is_empty() {
            tracing::warn!(collection, "no documents to import");
            return Ok(ImportReport::default());
        }
        let outcomes = self.transport.import_documents(collection, documents).await?;
        if outcomes.len() != documents.len() {
            tracing::warn!(
                collection,
                submitted = documents.len(),
                outcomes = outcomes.len(),
                "engine reported a different number of import outcomes"
            );
        }
        let mut report = ImportReport {
            submitted: documents.len(),
            failed: 0,
        };
        for (position, document) in documents.iter().enumerate() {
            let error = match outcomes.get(position) {
                Some(outcome) if outcome.success => continue,
                Some(outcome) => outcome.error.as_deref().unwrap_or("unknown error"),
                None => "no outcome reported",
            };
            report.failed += 1;
            tracing::error!(
                component = "bulk_loader",
                collection,
                document_id = document.id(),
                error,
                "Error importing document"
            );
        }
        tracing::info!(
            collection,
            submitted = report.submitted,
            failed = report.failed,
            "Import finished"
        );
        Ok(report)
    }
}

/// Reads the collection schema; a missing or malformed file is a
/// configuration error naming the path.
pub fn read_schema(path: &Path) -> Result<CollectionSchema> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Schema file not found: {}",
            path.display()
        )));
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read schema {}: {}", path.display(), e)))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("Failed to parse schema {}: {}", path.display(), e)))?;
    CollectionSchema::try_from(value)
        .map_err(|e| Error::Config(format!("Invalid schema {}: {}", path.display(), e)))
}
