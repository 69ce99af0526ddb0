use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use catalog_core::config::EngineConfig;
use catalog_core::error::{TransportError, TransportErrorKind};
use catalog_core::traits::SearchTransport;
use catalog_core::types::{
    CollectionSchema, EngineSearchRequest, EngineSearchResponse, ImportOutcome, IndexedDocument,
};

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// Talks to a single Typesense node over its REST API.
///
/// Constructed once at the composition root and shared; holds a pooled
/// `reqwest::Client`, so cloning is cheap.
#[derive(Clone)]
pub struct TypesenseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Error body Typesense sends with non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl TypesenseClient {
    pub fn new(config: &EngineConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connection_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Unreachable, e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(classify)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map_or(body, |b| b.message);
        let kind = match status {
            StatusCode::CONFLICT => TransportErrorKind::AlreadyExists,
            StatusCode::NOT_FOUND => TransportErrorKind::NotFound,
            other => TransportErrorKind::Rejected {
                status: other.as_u16(),
            },
        };
        Err(TransportError::new(kind, message))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_decode() {
        TransportErrorKind::Decode
    } else {
        TransportErrorKind::Unreachable
    };
    TransportError::new(kind, err.to_string())
}

fn decode_error(err: serde_json::Error) -> TransportError {
    TransportError::new(TransportErrorKind::Decode, err.to_string())
}

/// Typesense answers a bulk import with one JSON object per line.
fn parse_import_lines(body: &str) -> Result<Vec<ImportOutcome>, TransportError> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(decode_error))
        .collect()
}

#[async_trait]
impl SearchTransport for TypesenseClient {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), TransportError> {
        tracing::debug!(collection = schema.name(), "creating collection");
        let request = self.http.post(self.url("/collections")).json(schema);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), TransportError> {
        tracing::debug!(collection = name, "deleting collection");
        let request = self.http.delete(self.url(&format!("/collections/{name}")));
        self.send(request).await?;
        Ok(())
    }

    async fn import_documents(
        &self,
        collection: &str,
        documents: &[IndexedDocument],
    ) -> Result<Vec<ImportOutcome>, TransportError> {
        let mut body = String::new();
        for document in documents {
            body.push_str(&serde_json::to_string(document).map_err(decode_error)?);
            body.push('\n');
        }
        tracing::debug!(
            collection,
            count = documents.len(),
            bytes = body.len(),
            "importing documents"
        );
        let request = self
            .http
            .post(self.url(&format!("/collections/{collection}/documents/import")))
            .query(&[("action", "create")])
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body);
        let text = self.send(request).await?.text().await.map_err(classify)?;
        parse_import_lines(&text)
    }

    async fn search(
        &self,
        collection: &str,
        request: &EngineSearchRequest,
    ) -> Result<EngineSearchResponse, TransportError> {
        let request = self
            .http
            .get(self.url(&format!("/collections/{collection}/documents/search")))
            .query(request);
        let text = self.send(request).await?.text().await.map_err(classify)?;
        serde_json::from_str(&text).map_err(decode_error)
    }
}
