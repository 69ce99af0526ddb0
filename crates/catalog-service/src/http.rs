//! Public read-only HTTP surface: `/health` and `/search`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use catalog_core::error::Error;
use catalog_core::types::{SearchFilters, SearchQuery, SearchResult};

use crate::query::QueryFacade;

pub const HEALTH_STATUS: &str = "Can't complain!";

#[derive(Clone)]
pub struct AppState {
    facade: Arc<QueryFacade>,
    facet_fields: Vec<String>,
    default_page_size: u32,
}

impl AppState {
    pub fn new(
        facade: Arc<QueryFacade>,
        facet_fields: Vec<String>,
        default_page_size: u32,
    ) -> Self {
        Self {
            facade,
            facet_fields,
            default_page_size,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Upstream(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidQuery(msg) => ApiError::BadRequest(msg),
            other => ApiError::Upstream(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    tracing::debug!("Health check endpoint called");
    Json(json!({ "health": HEALTH_STATUS }))
}

async fn search(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResult>, ApiError> {
    let query = parse_search_params(pairs, &state)?;
    tracing::info!(
        q = ?query.text,
        page = query.page,
        page_size = query.page_size,
        collections = ?query.filters.collections,
        tags = ?query.filters.tags,
        price_min = ?query.filters.price_min,
        price_max = ?query.filters.price_max,
        "Search endpoint called"
    );
    let result = state.facade.search(&query).await.map_err(|e| {
        let e = ApiError::from(e);
        if let ApiError::Upstream(ref cause) = e {
            tracing::error!(
                error = %cause,
                collection = state.facade.collection(),
                "search failed"
            );
        }
        e
    })?;
    Ok(Json(result))
}

/// Reads query pairs by hand so `collections` and `tags` may repeat.
fn parse_search_params(
    pairs: Vec<(String, String)>,
    state: &AppState,
) -> Result<SearchQuery, ApiError> {
    let mut query = SearchQuery {
        page_size: state.default_page_size,
        facet_fields: state.facet_fields.clone(),
        ..SearchQuery::default()
    };
    let mut filters = SearchFilters::default();
    for (key, value) in pairs {
        match key.as_str() {
            "q" => query.text = Some(value),
            "page" => query.page = positive(&key, &value)?,
            "pageSize" => query.page_size = positive(&key, &value)?,
            "collections" => filters.collections.push(value),
            "tags" => filters.tags.push(value),
            "price_min" => filters.price_min = Some(number(&key, &value)?),
            "price_max" => filters.price_max = Some(number(&key, &value)?),
            _ => {}
        }
    }
    query.filters = filters;
    Ok(query)
}

fn positive(key: &str, value: &str) -> Result<u32, ApiError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ApiError::BadRequest(format!(
            "{key} must be a positive integer, got {value:?}"
        ))),
    }
}

fn number(key: &str, value: &str) -> Result<f64, ApiError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ApiError::BadRequest(format!("{key} must be a number, got {value:?}")))
}
