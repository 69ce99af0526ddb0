//! catalog-service
//!
//! The two components built on top of the engine transport: the bulk
//! loader that (re)creates a collection and imports mapped records, and the
//! query façade with its HTTP router.

pub mod filter;
pub mod http;
pub mod loader;
pub mod query;

pub use http::{router, AppState};
pub use loader::{BulkLoader, ImportReport};
pub use query::QueryFacade;
