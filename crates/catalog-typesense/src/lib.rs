//! catalog-typesense
//!
//! [`catalog_core::traits::SearchTransport`] over the Typesense REST API.

pub mod client;

pub use client::TypesenseClient;
