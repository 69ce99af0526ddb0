//! catalog-core
//!
//! Shared pieces of the catalog search stack: configuration, error types,
//! the search engine transport trait, the record stream reader and the
//! document mapper.

#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod mapper;
pub mod records;
pub mod traits;
pub mod types;
