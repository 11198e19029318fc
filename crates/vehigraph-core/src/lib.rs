//! vehigraph-core: Shared types, configuration, and error handling for vehigraph.
//!
//! This crate provides the foundational pieces used by the query client and its callers:
//! - Relationship keywords, query requests, and result records
//! - Credentials passed through to Neo4j
//! - Settings loaded once from a config file and `NEO4J_` environment variables
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Settings;
pub use error::VehigraphError;
pub use types::{
    Credentials, ParamValue, Parameters, QueryRequest, QueryResult, Record, RelationshipKeyword,
    DEFAULT_RESULT_LIMIT,
};
