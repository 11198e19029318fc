//! vehigraph-graph — relationship queries against Neo4j.
//!
//! Every query goes through [`GraphQueryClient`]: a keyword or raw Cypher
//! string is resolved into a bounded statement, run over Bolt, and retried
//! once over the HTTP transactional API if Bolt is unavailable or fails.

pub mod client;
pub mod resolve;
pub mod tool;
pub mod transport;

pub use client::{GraphError, GraphQueryClient};
pub use resolve::{ResolvedQuery, LIMIT_PARAM};
pub use tool::{RelationshipTool, ToolArgs, ToolDescriptor, TOOL_NAME};
pub use transport::{Transport, TransportFailure, TransportKind};
