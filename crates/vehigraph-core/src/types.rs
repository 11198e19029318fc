//! Core domain types for querying the people/vehicle graph.
//!
//! These types are shared by the query client, the agent tool, and the CLI.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VehigraphError;

/// Number of records returned when the caller does not ask for a limit.
pub const DEFAULT_RESULT_LIMIT: u32 = 25;

// ── Relationship Keywords ─────────────────────────────────────────

/// Shorthand for one of the canonical relationship queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKeyword {
    /// Two people sharing a household.
    LivesWith,
    /// A person driving a vehicle.
    Drives,
    /// A person owning a vehicle.
    Owns,
}

impl RelationshipKeyword {
    pub const ALL: [RelationshipKeyword; 3] = [Self::LivesWith, Self::Drives, Self::Owns];

    /// The Neo4j relationship type this keyword matches.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LivesWith => "LIVES_WITH",
            Self::Drives => "DRIVES",
            Self::Owns => "OWNS",
        }
    }
}

impl fmt::Display for RelationshipKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKeyword {
    type Err = VehigraphError;

    /// Exact, case-sensitive match on the relationship type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| VehigraphError::UnknownKeyword(s.to_string()))
    }
}

// ── Query Parameters ──────────────────────────────────────────────

/// A scalar query parameter value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Named query parameters, as supplied by the caller.
pub type Parameters = BTreeMap<String, ParamValue>;

// ── Requests & Results ────────────────────────────────────────────

/// A single query against the graph: a relationship keyword or raw Cypher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_RESULT_LIMIT
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters: Parameters::new(),
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn keyword(keyword: RelationshipKeyword) -> Self {
        Self::new(keyword.as_str())
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Parameters) -> Self {
        self.parameters.extend(params);
        self
    }
}

/// One returned row: column name to value, in `RETURN` order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// All rows of a query, in the order the database returned them.
pub type QueryResult = Vec<Record>;

// ── Credentials ───────────────────────────────────────────────────

/// Username/password pair passed through to Neo4j on every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
