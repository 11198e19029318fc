//! Bolt transport over `neo4rs`.

use async_trait::async_trait;
use neo4rs::{BoltNull, BoltType, ConfigBuilder, Graph, Query};

use vehigraph_core::{Credentials, ParamValue, Record, Settings};

use super::{Transport, TransportFailure, TransportKind};
use crate::resolve::ResolvedQuery;

const SCHEMES: &[&str] = &[
    "bolt://",
    "bolt+s://",
    "bolt+ssc://",
    "neo4j://",
    "neo4j+s://",
    "neo4j+ssc://",
];

pub fn is_bolt_uri(uri: &str) -> bool {
    SCHEMES.iter().any(|scheme| uri.starts_with(scheme))
}

/// Connects per call; the connection lives only for the duration of `execute`.
pub struct BoltTransport {
    uri: String,
    database: String,
    fetch_size: usize,
}

impl BoltTransport {
    pub fn new(settings: &Settings) -> Self {
        Self {
            uri: settings.bolt_uri.clone(),
            database: settings.database.clone(),
            fetch_size: settings.fetch_size,
        }
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Graph, TransportFailure> {
        let config = ConfigBuilder::default()
            .uri(self.uri.as_str())
            .user(credentials.username.as_str())
            .password(credentials.password.as_str())
            .db(self.database.as_str())
            .max_connections(1)
            .fetch_size(self.fetch_size)
            .build()
            .map_err(|e| TransportFailure::Connection(e.to_string()))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| TransportFailure::Connection(e.to_string()))?;

        tracing::debug!(uri = %self.uri, "Connected to Neo4j over Bolt");
        Ok(graph)
    }
}

#[async_trait]
impl Transport for BoltTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Bolt
    }

    async fn execute(
        &self,
        query: &ResolvedQuery,
        credentials: &Credentials,
    ) -> Result<Vec<Record>, TransportFailure> {
        // Dropped on every return path, which closes the connection.
        let graph = self.connect(credentials).await?;

        let mut stream = graph.execute(bolt_query(query)).await.map_err(driver)?;
        let mut records = Vec::new();
        while let Some(row) = stream.next().await.map_err(driver)? {
            let record: Record = row
                .to()
                .map_err(|e| TransportFailure::Decode(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }
}

fn bolt_query(resolved: &ResolvedQuery) -> Query {
    resolved
        .parameters
        .iter()
        .fold(neo4rs::query(&resolved.statement), |q, (name, value)| {
            q.param(name, bolt_value(value))
        })
}

fn bolt_value(value: &ParamValue) -> BoltType {
    match value {
        ParamValue::Null => BoltType::Null(BoltNull),
        ParamValue::Bool(b) => (*b).into(),
        ParamValue::Int(i) => (*i).into(),
        ParamValue::Float(f) => (*f).into(),
        ParamValue::String(s) => s.clone().into(),
    }
}

fn driver(e: neo4rs::Error) -> TransportFailure {
    TransportFailure::Driver(Box::new(e))
}
