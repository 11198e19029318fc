//! Dual-transport query client: Bolt first, HTTP once on failure.

use std::time::Duration;

use vehigraph_core::{Credentials, QueryRequest, QueryResult, Record, Settings};

use crate::resolve::{self, ResolvedQuery};
use crate::transport::{self, Transport, TransportFailure, TransportKind};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Unrecognized query {0:?}: use LIVES_WITH, DRIVES, OWNS or a read-only Cypher query")]
    UnrecognizedQuery(String),

    #[error("Parameter `{0}` is reserved for the result limit")]
    ParameterConflict(String),

    #[error("Result limit must be a positive integer")]
    InvalidLimit,

    #[error("{transport} transport unavailable: {reason}")]
    TransportUnavailable {
        transport: TransportKind,
        reason: String,
    },

    #[error("{transport} transport error: {source}")]
    Transport {
        transport: TransportKind,
        #[source]
        source: TransportFailure,
    },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),
}

/// Resolves relationship queries and runs them against Neo4j.
///
/// Holds configuration only; every call connects, executes, and disconnects.
/// A failed primary attempt is followed by exactly one fallback attempt.
pub struct GraphQueryClient {
    primary: Option<Box<dyn Transport>>,
    fallback: Box<dyn Transport>,
    default_limit: u32,
    timeout: Option<Duration>,
}

impl GraphQueryClient {
    /// Build the client from settings, probing whether Bolt can be used.
    pub fn from_settings(settings: &Settings) -> Result<Self, GraphError> {
        let primary = match transport::primary(settings) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(error = %e, "Using HTTP transport only");
                None
            }
        };
        let fallback = transport::fallback(settings)?;

        tracing::info!(
            bolt = primary.is_some(),
            bolt_uri = %settings.bolt_uri,
            http_url = %settings.http_url,
            "Graph query client ready"
        );

        Ok(Self {
            primary,
            fallback,
            default_limit: settings.default_limit,
            timeout: settings.timeout(),
        })
    }

    /// Build the client from explicit transports.
    pub fn with_transports(primary: Option<Box<dyn Transport>>, fallback: Box<dyn Transport>) -> Self {
        Self {
            primary,
            fallback,
            default_limit: vehigraph_core::DEFAULT_RESULT_LIMIT,
            timeout: None,
        }
    }

    /// Bound each transport attempt; `None` leaves the transport's own default.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Whether a primary (Bolt) transport is in use.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Resolve and run a query.
    ///
    /// Resolution errors are returned before any I/O. Transport errors from
    /// the primary are logged and answered with one fallback attempt; if that
    /// fails too, its error is the one returned.
    pub async fn execute(
        &self,
        request: &QueryRequest,
        credentials: &Credentials,
    ) -> Result<QueryResult, GraphError> {
        let resolved = resolve::resolve(request)?;
        tracing::debug!(
            statement = %resolved.statement,
            keyword = ?resolved.keyword,
            limit = request.limit,
            "Resolved query"
        );

        if let Some(primary) = &self.primary {
            match self.attempt(primary.as_ref(), &resolved, credentials).await {
                Ok(records) => {
                    tracing::debug!(transport = %primary.kind(), rows = records.len(), "Query succeeded");
                    return Ok(records);
                }
                Err(e) => {
                    tracing::warn!(
                        transport = %primary.kind(),
                        fallback = %self.fallback.kind(),
                        error = %e,
                        "Primary transport failed, falling back"
                    );
                }
            }
        }

        let records = self
            .attempt(self.fallback.as_ref(), &resolved, credentials)
            .await
            .map_err(|source| {
                tracing::error!(transport = %self.fallback.kind(), error = %source, "Fallback transport failed");
                GraphError::Transport {
                    transport: self.fallback.kind(),
                    source,
                }
            })?;
        tracing::debug!(transport = %self.fallback.kind(), rows = records.len(), "Query succeeded");
        Ok(records)
    }

    async fn attempt(
        &self,
        transport: &dyn Transport,
        resolved: &ResolvedQuery,
        credentials: &Credentials,
    ) -> Result<Vec<Record>, TransportFailure> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, transport.execute(resolved, credentials))
                .await
                .map_err(|_| TransportFailure::Timeout(limit))?,
            None => transport.execute(resolved, credentials).await,
        }
    }
}
