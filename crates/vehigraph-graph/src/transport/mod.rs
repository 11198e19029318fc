//! Transports that carry a resolved query to Neo4j.
//!
//! Bolt is the preferred transport; HTTP is the fallback. Which of them is
//! usable is decided once, when the client is built.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use vehigraph_core::{Credentials, Record, Settings};

use crate::client::GraphError;
use crate::resolve::ResolvedQuery;

#[cfg(feature = "bolt")]
pub mod bolt;
pub mod http;

/// Which wire protocol a transport speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Bolt,
    Http,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bolt => f.write_str("bolt"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Why a single transport attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum TransportFailure {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Neo4j {code}: {message}")]
    Database { code: String, message: String },

    #[error("could not decode result: {0}")]
    Decode(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// One way of running a query against Neo4j.
///
/// Implementations open whatever connection they need inside `execute` and
/// release it before returning, on success and failure alike.
#[async_trait]
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    async fn execute(
        &self,
        query: &ResolvedQuery,
        credentials: &Credentials,
    ) -> Result<Vec<Record>, TransportFailure>;
}

/// Build the Bolt transport, or explain why it cannot be used.
pub fn primary(settings: &Settings) -> Result<Box<dyn Transport>, GraphError> {
    if !settings.bolt_enabled {
        return Err(bolt_unavailable("disabled by configuration".to_string()));
    }
    build_bolt(settings).map_err(bolt_unavailable)
}

fn bolt_unavailable(reason: String) -> GraphError {
    GraphError::TransportUnavailable {
        transport: TransportKind::Bolt,
        reason,
    }
}

#[cfg(feature = "bolt")]
fn build_bolt(settings: &Settings) -> Result<Box<dyn Transport>, String> {
    if !bolt::is_bolt_uri(&settings.bolt_uri) {
        return Err(format!("unsupported URI scheme in {:?}", settings.bolt_uri));
    }
    Ok(Box::new(bolt::BoltTransport::new(settings)))
}

#[cfg(not(feature = "bolt"))]
fn build_bolt(_settings: &Settings) -> Result<Box<dyn Transport>, String> {
    Err("built without the `bolt` feature".to_string())
}

/// Build the HTTP transport.
pub fn fallback(settings: &Settings) -> Result<Box<dyn Transport>, GraphError> {
    let transport = http::HttpTransport::new(settings).map_err(|e| {
        GraphError::TransportUnavailable {
            transport: TransportKind::Http,
            reason: e.to_string(),
        }
    })?;
    Ok(Box::new(transport))
}
