//! HTTP transport over the Neo4j transactional-commit endpoint.
//!
//! Request:  `{"statements": [{"statement": ..., "parameters": {...}}]}`
//! Response: `{"results": [{"columns": [...], "data": [{"row": [...]}]}], "errors": [...]}`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use vehigraph_core::{Credentials, Parameters, Record, Settings};

use super::{Transport, TransportFailure, TransportKind};
use crate::resolve::ResolvedQuery;

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Statement<'a> {
    statement: &'a str,
    parameters: &'a Parameters,
}

#[derive(Debug, Default, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<Neo4jError>,
}

#[derive(Debug, Default, Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Debug, Default, Deserialize)]
struct DataRow {
    #[serde(default)]
    row: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Neo4jError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Stateless request/response transport with basic authentication.
pub struct HttpTransport {
    client: reqwest::Client,
    commit_url: String,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self, TransportFailure> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            commit_url: settings.commit_url(),
        })
    }

    pub fn commit_url(&self) -> &str {
        &self.commit_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Http
    }

    async fn execute(
        &self,
        query: &ResolvedQuery,
        credentials: &Credentials,
    ) -> Result<Vec<Record>, TransportFailure> {
        let payload = CommitRequest {
            statements: [Statement {
                statement: &query.statement,
                parameters: &query.parameters,
            }],
        };

        let response = self
            .client
            .post(&self.commit_url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        tracing::debug!(url = %self.commit_url, "Neo4j HTTP commit succeeded");
        decode_commit_response(body)
    }
}

/// Turn a commit response body into records.
///
/// Column names are zipped positionally with each row; values missing from a
/// short row become null. A non-empty `errors` array fails the whole call.
pub fn decode_commit_response(body: serde_json::Value) -> Result<Vec<Record>, TransportFailure> {
    let body: CommitResponse =
        serde_json::from_value(body).map_err(|e| TransportFailure::Decode(e.to_string()))?;

    if let Some(error) = body.errors.into_iter().next() {
        return Err(TransportFailure::Database {
            code: error.code,
            message: error.message,
        });
    }

    let mut records = Vec::new();
    for result in body.results {
        for data in result.data {
            let mut values = data.row.into_iter();
            let record: Record = result
                .columns
                .iter()
                .map(|col| (col.clone(), values.next().unwrap_or(serde_json::Value::Null)))
                .collect();
            records.push(record);
        }
    }
    Ok(records)
}
