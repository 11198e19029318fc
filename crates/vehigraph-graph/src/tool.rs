//! The `search_relationships` tool exposed to an LLM agent.
//!
//! The agent sees a name, a description of the three relationship keywords,
//! and a JSON schema for the arguments. Credentials come from settings and
//! never pass through the agent.

use serde::{Deserialize, Serialize};
use serde_json::json;

use vehigraph_core::{Credentials, Parameters, QueryRequest, QueryResult, RelationshipKeyword};

use crate::client::{GraphError, GraphQueryClient};

pub const TOOL_NAME: &str = "search_relationships";

const TOOL_DESCRIPTION: &str = "Search relationships between people and vehicles in a Neo4j \
graph. Pass one of these keywords as `query`: LIVES_WITH to find who lives together, \
DRIVES to find who drives a vehicle, OWNS to find who owns a vehicle. A read-only Cypher \
query is also accepted. Returns a list of records.";

/// Arguments as sent by the agent. `cypher` and `params` are accepted as aliases.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ToolArgs {
    #[serde(default = "default_query", alias = "cypher")]
    pub query: String,
    #[serde(default, alias = "params")]
    pub parameters: Option<Parameters>,
    #[serde(default)]
    pub limit: Option<u32>,
}

fn default_query() -> String {
    RelationshipKeyword::Drives.as_str().to_string()
}

/// Tool metadata in the shape agent frameworks expect for function calling.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

/// Binds a query client to the credentials it should use.
pub struct RelationshipTool {
    client: GraphQueryClient,
    credentials: Credentials,
}

impl RelationshipTool {
    pub fn new(client: GraphQueryClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn descriptor() -> ToolDescriptor {
        let keywords: Vec<&str> = RelationshipKeyword::ALL.iter().map(|k| k.as_str()).collect();
        ToolDescriptor {
            name: TOOL_NAME,
            description: TOOL_DESCRIPTION,
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": format!(
                            "Relationship keyword ({}) or a read-only Cypher query",
                            keywords.join(", ")
                        ),
                        "default": default_query(),
                        "examples": keywords,
                    },
                    "parameters": {
                        "type": ["object", "null"],
                        "description": "Cypher parameters; values must be scalars",
                        "additionalProperties": {
                            "type": ["string", "number", "boolean", "null"]
                        }
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum number of records to return"
                    }
                },
                "additionalProperties": false
            }),
        }
    }

    /// Run the tool with typed arguments.
    pub async fn search_relationships(
        &self,
        query: &str,
        parameters: Option<Parameters>,
        limit: Option<u32>,
    ) -> Result<QueryResult, GraphError> {
        let request = QueryRequest::new(query)
            .with_params(parameters.unwrap_or_default())
            .with_limit(limit.unwrap_or(self.client.default_limit()));
        self.client.execute(&request, &self.credentials).await
    }

    /// Run the tool with the raw JSON arguments an agent produced.
    pub async fn invoke(&self, args: serde_json::Value) -> Result<QueryResult, GraphError> {
        let args: ToolArgs = serde_json::from_value(args)?;
        tracing::info!(tool = TOOL_NAME, query = %args.query, limit = ?args.limit, "Tool invoked");
        self.search_relationships(&args.query, args.parameters, args.limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use vehigraph_core::{ParamValue, Record};

    use super::*;
    use crate::resolve::{template, ResolvedQuery, LIMIT_PARAM};
    use crate::transport::{Transport, TransportFailure, TransportKind};

    struct CapturingTransport {
        seen: Arc<Mutex<Vec<(ResolvedQuery, Credentials)>>>,
    }

    #[async_trait]
    impl Transport for CapturingTransport {
        fn kind(&self) -> TransportKind {
            TransportKind::Http
        }

        async fn execute(
            &self,
            query: &ResolvedQuery,
            credentials: &Credentials,
        ) -> Result<Vec<Record>, TransportFailure> {
            self.seen
                .lock()
                .unwrap()
                .push((query.clone(), credentials.clone()));
            Ok(Vec::new())
        }
    }

    fn tool() -> (RelationshipTool, Arc<Mutex<Vec<(ResolvedQuery, Credentials)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = GraphQueryClient::with_transports(
            None,
            Box::new(CapturingTransport { seen: seen.clone() }),
        )
        .with_default_limit(25);
        (
            RelationshipTool::new(client, Credentials::new("agent", "pw")),
            seen,
        )
    }

    #[test]
    fn args_accept_original_names() {
        let args: ToolArgs = serde_json::from_value(json!({
            "cypher": "OWNS",
            "params": {"brand": "Volvo"},
            "limit": 3
        }))
        .unwrap();
        assert_eq!(args.query, "OWNS");
        assert_eq!(
            args.parameters.unwrap()["brand"],
            ParamValue::String("Volvo".to_string())
        );
        assert_eq!(args.limit, Some(3));
    }

    #[test]
    fn args_default_to_drives() {
        let args: ToolArgs = serde_json::from_value(json!({})).unwrap();
        assert_eq!(args.query, "DRIVES");
        assert_eq!(args.parameters, None);
        assert_eq!(args.limit, None);
    }

    #[test]
    fn descriptor_lists_keywords() {
        let descriptor = RelationshipTool::descriptor();
        assert_eq!(descriptor.name, "search_relationships");
        for keyword in RelationshipKeyword::ALL {
            assert!(descriptor.description.contains(keyword.as_str()));
        }
        assert_eq!(descriptor.parameters["properties"]["query"]["default"], "DRIVES");
    }

    #[tokio::test]
    async fn invoke_uses_bound_credentials_and_default_limit() {
        let (tool, seen) = tool();
        tool.invoke(json!({"query": "LIVES_WITH"})).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (query, creds) = &seen[0];
        assert_eq!(query.statement, template(RelationshipKeyword::LivesWith));
        assert_eq!(query.parameters[LIMIT_PARAM], ParamValue::Int(25));
        assert_eq!(creds, &Credentials::new("agent", "pw"));
    }

    #[tokio::test]
    async fn invoke_rejects_unknown_keyword() {
        let (tool, seen) = tool();
        let err = tool.invoke(json!({"query": "KNOWS"})).await.unwrap_err();
        assert!(matches!(err, GraphError::UnrecognizedQuery(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invoke_rejects_malformed_arguments() {
        let (tool, _) = tool();
        let err = tool.invoke(json!({"limit": "ten"})).await.unwrap_err();
        assert!(matches!(err, GraphError::InvalidArguments(_)));
    }
}
