//! HTTP transport and fallback tests against a stub of the Neo4j HTTP API.
//!
//! The stub answers `POST /db/neo4j/tx/commit` with a canned body and keeps
//! every request it receives, so payloads and auth headers can be checked.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use vehigraph_core::{Credentials, QueryRequest, RelationshipKeyword, Settings};
use vehigraph_graph::resolve::template;
use vehigraph_graph::{GraphError, GraphQueryClient, TransportFailure, TransportKind};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    response: Arc<Value>,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn commit(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.requests.lock().unwrap().push((auth, body));
    (stub.status, Json((*stub.response).clone()))
}

async fn start_stub(status: StatusCode, response: Value) -> (String, Stub) {
    let stub = Stub {
        status,
        response: Arc::new(response),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/db/neo4j/tx/commit", post(commit))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), stub)
}

fn http_only(base_url: &str) -> Settings {
    Settings {
        http_url: base_url.to_string(),
        bolt_enabled: false,
        timeout_secs: Some(5),
        ..Default::default()
    }
}

fn creds() -> Credentials {
    Credentials::new("neo4j", "secret")
}

fn drives_body() -> Value {
    json!({
        "results": [{
            "columns": ["source", "relationship", "relationship_properties", "target"],
            "data": [
                {"row": [{"name": "Dan"}, "DRIVES", {}, {"brand": "Volvo", "model": "V70"}]},
                {"row": [{"name": "Ann"}, "DRIVES", {}, {"brand": "Volvo", "model": "V70"}]},
                {"row": [{"name": "Eve"}, "DRIVES", {}]}
            ]
        }],
        "errors": []
    })
}

#[tokio::test]
async fn test_http_only_sends_commit_envelope_with_basic_auth() {
    let (base_url, stub) = start_stub(StatusCode::OK, drives_body()).await;
    let client = GraphQueryClient::from_settings(&http_only(&base_url)).unwrap();
    assert!(!client.has_primary());

    let req = QueryRequest::keyword(RelationshipKeyword::Drives).with_limit(10);
    let records = client.execute(&req, &creds()).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["source"]["name"], "Dan");
    assert_eq!(records[1]["source"]["name"], "Ann");
    assert_eq!(records[2]["target"], Value::Null);

    let requests = stub.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Basic bmVvNGo6c2VjcmV0"));
    assert_eq!(
        body,
        &json!({"statements": [{
            "statement": template(RelationshipKeyword::Drives),
            "parameters": {"__limit": 10}
        }]})
    );
}

#[tokio::test]
async fn test_raw_query_params_are_forwarded() {
    let (base_url, stub) = start_stub(
        StatusCode::OK,
        json!({"results": [{"columns": ["model"], "data": [{"row": ["V70"]}]}], "errors": []}),
    )
    .await;
    let client = GraphQueryClient::from_settings(&http_only(&base_url)).unwrap();

    let req = QueryRequest::new("MATCH (c:Car {brand: $brand}) RETURN c.model AS model")
        .with_param("brand", "Volvo")
        .with_limit(3);
    let records = client.execute(&req, &creds()).await.unwrap();
    assert_eq!(records[0]["model"], "V70");

    let requests = stub.requests.lock().unwrap();
    let statement = &requests[0].1["statements"][0];
    assert_eq!(
        statement["statement"],
        "MATCH (c:Car {brand: $brand}) RETURN c.model AS model LIMIT $__limit"
    );
    assert_eq!(statement["parameters"], json!({"brand": "Volvo", "__limit": 3}));
}

#[tokio::test]
async fn test_database_errors_surface_as_http_transport_error() {
    let (base_url, _stub) = start_stub(
        StatusCode::OK,
        json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Security.Unauthorized", "message": "bad credentials"}]
        }),
    )
    .await;
    let client = GraphQueryClient::from_settings(&http_only(&base_url)).unwrap();

    let err = client
        .execute(&QueryRequest::keyword(RelationshipKeyword::Owns), &creds())
        .await
        .unwrap_err();

    match err {
        GraphError::Transport {
            transport: TransportKind::Http,
            source: TransportFailure::Database { code, .. },
        } => assert_eq!(code, "Neo.ClientError.Security.Unauthorized"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (base_url, _stub) = start_stub(StatusCode::UNAUTHORIZED, json!({"errors": []})).await;
    let client = GraphQueryClient::from_settings(&http_only(&base_url)).unwrap();

    let err = client
        .execute(&QueryRequest::keyword(RelationshipKeyword::Owns), &creds())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GraphError::Transport {
            source: TransportFailure::Status { status: 401, .. },
            ..
        }
    ));
}

#[cfg(feature = "bolt")]
#[tokio::test]
async fn test_unreachable_bolt_falls_back_to_http() {
    let (base_url, stub) = start_stub(StatusCode::OK, drives_body()).await;
    let settings = Settings {
        bolt_uri: "bolt://127.0.0.1:1".to_string(),
        bolt_enabled: true,
        ..http_only(&base_url)
    };
    let client = GraphQueryClient::from_settings(&settings).unwrap();
    assert!(client.has_primary());

    let records = client
        .execute(&QueryRequest::keyword(RelationshipKeyword::Drives), &creds())
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(stub.requests.lock().unwrap().len(), 1);
}
