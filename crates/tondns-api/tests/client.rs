//! `ToncenterClient` against a local HTTP server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tondns_api::client::API_KEY_HEADER;
use tondns_api::{ApiConfig, ApiError, ReadApi, ToncenterClient};
use tondns_ops::COLLECTION_CODE_HASH;

/// What the server saw, in request order.
#[derive(Debug, Default)]
struct Seen {
    queries: Vec<HashMap<String, String>>,
    api_keys: Vec<Option<String>>,
    bodies: Vec<Value>,
    rate_limited: u32,
}

type Shared = Arc<Mutex<Seen>>;

fn api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn record(seen: &Shared, headers: &HeaderMap, query: HashMap<String, String>) {
    let mut seen = seen.lock().unwrap();
    seen.api_keys.push(api_key(headers));
    seen.queries.push(query);
}

async fn nft_items(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record(&seen, &headers, query);
    Json(json!({
        "nft_items": [{
            "address": "0:AA",
            "owner_address": "0:BB",
            "content": { "domain": "example.ton" }
        }],
        "metadata": {}
    }))
}

async fn nft_collections(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record(&seen, &headers, query);
    Json(json!({
        "nft_collections": [{
            "address": "0:CC",
            "owner_address": "0:BB",
            "collection_content": { "name": "Example DNS Domains" }
        }],
        "metadata": {}
    }))
}

async fn account_states(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record(&seen, &headers, query);
    Json(json!({ "accounts": [{ "address": "0:CC", "code_hash": COLLECTION_CODE_HASH }] }))
}

async fn run_get_method(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let exit_code = if body["method"] == "dnsresolve" { 2 } else { 11 };
    {
        let mut seen = seen.lock().unwrap();
        seen.api_keys.push(api_key(&headers));
        seen.bodies.push(body);
    }
    Json(json!({ "gas_used": 100, "exit_code": exit_code, "stack": [] }))
}

async fn too_many_requests(State(seen): State<Shared>) -> StatusCode {
    seen.lock().unwrap().rate_limited += 1;
    StatusCode::TOO_MANY_REQUESTS
}

async fn internal_error() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Start the server. Each prefix behaves differently: `ok` answers, `limited`
/// always rate limits and `broken` always fails.
async fn serve() -> (String, Shared) {
    let seen = Shared::default();
    let app = Router::new()
        .route("/ok/nft/items", get(nft_items))
        .route("/ok/nft/collections", get(nft_collections))
        .route("/ok/accountStates", get(account_states))
        .route("/ok/runGetMethod", post(run_get_method))
        .route("/limited/nft/items", get(too_many_requests))
        .route("/broken/nft/items", get(internal_error))
        .route("/broken/runGetMethod", post(internal_error))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn config(base: &str, prefix: &str) -> ApiConfig {
    ApiConfig::default()
        .with_base_url(format!("{}/{}", base, prefix))
        .with_retry_backoff(Duration::ZERO)
}

#[tokio::test]
async fn test_lookup_queries_and_api_key() {
    let (base, seen) = serve().await;
    let client = ToncenterClient::new(config(&base, "ok").with_api_key("secret")).unwrap();

    let item = client.nft_item("0:AA").await.unwrap().unwrap();
    assert_eq!(item.title, "example.ton");
    assert_eq!(item.owner_address, "0:BB");

    let domain = client.nft_domain_item("0:AA", "0:DD").await.unwrap().unwrap();
    assert_eq!(domain.title, "example");

    let collection = client.nft_collection("0:CC").await.unwrap().unwrap();
    assert_eq!(collection.title, "Example DNS Domains");

    let code_hash = client.code_hash("0:CC").await.unwrap();
    assert_eq!(code_hash.as_deref(), Some(COLLECTION_CODE_HASH));

    let seen = seen.lock().unwrap();
    let param = |request: usize, name: &str| seen.queries[request].get(name).map(String::as_str);

    assert_eq!(param(0, "address"), Some("0:AA"));
    assert_eq!(param(0, "limit"), Some("1"));
    assert_eq!(param(0, "offset"), Some("0"));
    assert_eq!(param(0, "collection_address"), None);

    assert_eq!(param(1, "address"), Some("0:AA"));
    assert_eq!(param(1, "collection_address"), Some("0:DD"));

    assert_eq!(param(2, "collection_address"), Some("0:CC"));
    assert_eq!(param(2, "address"), None);

    assert_eq!(param(3, "address"), Some("0:CC"));
    assert_eq!(param(3, "include_boc"), Some("false"));

    assert_eq!(seen.api_keys.len(), 4);
    assert!(seen.api_keys.iter().all(|key| key.as_deref() == Some("secret")));
}

#[tokio::test]
async fn test_no_api_key_header_by_default() {
    let (base, seen) = serve().await;
    let client = ToncenterClient::new(config(&base, "ok")).unwrap();

    client.nft_item("0:AA").await.unwrap();
    client.run_get_method("0:CC", "dnsresolve", Vec::new()).await.unwrap();

    assert_eq!(seen.lock().unwrap().api_keys, vec![None, None]);
}

#[tokio::test]
async fn test_run_get_method_body_and_exit_codes() {
    let (base, seen) = serve().await;
    let client = ToncenterClient::new(config(&base, "ok")).unwrap();

    let result = client.run_get_method("0:CC", "dnsresolve", Vec::new()).await.unwrap();
    assert!(result.available);
    assert_eq!(result.exit_code, Some(2));

    let result = client
        .run_get_method("0:CC", "get_collection_data", Vec::new())
        .await
        .unwrap();
    assert!(!result.available);
    assert_eq!(result.exit_code, Some(11));

    assert_eq!(
        seen.lock().unwrap().bodies[0],
        json!({ "address": "0:CC", "method": "dnsresolve", "stack": [] })
    );
}

#[tokio::test]
async fn test_rate_limit_retries_then_gives_up() {
    let (base, seen) = serve().await;
    let client = ToncenterClient::new(config(&base, "limited").with_max_retries(3)).unwrap();

    let err = client.nft_item("0:AA").await.unwrap_err();
    assert!(matches!(err, ApiError::RetriesExhausted { attempts: 3 }));
    assert_eq!(seen.lock().unwrap().rate_limited, 3);
}

#[tokio::test]
async fn test_error_status() {
    let (base, _seen) = serve().await;
    let client = ToncenterClient::new(config(&base, "broken")).unwrap();

    match client.nft_item("0:AA").await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // An error status from runGetMethod means the method cannot be called.
    let result = client.run_get_method("0:CC", "dnsresolve", Vec::new()).await.unwrap();
    assert!(!result.available);
    assert_eq!(result.exit_code, None);
}
