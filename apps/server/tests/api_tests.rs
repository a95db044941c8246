use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use xref_core::downstream::SnapshotProvider;
use xref_core::errors::{Error, Result};
use xref_core::store::MemoryStore;
use xref_core::{IdentifierType, SymbolRecord};
use xref_server::{api::app_router, build_state_with, config::Config, Resilience};
use xref_source::{CircuitBreakerConfig, RateLimitConfig};

/// Downstream returning a replaceable snapshot, or unavailable when `None`.
struct MockDownstream {
    snapshot: Mutex<Option<Vec<SymbolRecord>>>,
}

#[async_trait]
impl SnapshotProvider for MockDownstream {
    async fn fetch_snapshot(&self) -> Result<Vec<SymbolRecord>> {
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Unavailable("Circuit open: DOWNSTREAM".to_string()))
    }
}

fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        redis_url: "redis://unused".to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(5),
        downstream_endpoint: "http://unused".to_string(),
        downstream_timeout: Duration::from_secs(5),
        refresh_interval: Duration::from_secs(3600),
        refresh_initial_delay: Duration::from_secs(3600),
        lookup_rate: RateLimitConfig::per_minute(60_000, 1_000),
        downstream_rate: RateLimitConfig::per_minute(60_000, 1_000),
        circuit: CircuitBreakerConfig::default(),
        log_format: "text".to_string(),
    }
}

fn build_router(
    snapshot: Option<Vec<SymbolRecord>>,
) -> (Router, Arc<MemoryStore>) {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let downstream = Arc::new(MockDownstream {
        snapshot: Mutex::new(snapshot),
    });
    let state = build_state_with(store.clone(), downstream, Resilience::from_config(&config));
    (app_router(state, &config), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn apple() -> SymbolRecord {
    SymbolRecord::new("SYM-1")
        .with_identifier(IdentifierType::Isin, "US0378331005")
        .with_identifier(IdentifierType::Ticker, "AAPL")
        .with_name("Apple Inc")
}

#[tokio::test]
async fn add_then_lookup_symbol() {
    let (app, _store) = build_router(Some(Vec::new()));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/xref/symbol",
        Some(json!({"symbolId": "SYM-1", "ticker": "AAPL", "name": "Apple Inc"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Symbol added successfully");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/xref/lookup?idType=TICKER&idValue=aapl",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], "true");
    assert_eq!(body["symbolId"], "SYM-1");
    assert_eq!(body["name"], "Apple Inc");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/xref/lookup?idType=isin&idValue=XX0000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], "false");
    assert_eq!(body["error"], "Symbol not found");
}

#[tokio::test]
async fn invalid_identifier_type_is_bad_request() {
    let (app, _store) = build_router(Some(Vec::new()));

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/xref/lookup?idType=figi&idValue=X",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn store_outage_answers_degraded_lookup() {
    let (app, store) = build_router(Some(Vec::new()));
    store.set_unavailable(true);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/xref/lookup?idType=ticker&idValue=AAPL",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], "false");
    assert_eq!(body["error"], "Service temporarily unavailable");
    assert!(body["reason"].is_string());
}

#[tokio::test]
async fn update_and_delete_symbol() {
    let (app, store) = build_router(Some(Vec::new()));
    send(
        &app,
        Method::POST,
        "/api/xref/symbol",
        Some(serde_json::to_value(apple()).unwrap()),
    )
    .await;

    let renamed = apple().with_identifier(IdentifierType::Ticker, "AAPL.O");
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/xref/symbol",
        Some(json!({"oldSymbol": apple(), "newSymbol": renamed})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/xref/lookup?idType=ticker&idValue=AAPL",
        None,
    )
    .await;
    assert_eq!(body["found"], "false");

    let (status, _) = send(&app, Method::DELETE, "/api/xref/symbol/SYM-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.is_empty());

    let (status, _) = send(&app, Method::DELETE, "/api/xref/symbol/SYM-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_lookup_answers_each_entry() {
    let (app, _store) = build_router(Some(Vec::new()));
    send(
        &app,
        Method::POST,
        "/api/xref/symbol",
        Some(serde_json::to_value(apple()).unwrap()),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/xref/lookup/batch",
        Some(json!([
            {"idType": "isin", "idValue": "us0378331005"},
            {"idType": "ticker", "idValue": ""},
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["found"], "true");
    assert_eq!(body[1]["found"], "false");
}

#[tokio::test]
async fn refresh_reports_counters() {
    let (app, _store) = build_router(Some(vec![apple()]));

    let (status, body) = send(&app, Method::POST, "/api/xref/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], 1);
    assert_eq!(body["updated"], 0);
    assert_eq!(body["deleted"], 0);
    assert_eq!(body["errors"], 0);
}

#[tokio::test]
async fn refresh_with_unavailable_downstream_keeps_store() {
    let (app, store) = build_router(None);
    send(
        &app,
        Method::POST,
        "/api/xref/symbol",
        Some(serde_json::to_value(apple()).unwrap()),
    )
    .await;

    let (status, body) = send(&app, Method::POST, "/api/xref/refresh", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["status"].as_str().unwrap().starts_with("Failed: "));
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn health_is_ok_with_closed_circuits() {
    let (app, _store) = build_router(Some(Vec::new()));

    let (status, body) = send(&app, Method::GET, "/api/xref/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["circuits"].as_array().map(Vec::len), Some(2));
}
