//! End-to-end tests against the HTTP router with in-memory backends.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;
use uuid::Uuid;

use shipcheck::api::{create_router, AppState};
use shipcheck::domain::{RestrictedItem, RuleBook, Severity};
use shipcheck::engine::BatchRunner;
use shipcheck::narrative::{NarrativeError, NarrativeModel, NarrativeService, RetryPolicy};
use shipcheck::observability::MetricsRegistry;
use shipcheck::policy::{RulebookLoader, RulebookWatcher};
use shipcheck::storage::{FileStore, MemoryStore, RuleStore};

/// Model stub answering from a queue.
struct QueuedModel {
    replies: Mutex<VecDeque<String>>,
}

impl QueuedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(QueuedModel {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl NarrativeModel for QueuedModel {
    fn name(&self) -> &str {
        "queued"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, NarrativeError> {
        self.replies
            .lock()
            .pop_front()
            .ok_or(NarrativeError::EmptyResponse)
    }
}

fn app(store: Arc<dyn RuleStore>, model: Option<Arc<QueuedModel>>) -> Router {
    let narrative = model.map(|m| {
        Arc::new(NarrativeService::new(
            m,
            RetryPolicy::new(2, Duration::from_millis(1)),
        ))
    });

    create_router(Arc::new(AppState {
        store,
        narrative,
        batch: BatchRunner::new(4),
        metrics: Arc::new(MetricsRegistry::new()),
        start_time: Instant::now(),
        version: "test".to_string(),
        request_timeout: Duration::from_secs(5),
    }))
}

async fn call(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn sanctioned_store() -> Arc<MemoryStore> {
    let mut book = RuleBook::empty();
    book.restricted_items.push(RestrictedItem {
        id: Uuid::new_v4(),
        item_name: "night vision".to_string(),
        severity: Severity::Restricted,
        category: "Dual use".to_string(),
        description: "Export licence required for shipments to Russia".to_string(),
        requirements: Some("EAR licence".to_string()),
        source_link: None,
        effective_date: None,
    });
    Arc::new(MemoryStore::from_rulebook(book))
}

const RULEBOOK: &str = r#"
version: "2025.03"
rules:
  - rule_type: VALUE
    rule_conditions:
      threshold: 2500
      documentation_required: ["Commercial Invoice", "Export Declaration"]
  - rule_type: TARIFF
    product_name: Steel
    rule_conditions:
      to_countries: ["US"]
      tariff_rate: "25%"
restricted_countries:
  - country_code: KP
    country_name: North Korea
    restriction_level: EMBARGO
restricted_items:
  - item_name: ivory
    severity: PROHIBITED
    category: Wildlife
    description: CITES Appendix I
"#;

#[tokio::test]
async fn rulebook_file_drives_evaluation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RULEBOOK.as_bytes()).unwrap();

    let watcher = RulebookWatcher::new(
        RulebookLoader::new(file.path()),
        Duration::from_secs(60),
    );
    let (rx, handle) = watcher.start().unwrap();
    let store: Arc<dyn RuleStore> = Arc::new(FileStore::new(rx));

    let (status, body) = call(
        app(Arc::clone(&store), None),
        "POST",
        "/v1/compliance/check-bulk",
        json!({
            "shipments": [
                { "item_name": "Carved Ivory", "destination_country": "US" },
                { "item_name": "Rolled Steel", "destination_country": "us", "declared_value": "100" },
                { "item_name": "Books", "destination_country": "KP" },
                { "item_name": "Watch", "destination_country": "FR", "declared_value": 3000 }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["REJECTED", "REVIEW", "FLAGGED", "REVIEW"]);
    assert_eq!(body[1]["issues"][0]["rule_name"], "TARIFF on Steel");

    let (status, body) = call(
        app(store, None),
        "POST",
        "/v1/rules",
        json!({ "rule_type": "WEIGHT", "rule_conditions": { "max_weight": 5 } }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORE_ERROR");

    handle.abort();
}

#[tokio::test]
async fn document_generation_records_audit_entry() {
    let store = sanctioned_store();
    let model = QueuedModel::new(&["```html\n<h1>Commercial Invoice</h1>\n```"]);

    let (status, body) = call(
        app(store.clone(), Some(model)),
        "POST",
        "/v1/documentation/generate",
        json!({
            "products": ["Night Vision"],
            "fromCountry": "US",
            "toCountry": "Russia",
            "documentType": "commercial-invoice"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["document"], "<h1>Commercial Invoice</h1>");
    assert_eq!(body["documentType"], "commercial-invoice");
    assert_eq!(body["restrictions"].as_array().unwrap().len(), 1);
    assert!(body["disclaimer"].as_str().unwrap().contains("AI-generated"));

    let records = store.recorded_documents();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_country, "Russia");
    assert_eq!(records[0].restrictions_applied.len(), 1);
}

#[tokio::test]
async fn unsupported_document_type_is_rejected() {
    let model = QueuedModel::new(&[]);

    let (status, body) = call(
        app(sanctioned_store(), Some(model)),
        "POST",
        "/v1/documentation/generate",
        json!({
            "products": ["Tea"],
            "fromCountry": "IN",
            "toCountry": "GB",
            "documentType": "bill-of-lading"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported document type");
}

#[tokio::test]
async fn research_is_cached_and_summarized() {
    let store = sanctioned_store();
    let model = QueuedModel::new(&[
        r#"Here you go: {"results": [{"title": "Steel tariffs", "content": "25% on imports", "source": "USTR"}]}"#,
        "Steel imports face a 25% tariff.",
    ]);

    let (status, body) = call(
        app(store.clone(), Some(model)),
        "POST",
        "/v1/research",
        json!({ "query": "steel tariffs", "includeSummary": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["title"], "Steel tariffs");
    assert_eq!(body["summary"], "Steel imports face a 25% tariff.");

    let cached = store.cached_research();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].query, "steel tariffs");
}

#[tokio::test]
async fn research_without_query_is_bad_request() {
    let model = QueuedModel::new(&[]);

    let (status, _) = call(
        app(sanctioned_store(), Some(model)),
        "POST",
        "/v1/research",
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assessment_falls_back_to_warning() {
    let model = QueuedModel::new(&["not json", "still not json"]);

    let (status, body) = call(
        app(sanctioned_store(), Some(model)),
        "POST",
        "/v1/restricted-items/assess",
        json!({ "itemName": "Drone" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "WARNING");
    assert_eq!(body["item"], "Drone");
    assert!(body.get("restricted_item").is_none());
}
