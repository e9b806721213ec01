//! Integration tests for the pagination driver

use async_trait::async_trait;
use cpq_bridge::adapters::cpq::{
    ApiPath, HttpRequest, HttpResponse, PageRequest, Paginator, QueryParams, RequestExecutor,
    Transport,
};
use cpq_bridge::config::{secret_string, CpqConfig, PaginationConfig};
use cpq_bridge::domain::ApiError;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Serves `total` records page by page from the `page`/`pageSize` query
struct PagedCatalog {
    total: usize,
    wrap_in: Option<&'static str>,
    fail_on_page: Option<usize>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl PagedCatalog {
    fn new(total: usize) -> Arc<Self> {
        Arc::new(Self {
            total,
            wrap_in: None,
            fail_on_page: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn pages_requested(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| query_value(r, "page").unwrap_or_default())
            .collect()
    }
}

fn query_value(request: &HttpRequest, key: &str) -> Option<String> {
    request
        .query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

#[async_trait]
impl Transport for PagedCatalog {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.lock().unwrap().push(request.clone());

        let page: usize = query_value(request, "page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let size: usize = query_value(request, "pageSize")
            .and_then(|p| p.parse().ok())
            .unwrap_or(50);

        if self.fail_on_page == Some(page) {
            return Ok(HttpResponse::new(400, r#"{"message":"Invalid page"}"#));
        }

        let start = (page - 1) * size;
        let end = (start + size).min(self.total);
        let records: Vec<Value> = (start.min(end)..end).map(|i| json!({ "id": i })).collect();

        let body = match self.wrap_in {
            Some(property) => {
                let mut wrapper = serde_json::Map::new();
                wrapper.insert(property.to_string(), Value::Array(records));
                wrapper.insert("count".to_string(), json!(self.total));
                Value::Object(wrapper)
            }
            None => Value::Array(records),
        };
        Ok(HttpResponse::new(200, body.to_string()))
    }
}

fn executor(transport: Arc<PagedCatalog>) -> RequestExecutor {
    let config = CpqConfig {
        access_key: "AK".to_string(),
        public_key: "PK".to_string(),
        private_key: secret_string("PV".to_string()),
        ..CpqConfig::default()
    };
    RequestExecutor::new(&config, transport).unwrap()
}

fn ids(records: &[Value]) -> Vec<u64> {
    records.iter().filter_map(|r| r["id"].as_u64()).collect()
}

#[tokio::test]
async fn test_limit_truncates_final_page() {
    let catalog = PagedCatalog::new(500);
    let executor = executor(catalog.clone());
    let paginator = Paginator::new(&executor, &PaginationConfig::default());

    let request = PageRequest::get(ApiPath::new("/api/quotes"))
        .with_page_size(50)
        .with_limit(Some(120));
    let records = paginator.fetch_all(&request).await.unwrap();

    assert_eq!(records.len(), 120);
    assert_eq!(ids(&records), (0..120).collect::<Vec<u64>>());
    assert_eq!(catalog.pages_requested(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_short_page_ends_iteration() {
    let catalog = PagedCatalog::new(75);
    let executor = executor(catalog.clone());
    let paginator = Paginator::new(&executor, &PaginationConfig::default());

    let request = PageRequest::get(ApiPath::new("/api/quoteItems")).with_page_size(50);
    let records = paginator.fetch_all(&request).await.unwrap();

    assert_eq!(records.len(), 75);
    assert_eq!(catalog.pages_requested(), vec!["1", "2"]);
}

#[tokio::test]
async fn test_exact_multiple_needs_one_empty_page() {
    let catalog = PagedCatalog::new(100);
    let executor = executor(catalog.clone());
    let paginator = Paginator::new(&executor, &PaginationConfig::default());

    let request = PageRequest::get(ApiPath::new("/api/quoteItems")).with_page_size(50);
    let records = paginator.fetch_all(&request).await.unwrap();

    assert_eq!(records.len(), 100);
    assert_eq!(catalog.pages_requested(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_zero_limit_sends_nothing() {
    let catalog = PagedCatalog::new(500);
    let executor = executor(catalog.clone());
    let paginator = Paginator::new(&executor, &PaginationConfig::default());

    let request = PageRequest::get(ApiPath::new("/api/quotes")).with_limit(Some(0));
    let records = paginator.fetch_all(&request).await.unwrap();

    assert!(records.is_empty());
    assert!(catalog.requests().is_empty());
}

#[tokio::test]
async fn test_max_pages_guard_returns_partial_results() {
    let catalog = PagedCatalog::new(10_000);
    let executor = executor(catalog.clone());
    let guard = PaginationConfig {
        max_pages: Some(2),
        ..PaginationConfig::default()
    };
    let paginator = Paginator::new(&executor, &guard);

    let request = PageRequest::get(ApiPath::new("/api/quotes")).with_page_size(100);
    let records = paginator.fetch_all(&request).await.unwrap();

    assert_eq!(records.len(), 200);
    assert_eq!(catalog.pages_requested(), vec!["1", "2"]);
}

#[tokio::test]
async fn test_page_size_is_clamped_and_query_preserved() {
    let catalog = PagedCatalog::new(3);
    let executor = executor(catalog.clone());
    let paginator = Paginator::new(&executor, &PaginationConfig::default());

    let request = PageRequest::get(ApiPath::new("/api/quotes"))
        .with_query(QueryParams::new().with("conditions", "expired = False"))
        .with_page_size(5000);
    paginator.fetch_all(&request).await.unwrap();

    let requests = catalog.requests();
    let sent = &requests[0];
    assert_eq!(query_value(sent, "conditions").as_deref(), Some("expired = False"));
    assert_eq!(query_value(sent, "pageSize").as_deref(), Some("1000"));
}

#[tokio::test]
async fn test_extractor_reads_wrapped_records() {
    let catalog = Arc::new(PagedCatalog {
        total: 60,
        wrap_in: Some("items"),
        fail_on_page: None,
        seen: Mutex::new(Vec::new()),
    });
    let executor = executor(catalog.clone());
    let paginator = Paginator::new(&executor, &PaginationConfig::default());

    let request = PageRequest::get(ApiPath::new("/api/quotes"))
        .with_page_size(50)
        .with_extractor("items");
    let records = paginator.fetch_all(&request).await.unwrap();

    assert_eq!(records.len(), 60);
    assert_eq!(catalog.pages_requested(), vec!["1", "2"]);
}

#[tokio::test]
async fn test_failed_page_discards_accumulated_records() {
    let catalog = Arc::new(PagedCatalog {
        total: 500,
        wrap_in: None,
        fail_on_page: Some(2),
        seen: Mutex::new(Vec::new()),
    });
    let executor = executor(catalog.clone());
    let paginator = Paginator::new(&executor, &PaginationConfig::default());

    let request = PageRequest::get(ApiPath::new("/api/quotes")).with_page_size(50);
    let err = paginator.fetch_all(&request).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(catalog.pages_requested(), vec!["1", "2"]);
}

/// Always answers with a full page after a fixed delay
struct SlowEndlessCatalog {
    delay: std::time::Duration,
    calls: Mutex<u32>,
}

#[async_trait]
impl Transport for SlowEndlessCatalog {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        tokio::time::sleep(self.delay).await;
        *self.calls.lock().unwrap() += 1;

        let size: usize = query_value(request, "pageSize")
            .and_then(|p| p.parse().ok())
            .unwrap_or(50);
        let records: Vec<Value> = (0..size).map(|i| json!({ "id": i })).collect();
        Ok(HttpResponse::new(200, Value::Array(records).to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_max_duration_guard_returns_partial_results() {
    let transport = Arc::new(SlowEndlessCatalog {
        delay: std::time::Duration::from_millis(600),
        calls: Mutex::new(0),
    });
    let config = CpqConfig {
        access_key: "AK".to_string(),
        public_key: "PK".to_string(),
        private_key: secret_string("PV".to_string()),
        ..CpqConfig::default()
    };
    let executor = RequestExecutor::new(&config, transport.clone()).unwrap();
    let guard = PaginationConfig {
        max_duration_seconds: Some(1),
        ..PaginationConfig::default()
    };
    let paginator = Paginator::new(&executor, &guard);

    let request = PageRequest::get(ApiPath::new("/api/quotes")).with_page_size(2);
    let records = paginator.fetch_all(&request).await.unwrap();

    // 600ms after the first page, 1200ms after the second
    assert_eq!(*transport.calls.lock().unwrap(), 2);
    assert_eq!(records.len(), 4);
}
