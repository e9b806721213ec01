//! Pagination driver
//!
//! Walks a list endpoint with a 1-based `page` cursor until the API returns a
//! short page, the caller's limit is reached, or a configured guard trips.
//! The result is fully materialised; a failed page discards everything
//! accumulated by that call.

use super::executor::{ApiPath, QueryParams, RequestExecutor};
use super::transport::HttpMethod;
use crate::config::{PaginationConfig, MAX_PAGE_SIZE};
use crate::domain::Result;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// One paginated list call
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub method: HttpMethod,
    pub path: ApiPath,
    pub body: Option<Value>,
    pub query: QueryParams,
    /// Property holding the records when the API wraps them in an object
    pub extractor: Option<String>,
    /// Maximum number of records to return
    pub limit: Option<usize>,
    pub page_size: usize,
}

impl PageRequest {
    /// GET request with the default page size of 50 and no limit
    pub fn get(path: ApiPath) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
            body: None,
            query: QueryParams::new(),
            extractor: None,
            limit: None,
            page_size: 50,
        }
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_extractor(mut self, property: impl Into<String>) -> Self {
        self.extractor = Some(property.into());
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Clamp a requested page size into the API's accepted range
pub fn clamp_page_size(page_size: usize) -> usize {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

/// Drives [`RequestExecutor`] across pages
pub struct Paginator<'a> {
    executor: &'a RequestExecutor,
    max_pages: Option<u32>,
    max_duration: Option<Duration>,
}

impl<'a> Paginator<'a> {
    pub fn new(executor: &'a RequestExecutor, config: &PaginationConfig) -> Self {
        Self {
            executor,
            max_pages: config.max_pages,
            max_duration: config.max_duration_seconds.map(Duration::from_secs),
        }
    }

    /// Fetch every page and return the accumulated records
    ///
    /// # Errors
    ///
    /// Propagates the first failed page; records fetched before it are dropped.
    pub async fn fetch_all(&self, request: &PageRequest) -> Result<Vec<Value>> {
        let page_size = clamp_page_size(request.page_size);
        let mut records: Vec<Value> = Vec::new();

        if request.limit == Some(0) {
            return Ok(records);
        }

        let started = Instant::now();
        let mut page: u32 = 1;

        loop {
            let mut query = request.query.clone();
            query.set("page", page);
            query.set("pageSize", page_size);

            let response = self
                .executor
                .execute(request.method, &request.path, request.body.as_ref(), &query)
                .await?;

            let items = extract_items(response, request.extractor.as_deref());
            let returned = items.len();
            records.extend(items);

            tracing::debug!(
                path = %request.path,
                page = page,
                page_size = page_size,
                returned = returned,
                total = records.len(),
                "Fetched page"
            );

            if let Some(limit) = request.limit {
                if records.len() >= limit {
                    records.truncate(limit);
                    break;
                }
            }

            if returned < page_size {
                break;
            }

            if let Some(max_pages) = self.max_pages {
                if page >= max_pages {
                    tracing::warn!(
                        path = %request.path,
                        max_pages = max_pages,
                        total = records.len(),
                        "Stopping pagination: max_pages reached"
                    );
                    break;
                }
            }

            if let Some(max_duration) = self.max_duration {
                if started.elapsed() >= max_duration {
                    tracing::warn!(
                        path = %request.path,
                        max_duration_seconds = max_duration.as_secs(),
                        pages = page,
                        total = records.len(),
                        "Stopping pagination: max_duration_seconds elapsed"
                    );
                    break;
                }
            }

            page += 1;
        }

        Ok(records)
    }
}

/// Pull the record array out of a page response
///
/// With an extractor the named property is used when it holds an array;
/// otherwise a bare array response is used as-is. Anything else is an empty
/// page.
pub fn extract_items(response: Value, extractor: Option<&str>) -> Vec<Value> {
    let mut response = response;

    if let Some(property) = extractor.filter(|p| !p.is_empty()) {
        if let Some(Value::Array(items)) = response.get_mut(property).map(Value::take) {
            return items;
        }
    }

    match response {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
