//! CPQ client
//!
//! High-level entry point: turns an [`Operation`] into one or more executor
//! calls and shapes the responses into records.

use super::executor::{ApiPath, QueryParams, RequestExecutor};
use super::operations::{Operation, Plan};
use super::pagination::{extract_items, PageRequest, Paginator};
use super::transport::{HttpMethod, ReqwestTransport, Transport};
use crate::config::{CpqConfig, PaginationConfig};
use crate::domain::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Batch execution settings
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Replace a failed invocation with an `{ "error": ... }` record
    pub continue_on_fail: bool,
    /// Invocations in flight at once (at least 1)
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            continue_on_fail: false,
            concurrency: 1,
        }
    }
}

/// One output record, paired with the index of the invocation that made it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    pub item: usize,
    pub json: Value,
}

/// Outcome of a successful credential check
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub base_url: String,
    pub checked_at: DateTime<Utc>,
    pub latency_ms: u64,
}

/// Client for one CPQ tenant
///
/// Holds no per-call state; a single instance serves concurrent
/// invocations.
pub struct CpqClient {
    executor: RequestExecutor,
    pagination: PaginationConfig,
}

impl CpqClient {
    /// Create a client backed by reqwest
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cpq_bridge::adapters::cpq::{CpqClient, Operation};
    /// use cpq_bridge::config::load_config;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = load_config("cpq-bridge.toml")?;
    /// let client = CpqClient::new(&config.cpq)?;
    ///
    /// let operation: Operation = serde_json::from_str(
    ///     r#"{"resource":"quotes","operation":"getAll","limit":10}"#,
    /// )?;
    /// for record in client.invoke(&operation).await? {
    ///     println!("{record}");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &CpqConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_seconds))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: &CpqConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            executor: RequestExecutor::new(config, transport)?,
            pagination: config.pagination.clone(),
        })
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url().as_str()
    }

    /// Run one operation and return its records
    ///
    /// # Errors
    ///
    /// Validation errors are raised before any request is sent; API errors
    /// carry the failing call's status and body.
    pub async fn invoke(&self, operation: &Operation) -> Result<Vec<Value>> {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "invoke",
            invocation_id = %invocation_id,
            operation = %operation
        );

        async {
            let started = Instant::now();
            let plan = operation.plan(&self.pagination)?;
            let records = self.execute_plan(plan).await?;

            tracing::debug!(
                records = records.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Invocation complete"
            );
            Ok(records)
        }
        .instrument(span)
        .await
    }

    async fn execute_plan(&self, plan: Plan) -> Result<Vec<Value>> {
        let no_query = QueryParams::new();

        match plan {
            Plan::Single { method, path, body } => {
                let value = self
                    .executor
                    .execute(method, &path, body.as_ref(), &no_query)
                    .await?;
                Ok(vec![value])
            }
            Plan::List(request) => self.fetch_all(&request).await,
            Plan::Unpaginated { method, path } => {
                let value = self.executor.execute(method, &path, None, &no_query).await?;
                Ok(match value {
                    Value::Array(items) => items,
                    other => vec![other],
                })
            }
            Plan::Delete { path, id } => {
                self.executor
                    .execute(HttpMethod::Delete, &path, None, &no_query)
                    .await?;
                Ok(vec![json!({ "id": id.as_str(), "success": true })])
            }
        }
    }

    /// Walk a list endpoint using the configured pagination guards
    pub async fn fetch_all(&self, request: &PageRequest) -> Result<Vec<Value>> {
        Paginator::new(&self.executor, &self.pagination)
            .fetch_all(request)
            .await
    }

    /// Verify credentials with the smallest possible quotes page
    ///
    /// # Errors
    ///
    /// Returns the wrapped API failure when the request is rejected or the
    /// server cannot be reached.
    pub async fn health_check(&self) -> Result<HealthReport> {
        let started = Instant::now();
        let query = QueryParams::new().with("page", 1).with("pageSize", 1);

        match self
            .executor
            .execute(HttpMethod::Get, &ApiPath::new("/api/quotes"), None, &query)
            .await
        {
            Ok(response) => {
                let report = HealthReport {
                    base_url: self.base_url().to_string(),
                    checked_at: Utc::now(),
                    latency_ms: started.elapsed().as_millis() as u64,
                };
                tracing::info!(
                    base_url = %report.base_url,
                    latency_ms = report.latency_ms,
                    sample = extract_items(response, None).len(),
                    "CPQ credential check passed"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(
                    base_url = %self.base_url(),
                    error = %e,
                    "CPQ credential check failed"
                );
                Err(e)
            }
        }
    }

    /// Run independent invocations, keeping output in input order
    ///
    /// Without `continue_on_fail` the first failure (in input order) aborts
    /// the batch and in-flight invocations are dropped.
    pub async fn run_batch(
        &self,
        operations: &[Operation],
        options: &BatchOptions,
    ) -> Result<Vec<BatchRecord>> {
        let entries = operations.iter().cloned().map(Ok).collect();
        self.run_entries(entries, options).await
    }

    /// Like [`CpqClient::run_batch`], for entries that may have failed to
    /// parse
    ///
    /// A failed entry is handled exactly like a failed invocation: it aborts
    /// the batch, or becomes an `{ "error": ... }` record with
    /// `continue_on_fail`.
    pub async fn run_entries(
        &self,
        entries: Vec<Result<Operation>>,
        options: &BatchOptions,
    ) -> Result<Vec<BatchRecord>> {
        let invocations = entries.len();
        let concurrency = options.concurrency.max(1);
        let mut results = stream::iter(entries.into_iter().enumerate())
            .map(|(item, entry)| async move {
                let result = match entry {
                    Ok(operation) => self.invoke(&operation).await,
                    Err(e) => Err(e),
                };
                (item, result)
            })
            .buffered(concurrency);

        let mut records = Vec::new();
        let mut failed = 0usize;

        while let Some((item, result)) = results.next().await {
            match result {
                Ok(values) => {
                    records.extend(values.into_iter().map(|json| BatchRecord { item, json }));
                }
                Err(e) if options.continue_on_fail => {
                    failed += 1;
                    tracing::warn!(item = item, error = %e, "Invocation failed, continuing");
                    records.push(BatchRecord {
                        item,
                        json: json!({ "error": e.to_string() }),
                    });
                }
                Err(e) => {
                    tracing::error!(item = item, error = %e, "Invocation failed, aborting batch");
                    return Err(e);
                }
            }
        }

        tracing::info!(
            invocations = invocations,
            failed = failed,
            records = records.len(),
            "Batch complete"
        );
        Ok(records)
    }
}
