//! Request executor
//!
//! Issues one authenticated call against the CPQ API, retrying transient
//! failures with exponential backoff. Every call derives its own
//! Authorization header; the executor holds no mutable state, so one instance
//! can serve concurrent invocations.

use super::auth::{Credentials, MASKED_AUTHORIZATION};
use super::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::config::{CpqConfig, DebugConfig, RetryConfig};
use crate::domain::{ApiError, CpqError, RecordId, Result};
use crate::log_retry_attempt;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Content type pinned to the v1.0 API contract
pub const CONTENT_TYPE: &str = "application/json; version=1.0";

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("cpq-bridge/", env!("CARGO_PKG_VERSION"));

/// Target used for request/response debug summaries
pub const HTTP_LOG_TARGET: &str = "cpq_bridge::http";

/// Relative API path made of raw (unencoded) segments
///
/// Segments are percent-encoded when the path is resolved against the base
/// URL, so identifiers containing `/` or spaces stay a single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// Build a path from a literal such as `/api/quotes`
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append one raw segment
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append a record identifier
    pub fn id(self, id: &RecordId) -> Self {
        self.segment(id.as_str())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve against a base URL, keeping any path prefix the base carries
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                CpqError::Configuration(format!("Base URL cannot carry a path: {base}"))
            })?;
            path.pop_if_empty();
            path.extend(self.segments.iter().map(String::as_str));
        }
        Ok(url)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Ordered query string parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`QueryParams::set`]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a parameter, keeping its original position on replace
    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Exponential backoff policy derived from [`RetryConfig`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub retryable_statuses: Vec<u16>,
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt with 0-based index `attempt`
    ///
    /// With the defaults this yields 500ms, 1000ms, 2000ms.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt as i32);
        let delay_ms = (self.initial_delay.as_millis() as f64 * factor) as u64;
        Duration::from_millis(delay_ms).min(self.max_delay)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.backoff_multiplier,
            retryable_statuses: config.retryable_statuses.clone(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Authenticated single-call executor
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    base_url: Url,
    credentials: Credentials,
    retry: RetryPolicy,
    debug: DebugConfig,
}

impl RequestExecutor {
    /// Create an executor for the configured tenant
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not a valid URL.
    pub fn new(config: &CpqConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())?;

        Ok(Self {
            transport,
            base_url,
            credentials: Credentials::from_config(config),
            retry: RetryPolicy::from(&config.retry),
            debug: config.debug.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute one request and decode its JSON body
    ///
    /// Empty bodies decode to `Value::Null`; bodies that are not JSON are
    /// returned as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `CpqError::Api` once a non-retryable failure occurs or the
    /// retry budget is exhausted. The error carries the method, URL, status,
    /// body and number of attempts made.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &ApiPath,
        body: Option<&Value>,
        query: &QueryParams,
    ) -> Result<Value> {
        let url = path.resolve(&self.base_url)?;
        let max_attempts = self.retry.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            let request = self.build_request(method, url.clone(), body, query);
            self.log_request(&request);

            let failure = match self.transport.send(&request).await {
                Ok(response) if response.is_success() => {
                    let value = decode_body(&response.body);
                    self.log_response(&request, &value);
                    return Ok(value);
                }
                Ok(response) => status_error(&request, &response, attempt + 1),
                Err(e) => e,
            };

            self.log_failure(&request, &failure);

            if failure.is_retryable(&self.retry.retryable_statuses) && attempt + 1 < max_attempts {
                let delay = self.retry.delay_for(attempt);
                log_retry_attempt!(attempt + 1, max_attempts, failure.to_string());
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(CpqError::Api(failure));
        }
    }

    fn build_request(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<&Value>,
        query: &QueryParams,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![
                (
                    "Authorization".to_string(),
                    self.credentials.authorization_header(),
                ),
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), USER_AGENT.to_string()),
            ],
            query: query.pairs().to_vec(),
            body: body.cloned(),
        }
    }

    fn log_request(&self, request: &HttpRequest) {
        if !self.debug.enabled {
            return;
        }

        // Opt-in exposure of the credential, kept for troubleshooting auth.
        let authorization = if self.debug.show_auth_token {
            request.header("Authorization").unwrap_or_default()
        } else {
            MASKED_AUTHORIZATION
        };

        tracing::info!(
            target: HTTP_LOG_TARGET,
            method = %request.method,
            url = %request.url,
            query = ?request.query,
            username = %self.credentials.username(),
            authorization = %authorization,
            "CPQ request"
        );
    }

    fn log_response(&self, request: &HttpRequest, value: &Value) {
        if !self.debug.enabled {
            return;
        }

        tracing::info!(
            target: HTTP_LOG_TARGET,
            method = %request.method,
            url = %request.url,
            body_type = body_type(value),
            "CPQ response OK"
        );
    }

    fn log_failure(&self, request: &HttpRequest, failure: &ApiError) {
        if !self.debug.enabled {
            return;
        }

        tracing::info!(
            target: HTTP_LOG_TARGET,
            method = %request.method,
            url = %request.url,
            status = ?failure.status(),
            body = failure.body().unwrap_or_default(),
            error = %failure,
            "CPQ request failed"
        );
    }
}

fn status_error(request: &HttpRequest, response: &HttpResponse, attempts: u32) -> ApiError {
    ApiError::Status {
        method: request.method.to_string(),
        url: request.url.to_string(),
        status: response.status,
        message: error_message(response),
        body: if response.body.is_empty() {
            None
        } else {
            Some(response.body.clone())
        },
        attempts,
    }
}

/// Prefer the API's own `message`, fall back to the status code
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| {
            ["message", "Message", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}

fn decode_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn body_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_delay: Duration::from_millis(1500),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(5), Duration::from_millis(1500));
    }

    #[test]
    fn test_api_path_resolves_and_encodes_segments() {
        let base = Url::parse("https://sellapi.quosalsell.com").unwrap();
        let id = RecordId::new("a b/c").unwrap();
        let url = ApiPath::new("/api/quoteItems").id(&id).resolve(&base).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sellapi.quosalsell.com/api/quoteItems/a%20b%2Fc"
        );
    }

    #[test]
    fn test_api_path_keeps_base_prefix() {
        let base = Url::parse("http://localhost:8080/proxy/").unwrap();
        let url = ApiPath::new("settings/user").resolve(&base).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/settings/user");
    }

    #[test]
    fn test_api_path_display() {
        let path = ApiPath::new("/api/quotes").segment("copyById").segment("42");
        assert_eq!(path.to_string(), "/api/quotes/copyById/42");
    }

    #[test]
    fn test_query_params_set_replaces_in_place() {
        let mut query = QueryParams::new().with("conditions", "a = 1").with("page", 1);
        query.set("page", 2);
        query.set("pageSize", 50);
        assert_eq!(
            query.pairs(),
            &[
                ("conditions".to_string(), "a = 1".to_string()),
                ("page".to_string(), "2".to_string()),
                ("pageSize".to_string(), "50".to_string()),
            ]
        );
        assert_eq!(query.get("page"), Some("2"));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("[1,2]"), json!([1, 2]));
        assert_eq!(decode_body("not json"), json!("not json"));
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        let response = HttpResponse::new(400, r#"{"message":"Invalid conditions"}"#);
        assert_eq!(error_message(&response), "Invalid conditions");

        let response = HttpResponse::new(502, "<html>bad gateway</html>");
        assert_eq!(error_message(&response), "HTTP 502");
    }
}
