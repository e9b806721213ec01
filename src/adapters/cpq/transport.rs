//! HTTP transport seam
//!
//! The executor talks to the network through the [`Transport`] trait so retry
//! and pagination logic can be exercised against scripted responses.
//! [`ReqwestTransport`] is the production implementation.

use crate::domain::{ApiError, CpqError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// HTTP verbs used by the CPQ API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// A fully-resolved request, ready to put on the wire
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response: status code plus the undecoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single HTTP request
///
/// Implementations return `Ok` for every response the server produced,
/// including error statuses. `Err` is reserved for failures where no response
/// exists (connection refused, timeout).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, ApiError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given request timeout
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CpqError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        // The CPQ API wants its versioned content type, so the body is
        // serialized by hand instead of through `.json()`.
        if let Some(body) = &request.body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| ApiError::InvalidResponse(format!("Unserializable body: {e}")))?;
            builder = builder.body(payload);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(e.to_string())
            } else {
                ApiError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(Method::from(HttpMethod::Delete), Method::DELETE);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse("https://sellapi.quosalsell.com/api/quotes").unwrap(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            query: vec![],
            body: None,
        };
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(429, "").is_success());
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
