//! Transport capability and error types
//!
//! This module defines the narrow HTTP capability the API client is written
//! against. Anything that can send a method/URL/headers/JSON-body request and
//! hand back status plus bytes conforms.

use crate::transport::ApiResponse;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors raised by a transport before a response exists
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid header value for {0}")]
    InvalidHeader(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// HTTP methods used by the resource operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
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

/// One outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,

    /// Absolute URL
    pub url: String,

    /// Per-call headers, applied on top of the transport's defaults
    pub headers: Vec<(String, String)>,

    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<serde_json::Value>,
}

impl TransportRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Capability for issuing HTTP requests
///
/// Authentication belongs to the implementation and is fixed when it is
/// built; callers never pass credentials per request. Implementations hold
/// no per-call state, so one instance can be shared by many clients.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the response whatever its status
    ///
    /// Only failures that prevent a response from existing (DNS, connect,
    /// TLS, body read) are errors; a 4xx or 5xx is still `Ok`.
    async fn request(&self, request: TransportRequest) -> TransportResult<ApiResponse>;
}
