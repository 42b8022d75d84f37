//! `reqwest`-backed transport
//!
//! This module builds the authenticated HTTP client used against the live
//! API: bearer token, GitHub media type and user agent are installed as
//! default headers once, so individual calls never touch credentials.

use crate::config::ApiConfig;
use crate::transport::{
    ApiResponse, HttpMethod, Transport, TransportError, TransportRequest, TransportResult,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method};
use std::time::Duration;

/// Media type the API documents for JSON responses
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Settings fixed for the lifetime of a transport
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub token: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl TransportSettings {
    /// Builds settings from the `[api]` section and an already-resolved token
    pub fn from_config(config: &ApiConfig, token: String) -> Self {
        Self {
            token,
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Transport issuing real HTTP requests through `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the HTTP client with authentication headers installed
    ///
    /// # Errors
    ///
    /// * `TransportError::InvalidHeader` - the token or user agent contains
    ///   characters that cannot appear in a header
    /// * `TransportError::Client` - the TLS backend failed to initialize
    pub fn new(settings: &TransportSettings) -> TransportResult<Self> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .map_err(|_| TransportError::InvalidHeader(AUTHORIZATION.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: TransportRequest) -> TransportResult<ApiResponse> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::Network {
                url: request.url.clone(),
                source,
            })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Network {
                url: request.url.clone(),
                source,
            })?;

        tracing::trace!(
            "{} {} -> {} ({} bytes)",
            request.method,
            final_url,
            status.as_u16(),
            body.len()
        );

        Ok(ApiResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            final_url,
            body.to_vec(),
        ))
    }
}
