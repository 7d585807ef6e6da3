//! Network fetch capability.
//!
//! ### Failure model
//! - Only network-level problems are errors: DNS, connect, reset, timeout,
//!   oversized bodies, and origin-policy violations.
//! - HTTP error statuses (404, 500, ...) are ordinary responses.
//!
//! ### URL Resolution
//! - Relative request URLs resolve against the application origin
//! - Lowercase host, remove fragments, preserve query string
//!
//! ### Origin Policy
//! - Cross-origin `no-cors` responses come back opaque (status 0)
//! - Cross-origin `cors` responses need `Access-Control-Allow-Origin`

pub mod cors;
pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub use cors::{CorsError, is_same_origin};
pub use self::url::{UrlError, resolve};

use offgrid_core::{AppConfig, Error, InterceptedRequest, ResponseEnvelope, ResponseKind};

/// Remote fetch capability used by the strategies and by provisioning.
///
/// Implementations return `Err` only for network-level failures.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseEnvelope, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Application origin (default: http://localhost:5000/)
    pub origin: reqwest::Url,

    /// User agent string (default: "offgrid/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl FetchConfig {
    /// Build from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = reqwest::Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        })
    }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseEnvelope, Error> {
        let start = Instant::now();
        let url = resolve(&self.config.origin, &request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        cors::check_request(&self.config.origin, &url, request.mode)
            .map_err(|e| Error::CorsBlocked(e.to_string()))?;

        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {}", request.method, e)))?;

        let mut builder = self.http.request(method, url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Network(format!("timed out: {}", e))
            } else {
                Error::Network(format!("network error: {}", e))
            }
        })?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let status = response.status();
        let final_url = response.url().clone();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let kind = cors::response_kind(
            &self.config.origin,
            &final_url,
            request.mode,
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN.as_str()).map(String::as_str),
        )
        .map_err(|e| Error::CorsBlocked(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "fetched {} -> {} ({}, {:?}) in {}ms ({} bytes)",
            url,
            final_url,
            status.as_u16(),
            kind,
            start.elapsed().as_millis(),
            bytes.len()
        );

        if kind == ResponseKind::Opaque {
            return Ok(ResponseEnvelope::opaque(final_url.as_str(), bytes.to_vec()));
        }

        Ok(ResponseEnvelope {
            url: final_url.to_string(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            kind,
            headers,
            body: bytes.to_vec(),
        })
    }
}
