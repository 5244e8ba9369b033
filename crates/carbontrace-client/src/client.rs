//! Shared HTTP client utilities

use crate::{ApiError, Result};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 8,
            user_agent: format!("CarbonTrace/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        // Expire idle connections before the server closes them; reusing a
        // connection the server already dropped hangs the request.
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        // Use rustls for TLS (no openssl dependency)
        .use_rustls_tls()
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Emissions service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the emissions service
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl ServiceConfig {
    /// Create a configuration for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_config: HttpClientConfig::default(),
        }
    }

    /// Override the HTTP client configuration
    pub fn with_client_config(mut self, client_config: HttpClientConfig) -> Self {
        self.client_config = client_config;
        self
    }
}

/// Decode a response per the result-protocol error policy.
///
/// Non-success statuses become `ApiError::Server` carrying the best-effort
/// body text ("HTTP {status}" when the body cannot be read); a success body
/// that fails to decode surfaces as the underlying `reqwest` error.
pub(crate) async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
        return Err(ApiError::Server {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}
