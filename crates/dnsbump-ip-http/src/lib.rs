// # HTTP IP Source
//
// This crate provides the `IpSource` that asks a "what is my IP" service for
// the caller's public address.
//
// ## Architecture
//
// One GET per run against a plaintext endpoint (default
// https://checkip.amazonaws.com/). The trimmed body must parse as an IPv4 or
// IPv6 address. Transport errors, non-2xx statuses and unparsable bodies are
// `Error::IpDiscovery`.

use dnsbump_core::config::IpSourceConfig;
use dnsbump_core::traits::IpSource;
use dnsbump_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

pub use dnsbump_core::config::DEFAULT_IP_URL;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://checkip.amazonaws.com/")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create an IP source from its configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        match config {
            IpSourceConfig::Http { url, timeout_secs } => {
                Self::with_timeout(url.clone(), Duration::from_secs(*timeout_secs))
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching current IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_discovery(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_discovery(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::ip_discovery(format!("Failed to read response: {}", e)))?;

        let ip_text = ip_text.trim();

        ip_text.parse().map_err(|_| {
            Error::ip_discovery(format!("{} returned an invalid IP address: {:?}", self.url, ip_text))
        })
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
