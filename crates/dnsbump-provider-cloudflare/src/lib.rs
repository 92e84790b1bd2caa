// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider`.
//
// ## Behavior
//
// - One operation per trait call; no retries, no backoff, no caching
// - HTTP timeout configured (30 seconds)
// - Status codes mapped onto the operation's error kind (401/403, 429, other)
// - Record listing follows pagination until the last page
// - Dry-run mode for safe testing
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=..&per_page=..`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dnsbump_core::config::ProviderConfig;
use dnsbump_core::traits::{DnsProvider, DnsRecord, RecordUpdate};
use dnsbump_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per page when listing a zone
const RECORDS_PER_PAGE: u32 = 100;

/// Standard Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CfZone {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CfRecord {
    id: String,
    #[serde(default)]
    zone_id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    #[serde(default)]
    modified_on: Option<DateTime<Utc>>,
}

impl CfRecord {
    fn into_record(self, zone_id: &str) -> DnsRecord {
        DnsRecord {
            id: self.id,
            zone_id: self.zone_id.unwrap_or_else(|| zone_id.to_string()),
            name: self.name,
            record_type: self.record_type,
            content: self.content,
            modified_on: self.modified_on,
        }
    }
}

/// Which trait operation a request belongs to (selects the error kind)
enum Operation<'a> {
    ZoneLookup(&'a str),
    Fetch,
    Write,
}

impl Operation<'_> {
    fn error(&self, message: String) -> Error {
        match self {
            Operation::ZoneLookup(zone) => Error::zone_lookup(*zone, message),
            Operation::Fetch => Error::fetch(message),
            Operation::Write => Error::write(message),
        }
    }
}

fn describe_errors(errors: &[ApiMessage]) -> String {
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended PATCH payload
/// - **NOT** actually modify DNS records
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `dry_run`: If true, perform lookups but skip writes
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token is empty or the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        Self::with_base_url(api_token, CLOUDFLARE_API_BASE, dry_run)
    }

    /// Create a provider talking to a different API root (e.g. a mock server)
    pub fn with_base_url(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            dry_run,
        })
    }

    /// Create a provider from its configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare { api_token, dry_run } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }
                Self::new(api_token.clone(), *dry_run)
            }
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send a request and unwrap the Cloudflare envelope
    ///
    /// Transport failures, non-2xx statuses, unparsable bodies and
    /// `success: false` envelopes all become errors of the operation's kind,
    /// except 401/403 (`Authentication`) and 429 (`RateLimited`).
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        op: &Operation<'_>,
    ) -> Result<Envelope<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| op.error(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| op.error(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let details = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .map(|env| describe_errors(&env.errors))
                .unwrap_or_else(|_| body.clone());

            return Err(match status.as_u16() {
                401 | 403 => Error::auth(format!(
                    "Invalid API token or insufficient permissions. Status: {} {}",
                    status, details
                )),
                429 => Error::rate_limited(format!(
                    "Cloudflare rate limit exceeded. Status: {}",
                    status
                )),
                _ => op.error(format!("Cloudflare returned {}: {}", status, details)),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| op.error(format!("Failed to parse response: {}", e)))?;

        if !envelope.success {
            return Err(op.error(format!(
                "Cloudflare reported failure: {}",
                describe_errors(&envelope.errors)
            )));
        }

        Ok(envelope)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for {}", zone_name);

        let op = Operation::ZoneLookup(zone_name);
        let request = self
            .client
            .get(format!("{}/zones", self.base_url))
            .query(&[("name", zone_name)]);

        let zones: Vec<CfZone> = self.send(request, &op).await?.result.unwrap_or_default();

        let zone = zones.into_iter().next().ok_or_else(|| {
            Error::zone_lookup(zone_name, "zone not found or not accessible with this token")
        })?;

        tracing::debug!("Found zone ID: {}", zone.id);
        Ok(zone.id)
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?page=1&per_page=100
    /// ```
    ///
    /// Repeated for every page reported in `result_info.total_pages`.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            let request = self.client.get(&url).query(&[
                ("page", page.to_string()),
                ("per_page", RECORDS_PER_PAGE.to_string()),
            ]);

            let envelope: Envelope<Vec<CfRecord>> = self.send(request, &Operation::Fetch).await?;
            let batch = envelope.result.unwrap_or_default();
            let fetched = batch.len();
            records.extend(batch.into_iter().map(|r| r.into_record(zone_id)));

            let total_pages = envelope.result_info.map(|i| i.total_pages).unwrap_or(1);
            if fetched == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!("Zone {}: fetched {} record(s)", zone_id, records.len());
        Ok(records)
    }

    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A" or "AAAA",
    ///   "content": "1.2.3.4"
    /// }
    /// ```
    ///
    /// Skipped (but logged) in dry-run mode.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                serde_json::json!(update)
            );
            return Ok(());
        }

        tracing::debug!(
            "Updating record {} in zone {}: {} {}",
            record_id,
            zone_id,
            update.record_type,
            update.content
        );

        let request = self.client.patch(&url).json(update);
        let _: Envelope<serde_json::Value> = self.send(request, &Operation::Write).await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
