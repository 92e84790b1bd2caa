//! Configuration types for dnsbump
//!
//! [`ZoneDomainConfig`] is the grouped form of the `zone:prefix,...` string
//! given on the command line. [`DdnsConfig`] bundles it with the provider,
//! IP source and engine settings into the single immutable run configuration
//! handed to [`crate::SyncEngine`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default "what is my IP" endpoint
pub const DEFAULT_IP_URL: &str = "https://checkip.amazonaws.com/";

/// Default timeout for the IP discovery request, in seconds
pub const DEFAULT_IP_TIMEOUT_SECS: u64 = 10;

/// The domain prefixes configured for one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDomains {
    /// Zone name at the provider (e.g. "example.com")
    pub zone: String,
    /// Prefixes in the order they were configured, duplicates included
    pub prefixes: Vec<String>,
}

/// Zone → domain prefixes, in configuration order
///
/// Zones keep the order of their first appearance; prefixes within a zone
/// keep the order they were listed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneDomainConfig {
    zones: Vec<ZoneDomains>,
}

impl ZoneDomainConfig {
    /// Parse a `zone:prefix,zone:prefix` configuration string
    ///
    /// Pairs are split on `,`, then each pair on its first `:`. Pairs that
    /// share a zone accumulate their prefixes. A pair without `:` or with an
    /// empty side rejects the whole string.
    ///
    /// # Example
    ///
    /// ```
    /// use dnsbump_core::ZoneDomainConfig;
    ///
    /// let config = ZoneDomainConfig::parse("foo.com:cloud,foo.com:www,bar.net:www").unwrap();
    /// assert_eq!(config.prefixes("foo.com"), Some(&["cloud".to_string(), "www".to_string()][..]));
    /// assert_eq!(config.len(), 2);
    /// ```
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let mut config = Self::default();

        for pair in raw.split(',') {
            let (zone, prefix) = pair
                .split_once(':')
                .ok_or_else(|| crate::Error::config_format(pair, "missing ':' delimiter"))?;

            let zone = zone.trim();
            let prefix = prefix.trim();

            if zone.is_empty() {
                return Err(crate::Error::config_format(pair, "zone is empty"));
            }
            if prefix.is_empty() {
                return Err(crate::Error::config_format(pair, "domain prefix is empty"));
            }

            config.push(zone, prefix);
        }

        Ok(config)
    }

    fn push(&mut self, zone: &str, prefix: &str) {
        match self.zones.iter_mut().find(|entry| entry.zone == zone) {
            Some(entry) => entry.prefixes.push(prefix.to_string()),
            None => self.zones.push(ZoneDomains {
                zone: zone.to_string(),
                prefixes: vec![prefix.to_string()],
            }),
        }
    }

    /// Prefixes configured for `zone`, if the zone is configured
    pub fn prefixes(&self, zone: &str) -> Option<&[String]> {
        self.zones
            .iter()
            .find(|entry| entry.zone == zone)
            .map(|entry| entry.prefixes.as_slice())
    }

    /// Iterate zones in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &ZoneDomains> {
        self.zones.iter()
    }

    /// Number of distinct zones
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Validate a config that was not built by [`ZoneDomainConfig::parse`]
    pub fn validate(&self) -> crate::Result<()> {
        if self.zones.is_empty() {
            return Err(crate::Error::config("No zone:prefix pairs configured"));
        }

        for entry in &self.zones {
            if entry.zone.is_empty() {
                return Err(crate::Error::config("Zone name cannot be empty"));
            }
            if entry.prefixes.is_empty() || entry.prefixes.iter().any(|p| p.is_empty()) {
                return Err(crate::Error::config(format!(
                    "Zone {} has an empty domain prefix",
                    entry.zone
                )));
            }
        }

        Ok(())
    }
}

impl FromStr for ZoneDomainConfig {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a ZoneDomainConfig {
    type Item = &'a ZoneDomains;
    type IntoIter = std::slice::Iter<'a, ZoneDomains>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}

/// Main run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Zones and the domain prefixes to update within them
    pub zones: ZoneDomainConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public IP discovery configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration with default IP source and engine settings
    pub fn new(zones: ZoneDomainConfig, provider: ProviderConfig) -> Self {
        Self {
            zones,
            provider,
            ip_source: IpSourceConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        self.zones.validate()?;
        self.provider.validate()?;
        self.ip_source.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token with DNS edit access to every configured zone
        api_token: String,
        /// Look everything up but do not send writes
        #[serde(default)]
        dry_run: bool,
    },
}

impl ProviderConfig {
    /// Cloudflare configuration in live mode
    pub fn cloudflare(api_token: impl Into<String>) -> Self {
        ProviderConfig::Cloudflare {
            api_token: api_token.into(),
            dry_run: false,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            ProviderConfig::Cloudflare { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

// Hides the API token
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare { dry_run, .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("dry_run", dry_run)
                .finish(),
        }
    }
}

/// Public IP discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// Plaintext "what is my IP" HTTP endpoint
    Http {
        /// URL to fetch the IP from
        url: String,
        /// Request timeout in seconds
        #[serde(default = "default_ip_timeout_secs")]
        timeout_secs: u64,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            IpSourceConfig::Http { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("HTTP IP source URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "HTTP IP source URL must use http or https: {}",
                        url
                    )));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP IP source timeout must be > 0"));
                }
                Ok(())
            }
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http {
            url: DEFAULT_IP_URL.to_string(),
            timeout_secs: default_ip_timeout_secs(),
        }
    }
}

/// What the engine does when a zone or a record fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first lookup, fetch or write failure ends the run
    #[default]
    FailFast,
    /// Record the failure and carry on with the next record or zone
    ContinueOnError,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Apply changes without asking
    #[serde(default)]
    pub skip_confirmation: bool,

    /// Fail-fast or continue-on-error
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Upper bound for a single record write, in seconds
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.write_timeout_secs == 0 {
            return Err(crate::Error::config("Write timeout must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            skip_confirmation: false,
            failure_policy: FailurePolicy::default(),
            write_timeout_secs: default_write_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_ip_timeout_secs() -> u64 {
    DEFAULT_IP_TIMEOUT_SECS
}

fn default_write_timeout_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    256
}
