//! Error types for dnsbump
//!
//! Every fallible operation in the workspace returns [`Result`]. Library code
//! never terminates the process; the binary maps errors to exit codes.

use thiserror::Error;

/// Result type alias for dnsbump operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed `zone:prefix` pair in the configuration string
    #[error("invalid zone:prefix pair '{pair}': {reason}")]
    ConfigFormat {
        /// The offending pair, as written
        pair: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Other configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid or insufficient provider credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zone name could not be resolved to a zone ID
    #[error("Zone lookup failed for {zone}: {message}")]
    ZoneLookup {
        /// Zone name as configured
        zone: String,
        /// Provider-side reason
        message: String,
    },

    /// Listing the records of a zone failed
    #[error("Failed to fetch records: {0}")]
    Fetch(String),

    /// Updating a record failed
    #[error("Failed to update record: {0}")]
    Write(String),

    /// The current public IP could not be determined
    #[error("IP discovery failed: {0}")]
    IpDiscovery(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// An operation exceeded its time bound
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl Error {
    /// Create a configuration format error for a single pair
    pub fn config_format(pair: impl Into<String>, reason: &'static str) -> Self {
        Self::ConfigFormat {
            pair: pair.into(),
            reason,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a zone lookup error
    pub fn zone_lookup(zone: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ZoneLookup {
            zone: zone.into(),
            message: message.into(),
        }
    }

    /// Create a record fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a record write error
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Create an IP discovery error
    pub fn ip_discovery(msg: impl Into<String>) -> Self {
        Self::IpDiscovery(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Whether this error came from rejecting user-supplied configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigFormat { .. } | Self::Config(_))
    }
}
