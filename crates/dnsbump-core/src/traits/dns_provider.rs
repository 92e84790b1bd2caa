// # DNS Provider Trait
//
// Defines the capabilities the engine needs from a DNS provider:
// resolve a zone name, list a zone's records, and update one record.
//
// ## Implementations
//
// - Cloudflare: `dnsbump-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsbump_core::{DnsProvider, RecordType, RecordUpdate};
//
// let zone_id = provider.zone_id("example.com").await?;
// for record in provider.list_records(&zone_id).await? {
//     provider
//         .update_record(&zone_id, &record.id, &RecordUpdate::new(RecordType::A, "203.0.113.7"))
//         .await?;
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Address record types the engine writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// The record type that holds `ip`
    pub fn for_ip(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a record as the provider returned it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Record ID (provider-specific)
    pub id: String,
    /// ID of the zone the record lives in
    pub zone_id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type as reported by the provider ("A", "AAAA", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Current record content
    pub content: String,
    /// Last modification time, if the provider reports one
    pub modified_on: Option<DateTime<Utc>>,
}

impl DnsRecord {
    /// Whether this record has the given type
    pub fn is_type(&self, record_type: RecordType) -> bool {
        self.record_type.eq_ignore_ascii_case(record_type.as_str())
    }
}

/// The change sent to the provider for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub content: String,
}

impl RecordUpdate {
    pub fn new(record_type: RecordType, content: impl Into<String>) -> Self {
        Self {
            record_type,
            content: content.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// Providers are thin API clients. They do not decide whether a record needs
/// an update, do not ask for confirmation and do not retry; all of that is
/// owned by [`crate::SyncEngine`]. Each method performs the API calls for one
/// operation and returns success or failure.
///
/// # Errors
///
/// Implementations map failures onto the operation's error kind:
/// [`crate::Error::Authentication`] for rejected credentials,
/// [`crate::Error::ZoneLookup`] from [`DnsProvider::zone_id`],
/// [`crate::Error::Fetch`] from [`DnsProvider::list_records`] and
/// [`crate::Error::Write`] from [`DnsProvider::update_record`].
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve a zone name (e.g. "example.com") to the provider's zone ID
    async fn zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List every record in a zone
    ///
    /// Order is whatever the provider returns.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Set a record's type and content
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
