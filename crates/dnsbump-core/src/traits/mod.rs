//! Collaborator traits
//!
//! - [`IpSource`]: Discover the current public IP
//! - [`DnsProvider`]: Look up and update DNS records via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord, RecordType, RecordUpdate};
