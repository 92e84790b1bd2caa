// # dnsbump-core
//
// Core library for the dnsbump DNS updater.
//
// ## Architecture Overview
//
// Given the caller's public IP and a `zone:prefix,...` configuration, dnsbump
// finds the matching address records at a DNS provider and points them at
// that IP, asking for confirmation unless told not to.
//
// - **ZoneDomainConfig**: Parsed `zone:prefix` pairs grouped by zone
// - **matches_any_domain**: Record selection by leading-substring match
// - **decide**: Per-record skip / confirm / write policy
// - **SyncEngine**: Runs the per-zone fetch → filter → decide flow
// - **IpSource** / **DnsProvider** / **Confirm**: Injected collaborators
//
// ## Design Principles
//
// 1. **Library-First**: No process exits or global state; everything returns `Result`
// 2. **Explicit Collaborators**: Network and terminal I/O sit behind traits
// 3. **Sequential**: One zone, one record, one write at a time
// 4. **No Retries**: A failed write is reported, never re-sent

pub mod traits;
pub mod engine;
pub mod config;
pub mod confirm;
pub mod decision;
pub mod matcher;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecord, IpSource, RecordType, RecordUpdate};
pub use engine::{EngineEvent, RecordOutcome, RunReport, SkipReason, SyncEngine, ZoneFailure};
pub use config::{
    DdnsConfig, EngineConfig, FailurePolicy, IpSourceConfig, ProviderConfig, ZoneDomainConfig,
    ZoneDomains,
};
pub use confirm::{AlwaysNo, AlwaysYes, Confirm, InteractivePrompt};
pub use decision::{UpdateOutcome, decide};
pub use matcher::matches_any_domain;
pub use error::{Error, Result};
