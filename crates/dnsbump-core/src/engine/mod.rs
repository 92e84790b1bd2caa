//! Zone sync engine
//!
//! The SyncEngine is responsible for:
//! - Resolving the current public IP once per run via IpSource
//! - Fetching the records of every configured zone via DnsProvider
//! - Selecting records by type and domain prefix
//! - Running the update decision for each selected record
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  IpSource   │─── current IP ──────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │  SyncEngine  │
//!                            └──────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         │                           │                           │
//!         ▼                           ▼                           ▼
//! ┌─────────────┐           ┌──────────────┐           ┌─────────────┐
//! │   Confirm   │           │ DnsProvider  │           │   Events    │
//! │  (approve)  │           │ (list/write) │           │  (notify)   │
//! └─────────────┘           └──────────────┘           └─────────────┘
//! ```
//!
//! ## Per-zone flow
//!
//! 1. Resolve the zone name to a zone ID
//! 2. List the zone's records
//! 3. Keep records of the address type whose name has a configured prefix
//! 4. For each: unchanged → skip, else confirm → write
//!
//! Zones are handled one after another in configuration order, records one
//! after another in provider order. There is never more than one write in
//! flight.

use crate::config::{DdnsConfig, EngineConfig, FailurePolicy, ZoneDomainConfig, ZoneDomains};
use crate::confirm::Confirm;
use crate::decision::{UpdateOutcome, decide};
use crate::error::{Error, Result};
use crate::matcher::matches_any_domain;
use crate::traits::{DnsProvider, DnsRecord, IpSource, RecordType, RecordUpdate};
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Why a matched record was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unchanged,
    Declined,
}

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run started
    Started {
        zones_count: usize,
    },

    /// Current public IP determined
    IpResolved {
        ip: IpAddr,
    },

    /// A zone's records were fetched and filtered
    ZoneScanned {
        zone: String,
        records: usize,
        matched: usize,
    },

    /// A record was selected for evaluation
    RecordMatched {
        zone: String,
        record_name: String,
        content: String,
    },

    /// A selected record was not written
    UpdateSkipped {
        record_name: String,
        reason: SkipReason,
    },

    /// A record was written
    UpdateApplied {
        record_name: String,
        previous_content: String,
        new_ip: IpAddr,
    },

    /// A record write failed
    UpdateFailed {
        record_name: String,
        error: String,
    },

    /// A zone could not be processed
    ZoneFailed {
        zone: String,
        error: String,
    },

    /// Run finished
    Finished {
        applied: usize,
        skipped: usize,
        failed: usize,
    },
}

/// The outcome for one evaluated record
#[derive(Debug)]
pub struct RecordOutcome {
    pub zone: String,
    pub record_name: String,
    /// Record content before the run
    pub previous_content: String,
    pub outcome: UpdateOutcome,
}

/// A zone that could not be processed under [`FailurePolicy::ContinueOnError`]
#[derive(Debug)]
pub struct ZoneFailure {
    pub zone: String,
    pub error: Error,
}

/// Everything that happened during one run
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per evaluated record, in evaluation order
    pub outcomes: Vec<RecordOutcome>,
    /// Zones skipped because their lookup or listing failed
    pub zone_failures: Vec<ZoneFailure>,
}

impl RunReport {
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Applied))
    }

    pub fn skipped(&self) -> usize {
        self.count(UpdateOutcome::is_skipped)
    }

    /// Failed writes (zone failures are counted separately)
    pub fn failed(&self) -> usize {
        self.count(UpdateOutcome::is_failure)
    }

    /// Whether any write or zone failed
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || !self.zone_failures.is_empty()
    }

    /// Outcome for a record name, if it was evaluated
    pub fn outcome_for(&self, record_name: &str) -> Option<&UpdateOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.record_name == record_name)
            .map(|o| &o.outcome)
    }

    fn count(&self, pred: impl Fn(&UpdateOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

/// Why `sync_zone` stopped early
enum ZoneAbort {
    /// The zone could not be resolved or listed
    Zone(Error),
    /// A write failed under [`FailurePolicy::FailFast`]
    Write(Error),
}

/// Zone sync engine
///
/// Built once per run from an immutable [`DdnsConfig`]. The engine owns its
/// collaborators; nothing is shared between runs.
pub struct SyncEngine {
    /// Public IP discovery
    ip_source: Box<dyn IpSource>,

    /// DNS provider for listing and updating records
    provider: Box<dyn DnsProvider>,

    /// Approval for pending changes
    confirm: Box<dyn Confirm>,

    /// Zones and prefixes to process
    zones: ZoneDomainConfig,

    /// Engine settings
    settings: EngineConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `confirm`: Confirmation policy, consulted unless
    ///   `engine.skip_confirmation` is set
    /// - `config`: Run configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        confirm: Box<dyn Confirm>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            ip_source,
            provider,
            confirm,
            zones: config.zones,
            settings: config.engine,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Resolve the current IP and sync every configured zone
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: All zones were visited (see [`RunReport::has_failures`]
    ///   under [`FailurePolicy::ContinueOnError`])
    /// - `Err(Error)`: IP discovery failed, or the first failure under
    ///   [`FailurePolicy::FailFast`]
    pub async fn run(&self) -> Result<RunReport> {
        self.emit_event(EngineEvent::Started {
            zones_count: self.zones.len(),
        });

        let current_ip = self.ip_source.current().await?;
        info!(
            "Current IP: {} (via {})",
            current_ip,
            self.ip_source.source_name()
        );
        self.emit_event(EngineEvent::IpResolved { ip: current_ip });

        self.run_with_ip(current_ip).await
    }

    /// Sync every configured zone to an already known IP
    pub async fn run_with_ip(&self, current_ip: IpAddr) -> Result<RunReport> {
        let desired = current_ip.to_string();
        let record_type = RecordType::for_ip(current_ip);
        let mut report = RunReport::default();

        for zone in &self.zones {
            let e = match self
                .sync_zone(zone, current_ip, &desired, record_type, &mut report)
                .await
            {
                Ok(()) => continue,
                Err(ZoneAbort::Write(e)) => {
                    error!("Stopping after failed update in zone {}: {}", zone.zone, e);
                    return Err(e);
                }
                Err(ZoneAbort::Zone(e)) => e,
            };

            self.emit_event(EngineEvent::ZoneFailed {
                zone: zone.zone.clone(),
                error: e.to_string(),
            });

            match self.settings.failure_policy {
                FailurePolicy::FailFast => {
                    error!("Zone {} failed: {}", zone.zone, e);
                    return Err(e);
                }
                FailurePolicy::ContinueOnError => {
                    error!("Zone {} failed, continuing with remaining zones: {}", zone.zone, e);
                    report.zone_failures.push(ZoneFailure {
                        zone: zone.zone.clone(),
                        error: e,
                    });
                }
            }
        }

        self.emit_event(EngineEvent::Finished {
            applied: report.applied(),
            skipped: report.skipped(),
            failed: report.failed() + report.zone_failures.len(),
        });

        Ok(report)
    }

    /// Process one zone, appending an outcome per matched record
    async fn sync_zone(
        &self,
        zone: &ZoneDomains,
        current_ip: IpAddr,
        desired: &str,
        record_type: RecordType,
        report: &mut RunReport,
    ) -> std::result::Result<(), ZoneAbort> {
        let zone_id = self
            .provider
            .zone_id(&zone.zone)
            .await
            .map_err(ZoneAbort::Zone)?;
        debug!("Zone {} has ID {}", zone.zone, zone_id);

        let records = self
            .provider
            .list_records(&zone_id)
            .await
            .map_err(ZoneAbort::Zone)?;

        let matched: Vec<&DnsRecord> = records
            .iter()
            .filter(|record| matches_any_domain(&record.name, &zone.prefixes))
            .filter(|record| {
                let keep = record.is_type(record_type);
                if !keep {
                    debug!(
                        "{}: {} record ignored, only {} records follow the current IP",
                        record.name, record.record_type, record_type
                    );
                }
                keep
            })
            .collect();

        debug!(
            "Zone {}: {} record(s), {} matching {:?} as {}",
            zone.zone,
            records.len(),
            matched.len(),
            zone.prefixes,
            record_type
        );
        self.emit_event(EngineEvent::ZoneScanned {
            zone: zone.zone.clone(),
            records: records.len(),
            matched: matched.len(),
        });

        for record in matched {
            self.emit_event(EngineEvent::RecordMatched {
                zone: zone.zone.clone(),
                record_name: record.name.clone(),
                content: record.content.clone(),
            });

            let outcome = match self.evaluate(record, current_ip, desired, record_type).await {
                UpdateOutcome::Failed { error }
                    if self.settings.failure_policy == FailurePolicy::FailFast =>
                {
                    return Err(ZoneAbort::Write(error));
                }
                outcome => outcome,
            };

            report.outcomes.push(RecordOutcome {
                zone: zone.zone.clone(),
                record_name: record.name.clone(),
                previous_content: record.content.clone(),
                outcome,
            });
        }

        Ok(())
    }

    /// Run the update decision for one record and report it
    async fn evaluate(
        &self,
        record: &DnsRecord,
        current_ip: IpAddr,
        desired: &str,
        record_type: RecordType,
    ) -> UpdateOutcome {
        let last_updated = record
            .modified_on
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            "{}: {} {} last updated: {}",
            record.name, record.record_type, record.content, last_updated
        );
        info!("detected {}, current {}", desired, record.content);

        let question = format!(
            "Update {} from {} to {}?",
            record.name, record.content, desired
        );
        let update = RecordUpdate::new(record_type, desired);

        let outcome = decide(
            &record.content,
            desired,
            || self.settings.skip_confirmation || self.confirm.confirm(&question),
            || self.write_record(record, &update),
        )
        .await;

        match &outcome {
            UpdateOutcome::SkippedUnchanged => {
                info!("{}: content unchanged, skipping update", record.name);
                self.emit_event(EngineEvent::UpdateSkipped {
                    record_name: record.name.clone(),
                    reason: SkipReason::Unchanged,
                });
            }
            UpdateOutcome::SkippedDeclined => {
                info!("{}: update declined, skipping", record.name);
                self.emit_event(EngineEvent::UpdateSkipped {
                    record_name: record.name.clone(),
                    reason: SkipReason::Declined,
                });
            }
            UpdateOutcome::Applied => {
                info!("{}: updated {} -> {}", record.name, record.content, desired);
                self.emit_event(EngineEvent::UpdateApplied {
                    record_name: record.name.clone(),
                    previous_content: record.content.clone(),
                    new_ip: current_ip,
                });
            }
            UpdateOutcome::Failed { error: e } => {
                error!("{}: update failed: {}", record.name, e);
                self.emit_event(EngineEvent::UpdateFailed {
                    record_name: record.name.clone(),
                    error: e.to_string(),
                });
            }
        }

        outcome
    }

    /// Send one write to the provider, bounded by `write_timeout_secs`
    async fn write_record(&self, record: &DnsRecord, update: &RecordUpdate) -> Result<()> {
        let limit = Duration::from_secs(self.settings.write_timeout_secs);

        match tokio::time::timeout(
            limit,
            self.provider
                .update_record(&record.zone_id, &record.id, update),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(format!(
                "update of {} via {} did not complete within {:?}",
                record.name,
                self.provider.provider_name(),
                limit
            ))),
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
