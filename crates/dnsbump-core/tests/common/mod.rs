//! Test doubles and common utilities for engine contract tests
//!
//! The doubles are `Clone` and share their counters, so a test can hand one
//! copy to the engine and keep another for assertions.

#![allow(dead_code)]

use dnsbump_core::error::{Error, Result};
use dnsbump_core::{
    Confirm, DdnsConfig, DnsProvider, DnsRecord, EngineEvent, FailurePolicy, IpSource,
    ProviderConfig, RecordUpdate, SyncEngine, ZoneDomainConfig,
};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Build a record the way a provider would report it
pub fn record(zone_id: &str, id: &str, name: &str, record_type: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        zone_id: zone_id.to_string(),
        name: name.to_string(),
        record_type: record_type.to_string(),
        content: content.to_string(),
        modified_on: None,
    }
}

/// One update the provider received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub zone_id: String,
    pub record_id: String,
    pub update: RecordUpdate,
}

/// In-memory DnsProvider that records every call
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    /// zone name → zone id
    zones: HashMap<String, String>,
    /// zone id → records
    records: HashMap<String, Vec<DnsRecord>>,
    /// zone ids whose listing fails
    failing_fetches: HashSet<String>,
    /// record ids whose update fails
    failing_writes: HashSet<String>,
    /// Delay before every update completes
    write_delay: Option<Duration>,
    /// Every call, in order ("zone_id:example.com", "list:z1", "update:r1")
    calls: Arc<Mutex<Vec<String>>>,
    update_call_count: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<RecordedUpdate>>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone and its records
    pub fn with_zone(mut self, name: &str, zone_id: &str, records: Vec<DnsRecord>) -> Self {
        self.zones.insert(name.to_string(), zone_id.to_string());
        self.records.insert(zone_id.to_string(), records);
        self
    }

    /// Make listing this zone id fail
    pub fn failing_fetch(mut self, zone_id: &str) -> Self {
        self.failing_fetches.insert(zone_id.to_string());
        self
    }

    /// Make updating this record id fail
    pub fn failing_write(mut self, record_id: &str) -> Self {
        self.failing_writes.insert(record_id.to_string());
        self
    }

    /// Make every update take this long
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Updates received so far
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Record ids updated so far, in order
    pub fn updated_record_ids(&self) -> Vec<String> {
        self.updates().into_iter().map(|u| u.record_id).collect()
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_id(&self, zone_name: &str) -> Result<String> {
        self.log(format!("zone_id:{}", zone_name));
        self.zones
            .get(zone_name)
            .cloned()
            .ok_or_else(|| Error::zone_lookup(zone_name, "no such zone"))
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.log(format!("list:{}", zone_id));
        if self.failing_fetches.contains(zone_id) {
            return Err(Error::fetch(format!("listing {} failed", zone_id)));
        }
        Ok(self.records.get(zone_id).cloned().unwrap_or_default())
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<()> {
        self.log(format!("update:{}", record_id));
        self.update_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_writes.contains(record_id) {
            return Err(Error::write(format!("record {} is locked", record_id)));
        }

        self.updates.lock().unwrap().push(RecordedUpdate {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            update: update.clone(),
        });
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// IpSource returning a fixed address
#[derive(Clone)]
pub struct StaticIpSource {
    ip: IpAddr,
    calls: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// IpSource that always fails
pub struct FailingIpSource;

#[async_trait::async_trait]
impl IpSource for FailingIpSource {
    async fn current(&self) -> Result<IpAddr> {
        Err(Error::ip_discovery("service unavailable"))
    }

    fn source_name(&self) -> &'static str {
        "failing"
    }
}

/// Confirm policy with a fixed answer that records the questions asked
#[derive(Clone)]
pub struct CountingConfirm {
    answer: bool,
    questions: Arc<Mutex<Vec<String>>>,
}

impl CountingConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            questions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.questions.lock().unwrap().len()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Confirm for CountingConfirm {
    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().unwrap().push(question.to_string());
        self.answer
    }
}

/// Default test IP
pub fn current_ip() -> IpAddr {
    IpAddr::from([203, 0, 113, 7])
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(zones: &str) -> DdnsConfig {
    let mut config = DdnsConfig::new(
        ZoneDomainConfig::parse(zones).expect("valid test zones"),
        ProviderConfig::cloudflare("test-token"),
    );
    config.engine.write_timeout_secs = 5;
    config
}

/// Same as [`minimal_config`] with continue-on-error
pub fn continue_config(zones: &str) -> DdnsConfig {
    let mut config = minimal_config(zones);
    config.engine.failure_policy = FailurePolicy::ContinueOnError;
    config
}

/// Build an engine from clones of the given doubles
pub fn engine(
    provider: &MockDnsProvider,
    confirm: &CountingConfirm,
    config: DdnsConfig,
) -> (SyncEngine, mpsc::Receiver<EngineEvent>) {
    SyncEngine::new(
        Box::new(StaticIpSource::new(current_ip())),
        Box::new(provider.clone()),
        Box::new(confirm.clone()),
        config,
    )
    .expect("engine construction succeeds")
}

/// Drain every event currently buffered
pub fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
