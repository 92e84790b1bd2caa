//! Contract Test: Update Decision
//!
//! Constraints verified:
//! - A record already pointing at the current IP is never confirmed or written
//! - A declined change is never written
//! - `skip_confirmation` writes without asking
//! - An approved change is written once, with the address record type
//! - A failed write surfaces the provider's error unchanged

mod common;

use common::*;
use dnsbump_core::{Error, FailurePolicy, RecordType, RecordUpdate, UpdateOutcome};

#[tokio::test]
async fn unchanged_record_is_neither_confirmed_nor_written() {
    let provider = MockDnsProvider::new().with_zone(
        "example.com",
        "z1",
        vec![record("z1", "r1", "cloud.example.com", "A", "203.0.113.7")],
    );
    let confirm = CountingConfirm::new(true);
    let (engine, _events) = engine(&provider, &confirm, minimal_config("example.com:cloud"));

    let report = engine.run().await.expect("run succeeds");

    assert!(matches!(
        report.outcome_for("cloud.example.com"),
        Some(UpdateOutcome::SkippedUnchanged)
    ));
    assert_eq!(provider.update_call_count(), 0);
    assert_eq!(confirm.call_count(), 0);
}

#[tokio::test]
async fn declined_change_is_not_written() {
    let provider = MockDnsProvider::new().with_zone(
        "example.com",
        "z1",
        vec![record("z1", "r1", "cloud.example.com", "A", "1.2.3.4")],
    );
    let confirm = CountingConfirm::new(false);
    let (engine, _events) = engine(&provider, &confirm, minimal_config("example.com:cloud"));

    let report = engine.run().await.expect("run succeeds");

    assert!(matches!(
        report.outcome_for("cloud.example.com"),
        Some(UpdateOutcome::SkippedDeclined)
    ));
    assert_eq!(confirm.call_count(), 1);
    assert_eq!(provider.update_call_count(), 0);
    assert!(!report.has_failures());
}

#[tokio::test]
async fn approved_change_is_written_once() {
    let provider = MockDnsProvider::new().with_zone(
        "example.com",
        "z1",
        vec![record("z1", "r1", "cloud.example.com", "A", "1.2.3.4")],
    );
    let confirm = CountingConfirm::new(true);
    let (engine, _events) = engine(&provider, &confirm, minimal_config("example.com:cloud"));

    let report = engine.run().await.expect("run succeeds");

    assert_eq!(report.applied(), 1);
    assert_eq!(
        confirm.questions(),
        ["Update cloud.example.com from 1.2.3.4 to 203.0.113.7?"]
    );

    let updates = provider.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].zone_id, "z1");
    assert_eq!(updates[0].record_id, "r1");
    assert_eq!(updates[0].update, RecordUpdate::new(RecordType::A, "203.0.113.7"));
}

#[tokio::test]
async fn skip_confirmation_writes_without_asking() {
    let provider = MockDnsProvider::new().with_zone(
        "example.com",
        "z1",
        vec![
            record("z1", "r1", "cloud.example.com", "A", "1.2.3.4"),
            record("z1", "r2", "www.example.com", "A", "1.2.3.4"),
        ],
    );
    // Would decline if it were asked
    let confirm = CountingConfirm::new(false);
    let mut config = minimal_config("example.com:cloud,example.com:www");
    config.engine.skip_confirmation = true;
    let (engine, _events) = engine(&provider, &confirm, config);

    let report = engine.run().await.expect("run succeeds");

    assert_eq!(report.applied(), 2);
    assert_eq!(confirm.call_count(), 0);
    assert_eq!(provider.update_call_count(), 2);
}

#[tokio::test]
async fn failed_write_surfaces_provider_error_fail_fast() {
    let provider = MockDnsProvider::new()
        .with_zone(
            "example.com",
            "z1",
            vec![record("z1", "r1", "cloud.example.com", "A", "1.2.3.4")],
        )
        .failing_write("r1");
    let confirm = CountingConfirm::new(true);
    let (engine, _events) = engine(&provider, &confirm, minimal_config("example.com:cloud"));

    let err = engine.run().await.expect_err("write failure ends the run");

    match err {
        Error::Write(msg) => assert_eq!(msg, "record r1 is locked"),
        other => panic!("expected Error::Write, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_write_is_reported_under_continue_on_error() {
    let provider = MockDnsProvider::new()
        .with_zone(
            "example.com",
            "z1",
            vec![
                record("z1", "r1", "cloud.example.com", "A", "1.2.3.4"),
                record("z1", "r2", "www.example.com", "A", "1.2.3.4"),
            ],
        )
        .failing_write("r1");
    let confirm = CountingConfirm::new(true);
    let config = continue_config("example.com:cloud,example.com:www");
    assert_eq!(config.engine.failure_policy, FailurePolicy::ContinueOnError);
    let (engine, _events) = engine(&provider, &confirm, config);

    let report = engine.run().await.expect("run completes");

    assert!(matches!(
        report.outcome_for("cloud.example.com"),
        Some(UpdateOutcome::Failed { error: Error::Write(_) })
    ));
    assert!(matches!(
        report.outcome_for("www.example.com"),
        Some(UpdateOutcome::Applied)
    ));
    assert!(report.has_failures());
    assert_eq!(provider.update_call_count(), 2);
}

#[tokio::test]
async fn ipv6_address_targets_aaaa_records() {
    let provider = MockDnsProvider::new().with_zone(
        "example.com",
        "z1",
        vec![
            record("z1", "r4", "cloud.example.com", "A", "1.2.3.4"),
            record("z1", "r6", "cloud.example.com", "AAAA", "2001:db8::1"),
        ],
    );
    let confirm = CountingConfirm::new(true);
    let (engine, _events) = engine(&provider, &confirm, minimal_config("example.com:cloud"));

    let report = engine
        .run_with_ip("2001:db8::2".parse().unwrap())
        .await
        .expect("run succeeds");

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(provider.updated_record_ids(), ["r6"]);
    assert_eq!(
        provider.updates()[0].update,
        RecordUpdate::new(RecordType::Aaaa, "2001:db8::2")
    );
}
