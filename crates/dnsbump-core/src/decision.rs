//! Per-record update decision
//!
//! [`decide`] is the whole policy for one matched record:
//!
//! ```text
//! content == ip ──yes──▶ SkippedUnchanged
//!      │no
//!      ▼
//!  confirm() ──false──▶ SkippedDeclined
//!      │true
//!      ▼
//!   write() ──Err(e)──▶ Failed { error: e }
//!      │Ok
//!      ▼
//!   Applied
//! ```
//!
//! Nothing is retried. Whether a failed write already took effect at the
//! provider is unknown, so the failure is reported as-is.

use crate::error::{Error, Result};
use std::future::Future;

/// What happened to one evaluated record
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Record already pointed at the current IP
    SkippedUnchanged,
    /// Confirmation was refused
    SkippedDeclined,
    /// Record was written
    Applied,
    /// The write was attempted and failed
    Failed {
        /// The collaborator's error, unchanged
        error: Error,
    },
}

impl UpdateOutcome {
    /// Short label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            UpdateOutcome::SkippedUnchanged => "unchanged",
            UpdateOutcome::SkippedDeclined => "declined",
            UpdateOutcome::Applied => "applied",
            UpdateOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            UpdateOutcome::SkippedUnchanged | UpdateOutcome::SkippedDeclined
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UpdateOutcome::Failed { .. })
    }
}

/// Decide whether to write a record and do so if approved
///
/// # Parameters
///
/// - `current_content`: the record's content at the provider
/// - `desired_ip`: the address the record should point at
/// - `confirm`: approval for the change; only called when content differs
/// - `write`: performs the provider write; only called when approved
pub async fn decide<C, W, Fut>(
    current_content: &str,
    desired_ip: &str,
    confirm: C,
    write: W,
) -> UpdateOutcome
where
    C: FnOnce() -> bool,
    W: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if current_content == desired_ip {
        return UpdateOutcome::SkippedUnchanged;
    }

    if !confirm() {
        return UpdateOutcome::SkippedDeclined;
    }

    match write().await {
        Ok(()) => UpdateOutcome::Applied,
        Err(error) => UpdateOutcome::Failed { error },
    }
}
