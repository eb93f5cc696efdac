//! `ScanObserver` that forwards pipeline events to `tracing`.

use tracing::{debug, info, warn};

use crate::domain::SkipReason;
use crate::error::ProbeError;
use crate::ports::ScanObserver;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScanObserver for TracingObserver {
    fn rule_matched(&self, rule: &str, count: usize) {
        info!(rule = %rule, count, "Selector rule matched");
    }

    fn selectors_exhausted(&self) {
        info!("No selector rule matched");
    }

    fn anchor_fallback_started(&self, direct_count: usize) {
        info!(direct_count, "Too few direct matches, trying timestamp anchors");
    }

    fn anchors_found(&self, count: usize) {
        info!(count, "Timestamp anchors found");
    }

    fn anchor_discarded(&self, anchor_text: &str) {
        debug!(anchor = %anchor_text, "No container above anchor");
    }

    fn containers_located(&self, count: usize) {
        info!(count, "Anchor strategy located containers");
    }

    fn probe_failed(&self, stage: &str, error: &ProbeError) {
        warn!(stage = %stage, error = %error, "Node probe failed");
    }

    fn candidate_skipped(&self, index: usize, reason: SkipReason) {
        debug!(index, reason = %reason, "Candidate skipped");
    }

    fn candidate_failed(&self, index: usize, error: &ProbeError) {
        warn!(index, error = %error, "Failed to parse candidate");
    }

    fn duplicates_removed(&self, count: usize) {
        debug!(count, "Duplicate records dropped");
    }

    fn scan_completed(&self, count: usize) {
        info!(count, "Scan complete");
    }
}
