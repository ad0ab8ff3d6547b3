// Threshold evaluation against a freshly parsed status snapshot

use chrono::{DateTime, Utc};
use std::path::Path;

use super::{Evaluation, Severity, ThresholdConfig};
use crate::error::{CheckError, ThresholdError, Tier};
use crate::status::{StatusSnapshot, StatusSource};

/// Runs one check: parse the status file once, then compare it to thresholds
pub struct Evaluator<S> {
    source: S,
}

impl<S: StatusSource> Evaluator<S> {
    pub fn new(source: S) -> Self {
        Evaluator { source }
    }

    /// Judge the status file at `path` as of `now`.
    ///
    /// File age is checked first; a stale file is reported even when the
    /// client count is also below its threshold.
    pub fn evaluate(&self, path: &Path, thresholds: &ThresholdConfig, now: DateTime<Utc>) -> Evaluation {
        let snapshot = match self.source.parse(path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Failed to read status file {}: {}", path.display(), e);
                return Evaluation::failed(e.into());
            }
        };

        let file_age = file_age_seconds(&snapshot, now);
        let breach = check_file_age(file_age, thresholds)
            .or_else(|| check_client_count(snapshot.client_count, thresholds));

        let (severity, error) = match breach {
            Some(e) => (e.severity(), Some(CheckError::from(e))),
            None => (Severity::Ok, None),
        };

        Evaluation {
            severity,
            error,
            snapshot,
            file_age: Some(file_age),
        }
    }
}

fn file_age_seconds(snapshot: &StatusSnapshot, now: DateTime<Utc>) -> f64 {
    (now - snapshot.last_modified).num_milliseconds() as f64 / 1000.0
}

fn check_file_age(age: f64, thresholds: &ThresholdConfig) -> Option<ThresholdError> {
    let breached = |threshold: u64| threshold > 0 && age > threshold as f64;

    let (threshold, tier) = if breached(thresholds.status_file_age_crit) {
        (thresholds.status_file_age_crit, Tier::Critical)
    } else if breached(thresholds.status_file_age_warn) {
        (thresholds.status_file_age_warn, Tier::Warning)
    } else {
        return None;
    };

    Some(ThresholdError::FileAge {
        age,
        threshold: threshold as f64,
        tier,
    })
}

fn check_client_count(count: u64, thresholds: &ThresholdConfig) -> Option<ThresholdError> {
    let breached = |threshold: u64| threshold > 0 && count < threshold;

    let (threshold, tier) = if breached(thresholds.min_clients_crit) {
        (thresholds.min_clients_crit, Tier::Critical)
    } else if breached(thresholds.min_clients_warn) {
        (thresholds.min_clients_warn, Tier::Warning)
    } else {
        return None;
    };

    Some(ThresholdError::ClientCount {
        count,
        threshold,
        tier,
    })
}
