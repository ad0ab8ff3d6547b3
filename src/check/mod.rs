// Check module - severities, thresholds and the outcome of one check run

pub mod evaluator;

use std::fmt;
use std::process;

use crate::error::CheckError;
use crate::status::StatusSnapshot;

pub use evaluator::Evaluator;

/// Name printed in every verdict line
pub const CHECK_NAME: &str = "openvpn-status-check";

/// Check result as understood by Sensu/Nagios style schedulers.
///
/// Ordered by urgency so the worst of two results is simply `max`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Severity {
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
        }
    }

    pub fn exit(self) -> ! {
        process::exit(self.exit_code())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => f.write_str("OK"),
            Severity::Warning => f.write_str("WARNING"),
            Severity::Critical => f.write_str("CRITICAL"),
        }
    }
}

/// Alert thresholds. Zero disables a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    /// Seconds since the last status file write before going critical
    pub status_file_age_crit: u64,
    /// Seconds since the last status file write before warning
    pub status_file_age_warn: u64,
    /// Fewest connected clients before going critical
    pub min_clients_crit: u64,
    /// Fewest connected clients before warning
    pub min_clients_warn: u64,
}

pub const DEFAULT_STATUS_FILE_AGE_CRIT: u64 = 180;
pub const DEFAULT_STATUS_FILE_AGE_WARN: u64 = 120;

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            status_file_age_crit: DEFAULT_STATUS_FILE_AGE_CRIT,
            status_file_age_warn: DEFAULT_STATUS_FILE_AGE_WARN,
            min_clients_crit: 0,
            min_clients_warn: 0,
        }
    }
}

/// Outcome of one check execution
#[derive(Debug)]
pub struct Evaluation {
    pub severity: Severity,
    /// The single problem that decided `severity`, if any
    pub error: Option<CheckError>,
    /// Down snapshot when the status file could not be parsed
    pub snapshot: StatusSnapshot,
    /// Status file age in seconds, known only after a successful parse
    pub file_age: Option<f64>,
}

impl Evaluation {
    /// A run that ended before the status file could be judged
    pub fn failed(error: CheckError) -> Self {
        Evaluation {
            severity: error.severity(),
            error: Some(error),
            snapshot: StatusSnapshot::down(),
            file_age: None,
        }
    }

    pub fn message(&self) -> String {
        match (&self.error, self.file_age) {
            (Some(error), _) => error.to_string(),
            (None, Some(age)) => format!(
                "{} clients connected, status file {:.2}s old",
                self.snapshot.client_count, age
            ),
            (None, None) => format!("{} clients connected", self.snapshot.client_count),
        }
    }

    /// Stdout lines for the scheduler, in order.
    ///
    /// The bare client count comes first, and only when the file parsed.
    pub fn output_lines(&self, verbose: bool) -> Vec<String> {
        let snapshot = &self.snapshot;
        let mut lines = Vec::with_capacity(3);

        if snapshot.is_up {
            lines.push(snapshot.client_count.to_string());
        }
        lines.push(self.to_string());
        if verbose && snapshot.is_up {
            lines.push(format!(
                "routes: {}, max bcast/mcast queue length: {}",
                snapshot.route_count, snapshot.global_stats.max_bcast_mcast_queue_len
            ));
        }

        lines
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, CHECK_NAME, self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, StatusError, ThresholdError, Tier};
    use crate::status::GlobalStats;

    fn healthy(client_count: u64) -> Evaluation {
        Evaluation {
            severity: Severity::Ok,
            error: None,
            snapshot: StatusSnapshot {
                client_count,
                route_count: 24,
                global_stats: GlobalStats {
                    max_bcast_mcast_queue_len: 4,
                },
                is_up: true,
                ..StatusSnapshot::default()
            },
            file_age: Some(5.0),
        }
    }

    #[test]
    fn test_severity_order_and_codes() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Ok);
        assert_eq!(Severity::Ok.exit_code(), 0);
        assert_eq!(Severity::Warning.exit_code(), 1);
        assert_eq!(Severity::Critical.exit_code(), 2);
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = ThresholdConfig::default();
        assert_eq!(thresholds.status_file_age_crit, 180);
        assert_eq!(thresholds.status_file_age_warn, 120);
        assert_eq!(thresholds.min_clients_crit, 0);
        assert_eq!(thresholds.min_clients_warn, 0);
    }

    #[test]
    fn test_failed_evaluation_line() {
        let evaluation = Evaluation::failed(StatusError::from(ParseError::Empty).into());
        assert_eq!(evaluation.severity, Severity::Critical);
        assert!(!evaluation.snapshot.is_up);
        assert_eq!(
            evaluation.to_string(),
            "CRITICAL [openvpn-status-check]: Status File is empty"
        );
    }

    #[test]
    fn test_ok_evaluation_line() {
        let evaluation = Evaluation {
            severity: Severity::Ok,
            error: None,
            snapshot: StatusSnapshot {
                client_count: 3,
                is_up: true,
                ..StatusSnapshot::default()
            },
            file_age: Some(12.5),
        };
        assert_eq!(
            evaluation.to_string(),
            "OK [openvpn-status-check]: 3 clients connected, status file 12.50s old"
        );
    }

    #[test]
    fn test_output_lines_after_successful_parse() {
        assert_eq!(
            healthy(25).output_lines(false),
            vec![
                "25".to_string(),
                "OK [openvpn-status-check]: 25 clients connected, status file 5.00s old".to_string(),
            ]
        );
    }

    #[test]
    fn test_output_lines_keep_count_on_threshold_breach() {
        let mut evaluation = healthy(25);
        let breach = ThresholdError::ClientCount {
            count: 25,
            threshold: 30,
            tier: Tier::Warning,
        };
        evaluation.severity = breach.severity();
        evaluation.error = Some(breach.into());

        assert_eq!(
            evaluation.output_lines(false),
            vec![
                "25".to_string(),
                "WARNING [openvpn-status-check]: number of connection lower than warning threshold (25 < 30)"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_output_lines_without_count_on_failure() {
        let evaluation = Evaluation::failed(StatusError::from(ParseError::Unrecognized).into());
        assert_eq!(
            evaluation.output_lines(true),
            vec!["CRITICAL [openvpn-status-check]: Unable to Parse Status file".to_string()]
        );

        let evaluation = Evaluation::failed(CheckError::Usage("missing".to_string()));
        assert_eq!(evaluation.output_lines(false).len(), 1);
    }

    #[test]
    fn test_verbose_output_adds_routes_line() {
        let lines = healthy(25).output_lines(true);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "25");
        assert_eq!(lines[2], "routes: 24, max bcast/mcast queue length: 4");
    }
}
