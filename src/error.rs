// Error types for the OpenVPN status check

use thiserror::Error;

use crate::check::Severity;

/// Format errors raised while decoding a status file.
///
/// The messages are fixed and never name the offending line.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("Status File is empty")]
    Empty,

    #[error("Unable to Parse Status file")]
    Unrecognized,
}

/// Anything that stops the parser from producing a snapshot
#[derive(Error, Debug)]
pub enum StatusError {
    /// Open/stat/read failures, surfaced exactly as the OS reported them
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A threshold that the observed status breached
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("file older than {tier} threshold ({age:.2} > {threshold:.2})")]
    FileAge {
        age: f64,
        threshold: f64,
        tier: Tier,
    },

    #[error("number of connection lower than {tier} threshold ({count} < {threshold})")]
    ClientCount {
        count: u64,
        threshold: u64,
        tier: Tier,
    },
}

impl ThresholdError {
    /// Severity this breach maps to
    pub fn severity(&self) -> Severity {
        match self {
            ThresholdError::FileAge { tier, .. } | ThresholdError::ClientCount { tier, .. } => {
                tier.severity()
            }
        }
    }
}

/// Which of the two threshold levels was crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Warning,
    Critical,
}

impl Tier {
    pub fn severity(self) -> Severity {
        match self {
            Tier::Warning => Severity::Warning,
            Tier::Critical => Severity::Critical,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Warning => f.write_str("warning"),
            Tier::Critical => f.write_str("critical"),
        }
    }
}

/// Main error type for a check execution
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}

/// Result type alias using CheckError
pub type CheckResult<T> = Result<T, CheckError>;

impl CheckError {
    /// Severity a check reports when it ends with this error
    pub fn severity(&self) -> Severity {
        match self {
            CheckError::Usage(_) | CheckError::Config(_) | CheckError::Status(_) => {
                Severity::Critical
            }
            CheckError::Threshold(e) => e.severity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_parse_error_messages() {
        assert_eq!(ParseError::Empty.to_string(), "Status File is empty");
        assert_eq!(
            ParseError::Unrecognized.to_string(),
            "Unable to Parse Status file"
        );
    }

    #[test]
    fn test_io_error_is_not_wrapped() {
        let raw = io::Error::new(io::ErrorKind::NotFound, "No such file or directory (os error 2)");
        let expected = raw.to_string();
        let err = CheckError::from(StatusError::from(raw));
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.severity(), Severity::Critical);
    }

    #[test]
    fn test_threshold_messages() {
        let age = ThresholdError::FileAge {
            age: 60.0,
            threshold: 45.0,
            tier: Tier::Critical,
        };
        assert_eq!(
            age.to_string(),
            "file older than critical threshold (60.00 > 45.00)"
        );

        let count = ThresholdError::ClientCount {
            count: 25,
            threshold: 30,
            tier: Tier::Warning,
        };
        assert_eq!(
            count.to_string(),
            "number of connection lower than warning threshold (25 < 30)"
        );
        assert_eq!(CheckError::from(count).severity(), Severity::Warning);
    }
}
