// Status module - OpenVPN status file snapshot and its source

pub mod parser;

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::error::StatusError;

pub use parser::StatusFileParser;

/// Server-wide counters from the GLOBAL STATS section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalStats {
    pub max_bcast_mcast_queue_len: i64,
}

/// What a single read of the status file tells us about the server.
///
/// `last_modified` comes from the filesystem, not from the `Updated` line
/// inside the file. The default value is the "down" snapshot: all zero,
/// epoch timestamp, `is_up == false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub client_count: u64,
    pub route_count: u64,
    pub global_stats: GlobalStats,
    pub last_modified: DateTime<Utc>,
    pub is_up: bool,
}

impl StatusSnapshot {
    pub fn down() -> Self {
        Self::default()
    }
}

/// Anything that can turn a status file path into a snapshot
pub trait StatusSource {
    fn parse(&self, path: &Path) -> Result<StatusSnapshot, StatusError>;
}
