// OpenVPN status file parser (status-version 1 layout)
//
// The format has no grammar: every line is split on commas and classified
// against the section we are currently in. The first unclassifiable line
// aborts the parse.

use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{GlobalStats, StatusSnapshot, StatusSource};
use crate::error::{ParseError, StatusError};

const CLIENT_LIST_TITLE: &str = "OpenVPN CLIENT LIST";
const ROUTING_TABLE_TITLE: &str = "ROUTING TABLE";
const GLOBAL_STATS_TITLE: &str = "GLOBAL STATS";
const UPDATED_FIELD: &str = "Updated";
const FOOTER: &str = "END";
const MAX_QUEUE_LENGTH_FIELD: &str = "Max bcast/mcast queue length";

const CLIENT_LIST_COLUMNS: [&str; 5] = [
    "Common Name",
    "Real Address",
    "Bytes Received",
    "Bytes Sent",
    "Connected Since",
];

const ROUTING_TABLE_COLUMNS: [&str; 4] = [
    "Virtual Address",
    "Common Name",
    "Real Address",
    "Last Ref",
];

/// Section of the status file the parser is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    None,
    ClientList,
    RoutingTable,
    GlobalStats,
}

/// What a single line means in the context of the current section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Ignored,
    Enter(Section),
    Client,
    Route,
    MaxQueueLength(i64),
}

/// Classify one comma-split line. `None` means the line is not valid here.
fn classify(fields: &[&str], section: Section) -> Option<Line> {
    let first = fields.first().copied().unwrap_or_default();

    let line = if fields.len() == 1 && first == FOOTER {
        Line::Ignored
    } else if first == CLIENT_LIST_TITLE || first == ROUTING_TABLE_TITLE {
        Line::Ignored
    } else if first == GLOBAL_STATS_TITLE {
        Line::Enter(Section::GlobalStats)
    } else if first == UPDATED_FIELD && fields.len() == 2 {
        // File mtime is authoritative, the in-file timestamp format varies
        Line::Ignored
    } else if fields == CLIENT_LIST_COLUMNS {
        Line::Enter(Section::ClientList)
    } else if fields == ROUTING_TABLE_COLUMNS {
        Line::Enter(Section::RoutingTable)
    } else {
        match (section, fields.len()) {
            (Section::ClientList, 5) => Line::Client,
            (Section::RoutingTable, 4) => Line::Route,
            (Section::GlobalStats, 2) => match first {
                MAX_QUEUE_LENGTH_FIELD => fields[1]
                    .parse()
                    .map(Line::MaxQueueLength)
                    .unwrap_or(Line::Ignored),
                _ => Line::Ignored,
            },
            _ => return None,
        }
    };

    Some(line)
}

/// Decode status lines from `reader`, stamping the result with `last_modified`
pub fn parse_reader<R: BufRead>(
    reader: R,
    last_modified: DateTime<Utc>,
) -> Result<StatusSnapshot, StatusError> {
    let mut section = Section::None;
    let mut client_count = 0;
    let mut route_count = 0;
    let mut global_stats = GlobalStats::default();
    let mut is_empty = true;

    // Raw byte lines: a non-UTF-8 common name must not fail the parse
    for line in reader.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        is_empty = false;

        let line = String::from_utf8_lossy(&line);
        let fields: Vec<&str> = line.split(',').collect();
        match classify(&fields, section) {
            Some(Line::Ignored) => {}
            Some(Line::Enter(next)) => section = next,
            Some(Line::Client) => client_count += 1,
            Some(Line::Route) => route_count += 1,
            Some(Line::MaxQueueLength(len)) => global_stats.max_bcast_mcast_queue_len = len,
            None => {
                tracing::debug!("Unrecognized line in {:?} section: {:?}", section, line);
                return Err(ParseError::Unrecognized.into());
            }
        }
    }

    if is_empty {
        return Err(ParseError::Empty.into());
    }

    Ok(StatusSnapshot {
        client_count,
        route_count,
        global_stats,
        last_modified,
        is_up: true,
    })
}

/// Open, stat and decode the status file at `path`
pub fn parse_file(path: &Path) -> Result<StatusSnapshot, StatusError> {
    let file = File::open(path)?;
    let last_modified = DateTime::<Utc>::from(file.metadata()?.modified()?);

    let snapshot = parse_reader(BufReader::new(file), last_modified)?;
    tracing::debug!(
        "Parsed {}: {} clients, {} routes, modified {}",
        path.display(),
        snapshot.client_count,
        snapshot.route_count,
        snapshot.last_modified.to_rfc3339()
    );

    Ok(snapshot)
}

/// Reads status files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFileParser;

impl StatusSource for StatusFileParser {
    fn parse(&self, path: &Path) -> Result<StatusSnapshot, StatusError> {
        parse_file(path)
    }
}
