//! Parser for `lsof -i -P -n +c 0` output.
//!
//! Expected format:
//! ```text
//! COMMAND     PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
//! node      34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
//! Code\x20H  5678  code   10u  IPv4 0xabcdef1234567890      0t0  TCP 127.0.0.1:8080 (LISTEN)
//! ```
//!
//! Columns are read by position: 0 is the command, 1 the PID, 7 the
//! protocol and 8 the NAME descriptor.

use std::collections::HashSet;

use tracing::trace;

use crate::domain::{sort_by_port, PortKey, PortRecord, Protocol};

const MIN_COLUMNS: usize = 9;
const COL_COMMAND: usize = 0;
const COL_PID: usize = 1;
const COL_PROTOCOL: usize = 7;
const COL_NAME: usize = 8;

/// Prefixes of a local endpoint that is only reachable through loopback.
const LOOPBACK_PREFIXES: [&str; 5] = [
    "127.0.0.1:",
    "localhost:",
    "[::1]:",
    "*:127.0.0.1:",
    "*:localhost:",
];

const WILDCARD_PREFIX: &str = "*:";
const ARROW: &str = "->";

/// Parse raw lsof output into localhost TCP records.
///
/// The first line is always discarded as a header. Rows that are too short,
/// not TCP, carry no numeric local port or are not localhost-bound are
/// skipped. The result is deduplicated by `(port, protocol)` keeping the
/// first row seen, then sorted by port.
pub fn parse_lsof_output(output: &str) -> Vec<PortRecord> {
    let mut records = Vec::new();

    for line in output.lines().skip(1) {
        match parse_row(line) {
            Some(record) => records.push(record),
            None => trace!(line = line, "Skipping lsof row"),
        }
    }

    dedup_sorted(records)
}

/// Parse a single data row.
fn parse_row(line: &str) -> Option<PortRecord> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < MIN_COLUMNS {
        return None;
    }

    let protocol = Protocol::from_label(columns[COL_PROTOCOL])?;
    let descriptor = columns[COL_NAME];
    let local = local_part(descriptor);

    let port = extract_local_port(local)?;
    if !is_localhost(descriptor) {
        return None;
    }

    Some(PortRecord {
        port,
        process_name: decode_process_name(columns[COL_COMMAND]),
        pid: columns[COL_PID].to_string(),
        protocol,
    })
}

/// The local endpoint of a descriptor: everything before `->`, if any.
pub fn local_part(descriptor: &str) -> &str {
    descriptor
        .split_once(ARROW)
        .map_or(descriptor, |(local, _)| local)
}

/// Extract the port of a local endpoint.
///
/// Handles:
/// - IPv6: "[::1]:3000", "[fe80::1]:8080"
/// - IPv4 and wildcards: "127.0.0.1:3000", "*:8080"
pub fn extract_local_port(local: &str) -> Option<String> {
    let segment = if local.contains(']') {
        local.split("]:").nth(1)?
    } else {
        local.rsplit(':').next()?
    };

    let candidate = segment
        .split(|c: char| c == ' ' || c == '(')
        .next()?
        .trim();

    if candidate.is_empty() || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    candidate.parse::<u16>().ok()?;

    Some(candidate.to_string())
}

/// Whether a descriptor is reachable via localhost.
///
/// Loopback binds qualify, and so does any wildcard bind (`*:port`) that is
/// not one end of an established connection.
pub fn is_localhost(descriptor: &str) -> bool {
    let local = local_part(descriptor);
    if LOOPBACK_PREFIXES.iter().any(|p| local.starts_with(p)) {
        return true;
    }
    local.starts_with(WILDCARD_PREFIX) && !descriptor.contains(ARROW)
}

/// Decode lsof's `\x20` escapes into spaces.
pub fn decode_process_name(raw: &str) -> String {
    raw.replace("\\x20", " ")
}

/// Deduplicate by identity key (first wins), then sort by port.
fn dedup_sorted(records: Vec<PortRecord>) -> Vec<PortRecord> {
    let mut seen: HashSet<PortKey> = HashSet::with_capacity(records.len());
    let mut unique: Vec<PortRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.key()))
        .collect();
    sort_by_port(&mut unique);
    unique
}
