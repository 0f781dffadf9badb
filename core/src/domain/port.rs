//! Port record domain model.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// ============================================================================
// Protocol
// ============================================================================

/// Transport protocol of an observed endpoint.
///
/// Only TCP survives scanning; UDP and everything else is dropped by the
/// parser before a record is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
}

impl Protocol {
    /// Label used by the listing tool's protocol column.
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
        }
    }

    /// Map a protocol column label to a protocol. Matching is exact.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "TCP" => Some(Protocol::Tcp),
            _ => None,
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

// ============================================================================
// PortKey
// ============================================================================

/// Identity of a record across scans: `(port, protocol)`.
///
/// Two records with the same key occupy the same logical slot even when the
/// owning process or PID changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortKey {
    pub port: String,
    pub protocol: Protocol,
}

// ============================================================================
// PortRecord
// ============================================================================

/// One observed local TCP endpoint and the process that owns it.
///
/// Records are built fresh on every scan and never mutated afterwards.
/// Equality compares every field; use [`PortRecord::key`] to compare slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    /// Decimal port number as reported by the listing tool.
    pub port: String,
    /// Owning process name with escaped spaces decoded.
    pub process_name: String,
    /// Process identifier, kept textual for display.
    pub pid: String,
    pub protocol: Protocol,
}

impl PortRecord {
    /// Create a TCP record.
    pub fn tcp(
        port: impl Into<String>,
        process_name: impl Into<String>,
        pid: impl Into<String>,
    ) -> Self {
        Self {
            port: port.into(),
            process_name: process_name.into(),
            pid: pid.into(),
            protocol: Protocol::Tcp,
        }
    }

    /// Identity key used for deduplication and reconciliation.
    pub fn key(&self) -> PortKey {
        PortKey {
            port: self.port.clone(),
            protocol: self.protocol,
        }
    }

    /// Numeric port value; unparseable ports count as 0.
    pub fn port_number(&self) -> u16 {
        self.port.trim().parse().unwrap_or(0)
    }

    /// Get the formatted port number for display (e.g., ":3000").
    pub fn display_port(&self) -> String {
        format!(":{}", self.port)
    }

    /// Check if this record matches a search query.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query_lower = query.to_lowercase();
        self.process_name.to_lowercase().contains(&query_lower)
            || self.port.contains(&query_lower)
            || self.pid.contains(&query_lower)
    }
}

impl std::fmt::Display for PortRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ":{} {} (PID {})", self.port, self.process_name, self.pid)
    }
}

/// Compare two records by numeric port value.
pub fn compare_by_port(a: &PortRecord, b: &PortRecord) -> Ordering {
    a.port_number().cmp(&b.port_number())
}

/// Stable ascending sort by numeric port value.
pub fn sort_by_port(records: &mut [PortRecord]) {
    records.sort_by(compare_by_port);
}

// ============================================================================
// Tests
// ============================================================================
