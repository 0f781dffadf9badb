//! PortWatch Core Library
//!
//! Discovers TCP endpoints reachable through localhost, keeps them in a
//! deduplicated list whose order stays stable across scans, and kills the
//! processes that own them.
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Records, identity keys and the reconciliation merge
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: `lsof` scanning and signal-based termination
//! - `application`: Published state, monitoring and batch termination
//!
//! # Platform Support
//! Scanning shells out to `lsof -i -P -n +c 0` (macOS, Linux, BSDs).
//! Termination uses `kill(2)` and is unix-only.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export domain types (primary API)
pub use domain::{reconcile, sort_by_port, PortKey, PortRecord, Protocol};

// Re-export other commonly used types
pub use adapters::{LsofScanner, SignalKiller};
pub use application::{KillReport, MonitorHandle, PortMonitor, PortStore, Terminator};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
pub use ports::{PortScannerPort, ProcessKillerPort};
