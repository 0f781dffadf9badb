//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod monitor;
mod store;
mod terminator;

pub use monitor::{MonitorHandle, PortMonitor, DEFAULT_REFRESH_INTERVAL};
pub use store::PortStore;
pub use terminator::{KillReport, Terminator};
