//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod port;
mod reconcile;

// Re-export all domain types
pub use port::{compare_by_port, sort_by_port, PortKey, PortRecord, Protocol};
pub use reconcile::reconcile;
