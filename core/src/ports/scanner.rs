//! Port scanner port (interface).

use crate::domain::PortRecord;
use crate::error::Result;

/// Port for acquiring a snapshot of local TCP endpoints.
///
/// Implementations return the parsed, filtered, deduplicated candidate list
/// sorted by port. An `Err` means no data this cycle; callers must keep
/// whatever they published before.
pub trait PortScannerPort: Send + Sync {
    /// Take one snapshot.
    fn scan(&self) -> impl std::future::Future<Output = Result<Vec<PortRecord>>> + Send;
}
