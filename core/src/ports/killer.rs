//! Process killer port (interface).

use crate::error::Result;

/// Port for killing processes.
///
/// This trait defines the interface for process termination.
/// Implementations handle platform-specific signal handling.
pub trait ProcessKillerPort: Send + Sync {
    /// Forcefully kill a process by its textual PID.
    ///
    /// Returns `Ok(true)` when the signal was delivered and `Ok(false)` when
    /// the process was already gone.
    fn kill(&self, pid: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}
