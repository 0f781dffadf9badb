//! Process killer adapter using POSIX signals.

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ports::ProcessKillerPort;

/// Sends SIGKILL directly through the `kill(2)` syscall.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalKiller;

impl SignalKiller {
    /// Create a new signal killer.
    pub fn new() -> Self {
        Self
    }

    /// Parse a textual PID.
    ///
    /// Zero and negative values address process groups in `kill(2)`, so only
    /// strictly positive PIDs are accepted.
    pub fn parse_pid(pid: &str) -> Result<i32> {
        match pid.trim().parse::<i32>() {
            Ok(raw) if raw > 0 => Ok(raw),
            _ => Err(Error::InvalidPid(pid.to_string())),
        }
    }
}

impl ProcessKillerPort for SignalKiller {
    #[cfg(unix)]
    async fn kill(&self, pid: &str) -> Result<bool> {
        let raw = Self::parse_pid(pid)?;
        debug!(pid = raw, "Sending SIGKILL");

        match kill(Pid::from_raw(raw), Signal::SIGKILL) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => {
                debug!(pid = raw, "Process already gone");
                Ok(false)
            }
            Err(Errno::EPERM) => {
                warn!(pid = raw, "Permission denied to kill process");
                Err(Error::PermissionDenied(format!("cannot signal process {}", raw)))
            }
            Err(e) => Err(Error::KillFailed {
                pid: pid.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    async fn kill(&self, pid: &str) -> Result<bool> {
        Self::parse_pid(pid)?;
        Err(Error::UnsupportedPlatform(
            "signal-based termination requires a unix target".to_string(),
        ))
    }
}
