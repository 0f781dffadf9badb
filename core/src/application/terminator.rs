//! Batch process termination.

use tracing::{debug, warn};

use crate::domain::PortRecord;
use crate::error::Result;
use crate::ports::ProcessKillerPort;

/// Outcome of killing one PID.
#[derive(Debug)]
pub struct KillReport {
    pub pid: String,
    /// Ports the process owned when the kill was requested.
    pub ports: Vec<String>,
    /// `Ok(true)` killed, `Ok(false)` already gone.
    pub outcome: Result<bool>,
}

impl KillReport {
    /// Whether the process is gone, either killed now or already exited.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Kills the owners of a set of records, one PID at a time.
pub struct Terminator<K: ProcessKillerPort> {
    killer: K,
}

impl<K: ProcessKillerPort> Terminator<K> {
    pub fn new(killer: K) -> Self {
        Self { killer }
    }

    /// Kill every distinct PID owning one of `records`.
    ///
    /// Each PID is signalled once, in the order it first appears. A failure
    /// is logged and recorded in its report; the remaining PIDs are still
    /// processed.
    pub async fn terminate(&self, records: &[PortRecord]) -> Vec<KillReport> {
        let mut targets: Vec<(String, Vec<String>)> = Vec::new();
        for record in records {
            match targets.iter_mut().find(|(pid, _)| *pid == record.pid) {
                Some((_, ports)) => ports.push(record.port.clone()),
                None => targets.push((record.pid.clone(), vec![record.port.clone()])),
            }
        }

        let mut reports = Vec::with_capacity(targets.len());
        for (pid, ports) in targets {
            let outcome = self.killer.kill(&pid).await;
            match &outcome {
                Ok(killed) => debug!(pid = %pid, killed = *killed, "Kill finished"),
                Err(e) => warn!(pid = %pid, error = %e, "Failed to kill process"),
            }
            reports.push(KillReport { pid, ports, outcome });
        }
        reports
    }
}
