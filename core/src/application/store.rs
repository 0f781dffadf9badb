//! The published port list.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use crate::domain::{reconcile, PortRecord};

/// Owner of the published, ordered list of local TCP endpoints.
///
/// The monitor is the only writer. Readers either poll ([`PortStore::ports`],
/// [`PortStore::is_loading`]) or wait for the version published through
/// [`PortStore::subscribe`] to change. Reads are not transactional: two
/// consecutive reads may observe different lists.
pub struct PortStore {
    ports: RwLock<Vec<PortRecord>>,
    loading: AtomicUsize,
    version: watch::Sender<u64>,
}

impl PortStore {
    /// Create an empty store at version 0.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            ports: RwLock::new(Vec::new()),
            loading: AtomicUsize::new(0),
            version,
        }
    }

    /// Copy of the current list.
    pub fn ports(&self) -> Vec<PortRecord> {
        self.ports.read().clone()
    }

    /// Number of records currently published.
    pub fn len(&self) -> usize {
        self.ports.read().len()
    }

    /// Whether nothing is published.
    pub fn is_empty(&self) -> bool {
        self.ports.read().is_empty()
    }

    /// Whether a scan that asked for the loading indicator is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Number of changes published so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver that is marked changed on every publish.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Find a record by port.
    pub fn find_by_port(&self, port: &str) -> Option<PortRecord> {
        self.ports.read().iter().find(|p| p.port == port).cloned()
    }

    /// Find records owned by a PID.
    pub fn find_by_pid(&self, pid: &str) -> Vec<PortRecord> {
        self.ports
            .read()
            .iter()
            .filter(|p| p.pid == pid)
            .cloned()
            .collect()
    }

    /// Reconcile `candidates` into the current list.
    ///
    /// Runs under the write lock so publishes never interleave; the last one
    /// applied wins. Returns `false` when the list is unchanged, in which case
    /// the version is not bumped and subscribers are not woken.
    pub(crate) fn publish(&self, candidates: &[PortRecord]) -> bool {
        let mut ports = self.ports.write();
        match reconcile(&ports, candidates) {
            Some(merged) => {
                debug!(before = ports.len(), after = merged.len(), "Publishing port list");
                *ports = merged;
                self.version.send_modify(|v| *v += 1);
                true
            }
            None => {
                debug!(count = ports.len(), "Port list unchanged");
                false
            }
        }
    }

    pub(crate) fn begin_loading(&self) {
        self.loading.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn end_loading(&self) {
        self.loading.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for PortStore {
    fn default() -> Self {
        Self::new()
    }
}
