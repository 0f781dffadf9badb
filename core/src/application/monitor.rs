//! Periodic and on-demand port scanning.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::config::MIN_REFRESH_INTERVAL_SECS;
use crate::domain::PortRecord;
use crate::ports::{PortScannerPort, ProcessKillerPort};

use super::store::PortStore;
use super::terminator::{KillReport, Terminator};

/// Default period between background scans.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Drives scans and publishes their results into a [`PortStore`].
///
/// Cloning is cheap; clones share the scanner and the store. Scans run as
/// tokio tasks so the caller is never blocked on the listing process.
pub struct PortMonitor<S: PortScannerPort> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    scanner: S,
    store: Arc<PortStore>,
    interval: Duration,
}

impl<S: PortScannerPort> Clone for PortMonitor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PortScannerPort + 'static> PortMonitor<S> {
    /// Create a monitor scanning every [`DEFAULT_REFRESH_INTERVAL`].
    pub fn new(scanner: S, store: Arc<PortStore>) -> Self {
        Self::with_interval(scanner, store, DEFAULT_REFRESH_INTERVAL)
    }

    /// Create a monitor with a custom scan period.
    ///
    /// Periods shorter than [`MIN_REFRESH_INTERVAL_SECS`] are raised to it.
    pub fn with_interval(scanner: S, store: Arc<PortStore>, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_secs(MIN_REFRESH_INTERVAL_SECS));
        Self {
            inner: Arc::new(Inner {
                scanner,
                store,
                interval,
            }),
        }
    }

    /// The store this monitor publishes into.
    pub fn store(&self) -> &Arc<PortStore> {
        &self.inner.store
    }

    /// Period between background scans.
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Scan now, then keep scanning every interval until the handle is dropped.
    ///
    /// Background scans never raise the loading indicator.
    pub fn start_monitoring(&self) -> MonitorHandle {
        let monitor = self.clone();
        let period = self.inner.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.scan_once(false).await;
            }
        });

        debug!(interval_ms = period.as_millis() as u64, "Port monitoring started");
        MonitorHandle { task }
    }

    /// Spawn a single scan.
    ///
    /// With `show_loading` the store reports loading from before this call
    /// returns until the scan's result has been published (or dropped). The
    /// handle resolves to whether the published list changed.
    pub fn refresh_ports(&self, show_loading: bool) -> JoinHandle<bool> {
        let guard = show_loading.then(|| LoadingGuard::new(Arc::clone(&self.inner.store)));
        let monitor = self.clone();

        tokio::spawn(async move {
            let changed = monitor.scan_once(false).await;
            drop(guard);
            changed
        })
    }

    /// Run one scan on the current task and publish its result.
    ///
    /// A failed scan is logged and leaves the published list untouched.
    pub async fn scan_once(&self, show_loading: bool) -> bool {
        let _guard = show_loading.then(|| LoadingGuard::new(Arc::clone(&self.inner.store)));

        match self.inner.scanner.scan().await {
            Ok(candidates) => self.inner.store.publish(&candidates),
            Err(e) => {
                warn!(error = %e, "Port scan failed, keeping previous list");
                false
            }
        }
    }

    /// Kill the owners of `records`, then rescan with the loading indicator.
    pub async fn kill<K: ProcessKillerPort>(
        &self,
        terminator: &Terminator<K>,
        records: &[PortRecord],
    ) -> Vec<KillReport> {
        let reports = terminator.terminate(records).await;
        if let Err(e) = self.refresh_ports(true).await {
            warn!(error = %e, "Refresh after kill did not complete");
        }
        reports
    }
}

/// Keeps the store's loading indicator raised while alive.
struct LoadingGuard {
    store: Arc<PortStore>,
}

impl LoadingGuard {
    fn new(store: Arc<PortStore>) -> Self {
        store.begin_loading();
        Self { store }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.store.end_loading();
    }
}

/// Handle to the background scanning task; dropping it stops the timer.
pub struct MonitorHandle {
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop background scanning.
    pub fn stop(self) {
        drop(self);
    }

    /// Whether the background task is still scheduled.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Port monitoring stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock scanner replaying queued results.
    ///
    /// Once the queue is drained it keeps returning the last successful list.
    struct MockScanner {
        queue: Mutex<VecDeque<Result<Vec<PortRecord>>>>,
        last: Mutex<Vec<PortRecord>>,
        calls: AtomicUsize,
        loading_seen: Mutex<Vec<bool>>,
        store: Mutex<Option<Arc<PortStore>>>,
    }

    impl MockScanner {
        fn new(results: Vec<Result<Vec<PortRecord>>>) -> Self {
            Self {
                queue: Mutex::new(results.into()),
                last: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                loading_seen: Mutex::new(Vec::new()),
                store: Mutex::new(None),
            }
        }
    }

    impl PortScannerPort for Arc<MockScanner> {
        async fn scan(&self) -> Result<Vec<PortRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(store) = self.store.lock().as_ref() {
                self.loading_seen.lock().push(store.is_loading());
            }
            let next = self.queue.lock().pop_front();
            match next {
                Some(Ok(records)) => {
                    *self.last.lock() = records.clone();
                    Ok(records)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last.lock().clone()),
            }
        }
    }

    fn monitor(results: Vec<Result<Vec<PortRecord>>>) -> (PortMonitor<Arc<MockScanner>>, Arc<MockScanner>) {
        let scanner = Arc::new(MockScanner::new(results));
        let store = Arc::new(PortStore::new());
        *scanner.store.lock() = Some(Arc::clone(&store));
        (PortMonitor::new(Arc::clone(&scanner), store), scanner)
    }

    fn a() -> PortRecord {
        PortRecord::tcp("3000", "A", "1")
    }

    fn b() -> PortRecord {
        PortRecord::tcp("8080", "B", "2")
    }

    #[tokio::test]
    async fn test_scan_publishes() {
        let (monitor, _) = monitor(vec![Ok(vec![a(), b()])]);

        assert!(monitor.scan_once(false).await);
        assert_eq!(monitor.store().ports(), vec![a(), b()]);
        assert_eq!(monitor.store().version(), 1);
    }

    #[tokio::test]
    async fn test_failed_scan_keeps_previous_list() {
        let (monitor, _) = monitor(vec![
            Ok(vec![a(), b()]),
            Err(Error::CommandFailed("lsof: not found".to_string())),
        ]);

        monitor.scan_once(false).await;
        assert!(!monitor.scan_once(false).await);
        assert_eq!(monitor.store().ports(), vec![a(), b()]);
        assert_eq!(monitor.store().version(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_scan_does_not_publish() {
        let (monitor, _) = monitor(vec![Ok(vec![a(), b()]), Ok(vec![a(), b()])]);

        assert!(monitor.scan_once(false).await);
        assert!(!monitor.scan_once(false).await);
        assert_eq!(monitor.store().version(), 1);
    }

    #[tokio::test]
    async fn test_reconciliation_scenario() {
        let b_updated = PortRecord::tcp("8080", "B-updated", "2");
        let c = PortRecord::tcp("9090", "C", "3");
        let (monitor, _) = monitor(vec![
            Ok(vec![a(), b()]),
            Ok(vec![a(), b_updated.clone(), c.clone()]),
        ]);

        monitor.scan_once(false).await;
        monitor.scan_once(false).await;
        assert_eq!(monitor.store().ports(), vec![a(), b_updated, c]);
    }

    #[tokio::test]
    async fn test_manual_refresh_shows_loading() {
        let (monitor, scanner) = monitor(vec![Ok(vec![a()])]);

        let handle = monitor.refresh_ports(true);
        assert!(monitor.store().is_loading());

        assert!(handle.await.unwrap());
        assert!(!monitor.store().is_loading());
        assert_eq!(*scanner.loading_seen.lock(), vec![true]);
    }

    #[tokio::test]
    async fn test_silent_refresh_never_shows_loading() {
        let (monitor, scanner) = monitor(vec![Ok(vec![a()])]);

        let handle = monitor.refresh_ports(false);
        assert!(!monitor.store().is_loading());
        handle.await.unwrap();
        assert_eq!(*scanner.loading_seen.lock(), vec![false]);
    }

    #[tokio::test]
    async fn test_loading_cleared_after_failure() {
        let (monitor, _) = monitor(vec![Err(Error::ParseError("bad utf-8".to_string()))]);

        assert!(!monitor.refresh_ports(true).await.unwrap());
        assert!(!monitor.store().is_loading());
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_converge() {
        let (monitor, _) = monitor(vec![Ok(vec![a()]), Ok(vec![a(), b()])]);

        let first = monitor.refresh_ports(true);
        let second = monitor.refresh_ports(false);
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(monitor.store().ports(), vec![a(), b()]);
        assert!(!monitor.store().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_monitoring_scans_immediately_then_periodically() {
        let (monitor, scanner) = monitor(vec![Ok(vec![a()])]);

        let handle = monitor.start_monitoring();
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 3);
        assert!(handle.is_running());
        assert!(scanner.loading_seen.lock().iter().all(|seen| !seen));
        assert_eq!(monitor.store().ports(), vec![a()]);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_raised_to_minimum() {
        let scanner = Arc::new(MockScanner::new(vec![Ok(vec![a()])]));
        let store = Arc::new(PortStore::new());
        let monitor = PortMonitor::with_interval(Arc::clone(&scanner), store, Duration::ZERO);
        assert_eq!(monitor.interval(), Duration::from_secs(1));

        let handle = monitor.start_monitoring();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(handle.is_running());
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(monitor.store().ports(), vec![a()]);
    }

    #[tokio::test]
    async fn test_scan_once_raises_loading_while_scanning() {
        let (monitor, scanner) = monitor(vec![Ok(vec![a()])]);

        assert!(monitor.scan_once(true).await);
        assert_eq!(*scanner.loading_seen.lock(), vec![true]);
        assert!(!monitor.store().is_loading());

        monitor.scan_once(false).await;
        assert_eq!(*scanner.loading_seen.lock(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_subscriber_is_woken_on_publish() {
        let (monitor, _) = monitor(vec![Ok(vec![a()])]);
        let mut rx = monitor.store().subscribe();

        let _refresh = monitor.refresh_ports(false);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }

    mod kill {
        use super::*;

        struct RecordingKiller {
            killed: Mutex<Vec<String>>,
        }

        impl ProcessKillerPort for RecordingKiller {
            async fn kill(&self, pid: &str) -> Result<bool> {
                self.killed.lock().push(pid.to_string());
                if pid == "1" {
                    return Err(Error::PermissionDenied(pid.to_string()));
                }
                Ok(true)
            }
        }

        #[tokio::test]
        async fn test_kill_reports_each_target_and_refreshes() {
            let (monitor, scanner) = monitor(vec![Ok(vec![a(), b()]), Ok(vec![a()])]);
            monitor.scan_once(false).await;

            let terminator = Terminator::new(RecordingKiller {
                killed: Mutex::new(Vec::new()),
            });
            let reports = monitor.kill(&terminator, &[a(), b()]).await;

            assert_eq!(reports.len(), 2);
            assert!(!reports[0].is_success());
            assert!(reports[1].is_success());
            assert_eq!(scanner.calls.load(Ordering::SeqCst), 2);
            assert_eq!(monitor.store().ports(), vec![a()]);
        }
    }
}
