//! Watch command - print the port list whenever it changes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use portwatch_core::{Config, LsofScanner, PortMonitor, PortStore};

use crate::output;

pub async fn run(config: &Config, interval: Option<u64>, json: bool) -> Result<()> {
    let period = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.refresh_period());

    let store = Arc::new(PortStore::new());
    let monitor = PortMonitor::with_interval(
        LsofScanner::from_config(config),
        Arc::clone(&store),
        period,
    );

    let mut changes = store.subscribe();
    let handle = monitor.start_monitoring();

    if !json {
        eprintln!(
            "Watching localhost TCP ports every {}s (Ctrl-C to stop)",
            period.as_secs()
        );
    }

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let version = *changes.borrow_and_update();
                if !json {
                    println!("\n[{}] update #{}", Local::now().format("%H:%M:%S"), version);
                }
                output::print_ports(&store.ports(), json)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop();
    Ok(())
}
