//! Kill command - force kill the processes listening on given ports.

use std::sync::Arc;

use anyhow::{bail, Result};
use portwatch_core::{
    Config, KillReport, LsofScanner, PortMonitor, PortRecord, PortScannerPort, PortStore,
    SignalKiller, Terminator,
};
use serde::Serialize;

use crate::output;

#[derive(Serialize)]
struct KillResult<'a> {
    pid: &'a str,
    ports: &'a [String],
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a KillReport> for KillResult<'a> {
    fn from(report: &'a KillReport) -> Self {
        let (status, error) = match &report.outcome {
            Ok(true) => ("killed", None),
            Ok(false) => ("gone", None),
            Err(e) => ("failed", Some(e.to_string())),
        };
        Self {
            pid: &report.pid,
            ports: &report.ports,
            status,
            error,
        }
    }
}

pub async fn run(config: &Config, ports: &[u16], json: bool) -> Result<()> {
    let scanner = LsofScanner::from_config(config);
    let current = scanner.scan().await?;

    let targets: Vec<PortRecord> = current
        .into_iter()
        .filter(|record| ports.contains(&record.port_number()))
        .collect();

    for port in ports {
        if !targets.iter().any(|t| t.port_number() == *port) {
            eprintln!("No localhost process is listening on port {}", port);
        }
    }

    if targets.is_empty() {
        bail!("Nothing to kill");
    }

    let store = Arc::new(PortStore::new());
    let monitor = PortMonitor::new(scanner, Arc::clone(&store));
    let terminator = Terminator::new(SignalKiller::new());
    let reports = monitor.kill(&terminator, &targets).await;

    let failed = reports.iter().filter(|r| !r.is_success()).count();

    if json {
        let results: Vec<KillResult> = reports.iter().map(KillResult::from).collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for report in &reports {
            let ports = report.ports.join(", ");
            match &report.outcome {
                Ok(true) => println!("Killed PID {} (port {})", report.pid, ports),
                Ok(false) => println!("PID {} had already exited (port {})", report.pid, ports),
                Err(e) => println!("Could not kill PID {} (port {}): {}", report.pid, ports, e),
            }
        }
        println!();
        output::print_ports(&store.ports(), false)?;
    }

    if failed > 0 {
        bail!("{} of {} processes could not be killed", failed, reports.len());
    }
    Ok(())
}
