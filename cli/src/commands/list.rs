//! List command - show all localhost TCP ports.

use anyhow::Result;
use portwatch_core::{Config, LsofScanner, PortScannerPort};

use crate::output;

pub async fn run(
    config: &Config,
    port_filter: Option<u16>,
    name_filter: Option<String>,
    json: bool,
) -> Result<()> {
    let scanner = LsofScanner::from_config(config);
    let mut ports = scanner.scan().await?;

    // Apply filters
    if let Some(p) = port_filter {
        ports.retain(|port| port.port_number() == p);
    }
    if let Some(ref query) = name_filter {
        ports.retain(|port| port.matches_search(query));
    }

    output::print_ports(&ports, json)
}
