//! Table and JSON rendering shared by the commands.

use anyhow::Result;
use portwatch_core::PortRecord;

pub fn print_ports(ports: &[PortRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("No localhost TCP ports found.");
        return Ok(());
    }

    println!("{:<6} {:<8} {:<6} PROCESS", "PORT", "PID", "PROTO");
    println!("{}", "-".repeat(60));

    for port in ports {
        println!("{}", format_row(port));
    }

    println!("\nTotal: {} ports", ports.len());
    Ok(())
}

fn format_row(port: &PortRecord) -> String {
    format!(
        "{:<6} {:<8} {:<6} {}",
        port.display_port(),
        port.pid,
        port.protocol,
        truncate(&port.process_name, 40)
    )
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
