//! Example: Scan once and display all localhost TCP ports.

use portwatch_core::{LsofScanner, PortScannerPort};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Scanning ports...\n");

    let scanner = LsofScanner::new();

    match scanner.scan().await {
        Ok(ports) => {
            if ports.is_empty() {
                println!("No localhost TCP ports found.");
                return;
            }

            println!("{:<6} {:<8} {:<6} PROCESS", "PORT", "PID", "PROTO");
            println!("{}", "-".repeat(60));

            for port in &ports {
                println!(
                    "{:<6} {:<8} {:<6} {}",
                    port.port, port.pid, port.protocol, port.process_name
                );
            }

            println!("\nTotal: {} ports", ports.len());
        }
        Err(e) => {
            eprintln!("Scan failed: {}", e);
            std::process::exit(1);
        }
    }
}
