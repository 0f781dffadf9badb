//! Port scanner adapter backed by `lsof`.

mod lsof;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::config::Config;
use crate::domain::PortRecord;
use crate::error::{Error, Result};
use crate::ports::PortScannerPort;

pub use lsof::{decode_process_name, extract_local_port, is_localhost, local_part, parse_lsof_output};

/// Default listing program, resolved through `PATH`.
pub const DEFAULT_LSOF_PATH: &str = "lsof";

/// Flags:
/// - -i: Internet sockets only
/// - -P: Show port numbers (don't resolve to service names)
/// - -n: Show IP addresses (don't resolve to hostnames)
/// - +c 0: Show full command name (unlimited length)
const LSOF_ARGS: [&str; 5] = ["-i", "-P", "-n", "+c", "0"];

/// Scanner that runs `lsof` and parses its combined output.
#[derive(Debug, Clone)]
pub struct LsofScanner {
    program: PathBuf,
}

impl LsofScanner {
    /// Create a scanner that runs `lsof` from `PATH`.
    pub fn new() -> Self {
        Self::with_program(DEFAULT_LSOF_PATH)
    }

    /// Create a scanner that runs the given listing program.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Create a scanner from the configured program path.
    pub fn from_config(config: &Config) -> Self {
        Self::with_program(&config.lsof_path)
    }

    /// The program this scanner runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the listing program and return stdout followed by stderr.
    ///
    /// lsof exits with 1 both when it finds nothing and when some sockets
    /// could not be read, so a failing exit status is only an error when
    /// stdout is empty and stderr explains why.
    pub async fn run(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(LSOF_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::CommandFailed(format!("Failed to run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() && output.stdout.is_empty() && !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::CommandFailed(format!(
                "{} failed with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        String::from_utf8(combined)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in lsof output: {}", e)))
    }
}

impl Default for LsofScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PortScannerPort for LsofScanner {
    async fn scan(&self) -> Result<Vec<PortRecord>> {
        let raw = self.run().await?;
        let records = parse_lsof_output(&raw);
        debug!(
            bytes = raw.len(),
            records = records.len(),
            "Parsed lsof output"
        );
        Ok(records)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    // Writing an executable while another test forks can fail with ETXTBSY.
    static SPAWN_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    fn fake_lsof(body: &str) -> (LsofScanner, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lsof");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        (LsofScanner::with_program(path), dir)
    }

    #[tokio::test]
    async fn test_scan_parses_program_output() {
        let _guard = SPAWN_LOCK.lock();
        let (scanner, _dir) = fake_lsof(
            r#"cat <<'EOF'
COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
nginx     1234  root    5u  IPv4 0x1234567890abcdef      0t0  TCP *:80 (LISTEN)
dnsmasq    999  root    4u  IPv4 0x1234567890abcdee      0t0  UDP *:53
EOF"#,
        );

        let records = scanner.scan().await.unwrap();
        let ports: Vec<&str> = records.iter().map(|r| r.port.as_str()).collect();
        assert_eq!(ports, vec!["80", "3000"]);
    }

    #[tokio::test]
    async fn test_stderr_is_appended() {
        let _guard = SPAWN_LOCK.lock();
        let (scanner, _dir) = fake_lsof("echo header; echo 'lsof: WARNING: noise' >&2; exit 1");

        let raw = scanner.run().await.unwrap();
        assert_eq!(raw, "header\nlsof: WARNING: noise\n");
    }

    #[tokio::test]
    async fn test_silent_failure_means_no_sockets() {
        let _guard = SPAWN_LOCK.lock();
        let (scanner, _dir) = fake_lsof("exit 1");
        assert!(scanner.scan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_with_only_stderr_is_an_error() {
        let _guard = SPAWN_LOCK.lock();
        let (scanner, _dir) = fake_lsof("echo 'lsof: unknown option' >&2; exit 1");
        assert!(matches!(scanner.scan().await, Err(Error::CommandFailed(_))));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_parse_error() {
        let _guard = SPAWN_LOCK.lock();
        let (scanner, _dir) = fake_lsof(r"printf 'COMMAND\n\377\376\n'");
        assert!(matches!(scanner.scan().await, Err(Error::ParseError(_))));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let _guard = SPAWN_LOCK.lock();
        let scanner = LsofScanner::with_program("/nonexistent/portwatch-lsof");
        assert!(matches!(scanner.scan().await, Err(Error::CommandFailed(_))));
    }
}
