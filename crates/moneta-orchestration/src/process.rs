// crates/moneta-orchestration/src/process.rs
// ============================================================================
// Module: Process Controller
// Description: Seam over the service manager controlling the connector units.
// Purpose: Keep scenarios independent of the concrete invocation mechanism.
// Dependencies: async-trait, tokio
// ============================================================================

//! ## Overview
//! Scenarios drive the connector under test through [`ProcessController`]:
//! start/stop/enable/disable a named unit, read back its run-state, and
//! capture its logs. [`SystemdController`] is the production implementation,
//! shelling out to `systemctl` and `journalctl`; tests substitute in-memory
//! fakes. A non-running state is not an error here; callers treat it as
//! not-yet-converged and poll.
//! Invariants:
//! - Command failures propagate as errors into the calling scenario.
//! - The controller itself never retries; retrying is the poller's job.

use std::process::Output;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure to control or inspect an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The command could not be spawned at all.
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        /// Command line that failed to spawn.
        command: String,
        /// Underlying io failure.
        #[source]
        source: std::io::Error,
    },
    /// The command ran and exited unsuccessfully.
    #[error("{command} failed ({status}): {stderr}")]
    CommandFailed {
        /// Command line that failed.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

// ============================================================================
// SECTION: Run State
// ============================================================================

/// Current run-state of a managed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// The unit's main process is running.
    Running,
    /// The unit is stopped.
    Dead,
    /// Any other substate, carried verbatim for diagnostics.
    Other(String),
}

impl RunState {
    /// Parses a systemd `SubState=` value.
    #[must_use]
    pub fn from_substate(raw: &str) -> Self {
        match raw.trim() {
            "running" => Self::Running,
            "dead" => Self::Dead,
            other => Self::Other(other.to_string()),
        }
    }

    /// True when the unit is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Dead => f.write_str("dead"),
            Self::Other(state) => f.write_str(state),
        }
    }
}

// ============================================================================
// SECTION: Controller Interface
// ============================================================================

/// Seam over the external service manager.
#[async_trait]
pub trait ProcessController: Send + Sync {
    /// Starts the named unit.
    async fn start(&self, unit: &str) -> Result<(), ProcessError>;

    /// Stops the named unit.
    async fn stop(&self, unit: &str) -> Result<(), ProcessError>;

    /// Restarts the named unit.
    async fn restart(&self, unit: &str) -> Result<(), ProcessError>;

    /// Enables the named unit.
    async fn enable(&self, unit: &str) -> Result<(), ProcessError>;

    /// Disables the named unit.
    async fn disable(&self, unit: &str) -> Result<(), ProcessError>;

    /// Reads back the unit's current run-state.
    async fn status(&self, unit: &str) -> Result<RunState, ProcessError>;

    /// Captures the unit's current log output.
    async fn logs(&self, unit: &str) -> Result<Vec<u8>, ProcessError>;

    /// Lists service units whose names start with `prefix`.
    async fn list_units(&self, prefix: &str) -> Result<Vec<String>, ProcessError>;
}

// ============================================================================
// SECTION: Systemd Implementation
// ============================================================================

/// [`ProcessController`] backed by `systemctl` and `journalctl`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemdController;

impl SystemdController {
    /// Builds the controller.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs a command and returns its stdout on success.
    async fn run(args: &[&str]) -> Result<String, ProcessError> {
        let command = args.join(" ");
        let output: Output = Command::new(args[0])
            .args(&args[1..])
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ProcessError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ProcessController for SystemdController {
    async fn start(&self, unit: &str) -> Result<(), ProcessError> {
        Self::run(&["systemctl", "start", unit]).await.map(|_| ())
    }

    async fn stop(&self, unit: &str) -> Result<(), ProcessError> {
        Self::run(&["systemctl", "stop", unit]).await.map(|_| ())
    }

    async fn restart(&self, unit: &str) -> Result<(), ProcessError> {
        Self::run(&["systemctl", "restart", unit]).await.map(|_| ())
    }

    async fn enable(&self, unit: &str) -> Result<(), ProcessError> {
        Self::run(&["systemctl", "enable", unit]).await.map(|_| ())
    }

    async fn disable(&self, unit: &str) -> Result<(), ProcessError> {
        Self::run(&["systemctl", "disable", unit]).await.map(|_| ())
    }

    async fn status(&self, unit: &str) -> Result<RunState, ProcessError> {
        let stdout = Self::run(&["systemctl", "show", "-p", "SubState", unit]).await?;
        let substate = stdout.trim().strip_prefix("SubState=").unwrap_or(stdout.trim());
        Ok(RunState::from_substate(substate))
    }

    async fn logs(&self, unit: &str) -> Result<Vec<u8>, ProcessError> {
        let service = format!("{unit}.service");
        let stdout =
            Self::run(&["journalctl", "-o", "short-precise", "-u", &service, "--no-pager"])
                .await?;
        Ok(stdout.into_bytes())
    }

    async fn list_units(&self, prefix: &str) -> Result<Vec<String>, ProcessError> {
        let stdout =
            Self::run(&["systemctl", "list-units", "-t", "service", "--all", "--no-legend"])
                .await?;
        Ok(parse_unit_names(&stdout, prefix))
    }
}

/// Extracts matching unit names from `systemctl list-units` output.
fn parse_unit_names(listing: &str, prefix: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| line.trim_start_matches(['*', '\u{25cf}', ' ']).split_whitespace().next())
        .filter(|name| name.starts_with(prefix))
        .map(|name| name.trim_end_matches(".service").to_string())
        .collect()
}
