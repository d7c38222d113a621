// crates/moneta-orchestration/src/steps.rs
// ============================================================================
// Module: Orchestration Steps
// Description: Scenario-level operations over the connector's service units.
// Purpose: Bring the system under test into a target state and converge on it.
// Dependencies: moneta-orchestration process, eventually, config
// ============================================================================

//! ## Overview
//! The steps compose the process controller with the convergence poller:
//! onboard/offboard a tenant, reconfigure and restart the connector, and
//! wait for its units to reach a run-state. Unit naming follows the current
//! topology: one `moneta-sync-import@{tenant}` instance per tenant plus a
//! shared `moneta-sync-rest` API unit.
//! Invariants:
//! - Process-control failures propagate; only readiness is polled.
//! - Logs are captured before and after stopping a unit so the report holds
//!   the shutdown tail.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigWriteError;
use crate::config::ConnectorConfig;
use crate::eventually::ConvergenceError;
use crate::eventually::Eventually;
use crate::process::ProcessController;
use crate::process::ProcessError;

// ============================================================================
// SECTION: Unit Naming
// ============================================================================

/// Prefix shared by every connector service unit.
pub const UNIT_PREFIX: &str = "moneta-sync-";

/// The shared REST API unit.
pub const REST_UNIT: &str = "moneta-sync-rest";

/// Returns the import unit name for a tenant.
#[must_use]
pub fn import_unit(tenant: &str) -> String {
    format!("moneta-sync-import@{tenant}")
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure of an orchestration step.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// A process-control command failed.
    #[error(transparent)]
    Process(#[from] ProcessError),
    /// A polled state never converged.
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),
    /// The connector configuration could not be written.
    #[error(transparent)]
    Config(#[from] ConfigWriteError),
    /// The health-probe HTTP client could not be constructed.
    #[error("failed to build health probe client: {0}")]
    Probe(String),
    /// A captured log could not be written to the report directory.
    #[error("failed to write report {path}: {source}")]
    Report {
        /// Report path the write targeted.
        path: PathBuf,
        /// Underlying io failure.
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Scenario-level driver for the connector's service units.
pub struct Orchestrator<C> {
    /// Process-control seam; systemd in production, fakes in tests.
    controller: C,
    /// Where the rendered connector environment file goes.
    config_path: PathBuf,
    /// Where captured unit logs go.
    report_dir: PathBuf,
    /// Poller used for every readiness wait.
    poller: Eventually,
}

impl<C: ProcessController> Orchestrator<C> {
    /// Builds an orchestrator with a ten-second readiness budget.
    #[must_use]
    pub fn new(controller: C, config_path: &Path, report_dir: &Path) -> Self {
        Self {
            controller,
            config_path: config_path.to_path_buf(),
            report_dir: report_dir.to_path_buf(),
            poller: Eventually::within(Duration::from_secs(10)),
        }
    }

    /// Overrides the readiness poller.
    #[must_use]
    pub const fn with_poller(mut self, poller: Eventually) -> Self {
        self.poller = poller;
        self
    }

    /// Returns the readiness poller, for composing extra waits.
    #[must_use]
    pub const fn poller(&self) -> &Eventually {
        &self.poller
    }

    /// Writes the default configuration, then enables and starts the
    /// tenant's import unit, converging on a running state.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] when config rendering, a systemctl
    /// command, or the readiness wait fails.
    pub async fn onboard_tenant(&self, tenant: &str) -> Result<(), OrchestrationError> {
        ConnectorConfig::default().write(&self.config_path)?;
        let unit = import_unit(tenant);
        self.controller.enable(&unit).await?;
        self.controller.start(&unit).await?;
        self.wait_until_running(&unit).await?;
        Ok(())
    }

    /// Captures logs, stops and disables the tenant's import unit, and
    /// converges on a non-running state.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] when a systemctl command or the
    /// shutdown wait fails; log capture failures are also surfaced.
    pub async fn offboard_tenant(&self, tenant: &str) -> Result<(), OrchestrationError> {
        let unit = import_unit(tenant);
        self.capture_logs(&unit).await?;
        self.controller.stop(&unit).await?;
        self.controller.disable(&unit).await?;
        // Second capture picks up the shutdown tail.
        self.capture_logs(&unit).await?;
        self.wait_until_stopped(&unit).await?;
        Ok(())
    }

    /// Rewrites the configuration with overrides applied and restarts every
    /// connector unit, converging on all of them running.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] when config rendering, a restart, or a
    /// readiness wait fails.
    pub async fn reconfigure<'a, I>(&self, overrides: I) -> Result<(), OrchestrationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        ConnectorConfig::with_overrides(overrides).write(&self.config_path)?;
        self.restart_connector().await
    }

    /// Restarts every connector unit and converges on all of them running.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] when listing, restarting, or waiting
    /// on any unit fails.
    pub async fn restart_connector(&self) -> Result<(), OrchestrationError> {
        let units = self.controller.list_units(UNIT_PREFIX).await?;
        for unit in &units {
            self.controller.restart(unit).await?;
        }
        for unit in &units {
            self.wait_until_running(unit).await?;
        }
        Ok(())
    }

    /// Converges on the unit reporting a running state.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::Convergence`] with the last observed
    /// state when the unit never reaches running.
    pub async fn wait_until_running(&self, unit: &str) -> Result<(), OrchestrationError> {
        self.poller
            .run(|| async move {
                match self.controller.status(unit).await {
                    Ok(state) if state.is_running() => Ok(()),
                    Ok(state) => Err(format!("unit {unit} is {state}")),
                    Err(err) => Err(err.to_string()),
                }
            })
            .await?;
        Ok(())
    }

    /// Converges on the unit no longer reporting a running state.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError::Convergence`] when the unit is still
    /// running past the poller's budget.
    pub async fn wait_until_stopped(&self, unit: &str) -> Result<(), OrchestrationError> {
        self.poller
            .run(|| async move {
                match self.controller.status(unit).await {
                    Ok(state) if state.is_running() => {
                        Err(format!("unit {unit} is still running"))
                    }
                    Ok(_) => Ok(()),
                    Err(err) => Err(err.to_string()),
                }
            })
            .await?;
        Ok(())
    }

    /// Captures the unit's journal into the report directory.
    ///
    /// The `@` in templated unit names becomes `_` so the report file name
    /// stays shell-friendly.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] when log capture or the report write
    /// fails.
    pub async fn capture_logs(&self, unit: &str) -> Result<PathBuf, OrchestrationError> {
        let logs = self.controller.logs(unit).await?;
        let file = self.report_dir.join(format!("{}.log", unit.replace('@', "_")));
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|source| {
                OrchestrationError::Report {
                    path: file.clone(),
                    source,
                }
            })?;
        }
        tokio::fs::write(&file, logs).await.map_err(|source| OrchestrationError::Report {
            path: file.clone(),
            source,
        })?;
        Ok(file)
    }

    /// Converges on an HTTPS health endpoint answering 200.
    ///
    /// Used for the REST unit, whose systemd state goes running before the
    /// listener is actually serving. The probe accepts the mock topology's
    /// self-signed certificates.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestrationError`] when the client cannot be built or the
    /// endpoint never answers 200 within the poller's budget.
    pub async fn wait_until_healthy(&self, url: &str) -> Result<(), OrchestrationError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| OrchestrationError::Probe(err.to_string()))?;
        self.poller
            .run(|| {
                let request = client.get(url);
                async move {
                    match request.send().await {
                        Ok(response) if response.status().is_success() => Ok(()),
                        Ok(response) => Err(format!("health endpoint answered {}", response.status())),
                        Err(err) => Err(err.to_string()),
                    }
                }
            })
            .await?;
        Ok(())
    }
}
