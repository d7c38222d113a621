// crates/moneta-orchestration/tests/steps.rs
// ============================================================================
// Module: Orchestration Step Tests
// Description: Step coverage against an in-memory process controller.
// Purpose: Verify onboarding, offboarding, and reconfiguration flows.
// Dependencies: moneta-orchestration, tempfile, tokio
// ============================================================================

//! ## Overview
//! Drives the orchestration steps against a fake process controller that
//! records commands and converges units to running after a configurable
//! number of status polls.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use moneta_orchestration::Eventually;
use moneta_orchestration::Orchestrator;
use moneta_orchestration::ProcessController;
use moneta_orchestration::ProcessError;
use moneta_orchestration::RunState;
use moneta_orchestration::steps::import_unit;

/// Per-unit state the fake tracks.
#[derive(Debug, Clone, Default)]
struct FakeUnit {
    enabled: bool,
    started: bool,
    /// Status polls remaining before a started unit reports running.
    polls_until_running: u32,
}

/// In-memory process controller recording every command.
#[derive(Debug, Clone, Default)]
struct FakeController {
    units: Arc<Mutex<BTreeMap<String, FakeUnit>>>,
    commands: Arc<Mutex<Vec<String>>>,
    /// Polls a freshly started unit needs before running.
    warmup_polls: u32,
}

impl FakeController {
    fn with_warmup(warmup_polls: u32) -> Self {
        Self {
            warmup_polls,
            ..Self::default()
        }
    }

    fn record(&self, command: String) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().map(|commands| commands.clone()).unwrap_or_default()
    }

    fn seed_unit(&self, unit: &str) {
        if let Ok(mut units) = self.units.lock() {
            units.insert(
                unit.to_string(),
                FakeUnit {
                    enabled: true,
                    started: true,
                    polls_until_running: 0,
                },
            );
        }
    }

    fn mutate<F: FnOnce(&mut FakeUnit)>(&self, unit: &str, apply: F) {
        if let Ok(mut units) = self.units.lock() {
            apply(units.entry(unit.to_string()).or_default());
        }
    }
}

#[async_trait]
impl ProcessController for FakeController {
    async fn start(&self, unit: &str) -> Result<(), ProcessError> {
        self.record(format!("start {unit}"));
        let warmup = self.warmup_polls;
        self.mutate(unit, |state| {
            state.started = true;
            state.polls_until_running = warmup;
        });
        Ok(())
    }

    async fn stop(&self, unit: &str) -> Result<(), ProcessError> {
        self.record(format!("stop {unit}"));
        self.mutate(unit, |state| state.started = false);
        Ok(())
    }

    async fn restart(&self, unit: &str) -> Result<(), ProcessError> {
        self.record(format!("restart {unit}"));
        let warmup = self.warmup_polls;
        self.mutate(unit, |state| {
            state.started = true;
            state.polls_until_running = warmup;
        });
        Ok(())
    }

    async fn enable(&self, unit: &str) -> Result<(), ProcessError> {
        self.record(format!("enable {unit}"));
        self.mutate(unit, |state| state.enabled = true);
        Ok(())
    }

    async fn disable(&self, unit: &str) -> Result<(), ProcessError> {
        self.record(format!("disable {unit}"));
        self.mutate(unit, |state| state.enabled = false);
        Ok(())
    }

    async fn status(&self, unit: &str) -> Result<RunState, ProcessError> {
        let Ok(mut units) = self.units.lock() else {
            return Ok(RunState::Other("poisoned".to_string()));
        };
        let Some(state) = units.get_mut(unit) else {
            return Ok(RunState::Dead);
        };
        if !state.started {
            return Ok(RunState::Dead);
        }
        if state.polls_until_running > 0 {
            state.polls_until_running -= 1;
            return Ok(RunState::Other("start".to_string()));
        }
        Ok(RunState::Running)
    }

    async fn logs(&self, unit: &str) -> Result<Vec<u8>, ProcessError> {
        self.record(format!("logs {unit}"));
        Ok(format!("journal for {unit}\n").into_bytes())
    }

    async fn list_units(&self, prefix: &str) -> Result<Vec<String>, ProcessError> {
        let units = self.units.lock().map(|units| {
            units.keys().filter(|name| name.starts_with(prefix)).cloned().collect()
        });
        Ok(units.unwrap_or_default())
    }
}

fn fast_poller() -> Eventually {
    Eventually::within(Duration::from_secs(2)).interval(Duration::from_millis(10))
}

#[tokio::test(flavor = "multi_thread")]
async fn onboarding_writes_config_then_enables_and_starts() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("etc/init/moneta-sync.conf");
    let controller = FakeController::with_warmup(2);
    let orchestrator = Orchestrator::new(controller.clone(), &config_path, dir.path())
        .with_poller(fast_poller());

    orchestrator.onboard_tenant("alpha").await?;

    let rendered = std::fs::read_to_string(&config_path)?;
    if !rendered.contains("MONETA_SYNC_PARTNER_GATEWAY=https://127.0.0.1:4000") {
        return Err("config must point the connector at the partner mock".into());
    }
    let commands = controller.commands();
    let unit = import_unit("alpha");
    if commands != vec![format!("enable {unit}"), format!("start {unit}")] {
        return Err(format!("unexpected command order: {commands:?}").into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn offboarding_captures_logs_around_the_stop() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("moneta-sync.conf");
    let reports = dir.path().join("reports");
    let controller = FakeController::default();
    controller.seed_unit(&import_unit("alpha"));
    let orchestrator =
        Orchestrator::new(controller.clone(), &config_path, &reports).with_poller(fast_poller());

    orchestrator.offboard_tenant("alpha").await?;

    let commands = controller.commands();
    let unit = import_unit("alpha");
    let expected = vec![
        format!("logs {unit}"),
        format!("stop {unit}"),
        format!("disable {unit}"),
        format!("logs {unit}"),
    ];
    if commands != expected {
        return Err(format!("unexpected command order: {commands:?}").into());
    }
    let report = reports.join("moneta-sync-import_alpha.log");
    if !report.is_file() {
        return Err("offboarding must leave a captured log in the report dir".into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn reconfigure_rewrites_config_and_restarts_every_unit()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("moneta-sync.conf");
    let controller = FakeController::with_warmup(1);
    controller.seed_unit(&import_unit("alpha"));
    controller.seed_unit("moneta-sync-rest");
    let orchestrator = Orchestrator::new(controller.clone(), &config_path, dir.path())
        .with_poller(fast_poller());

    orchestrator.reconfigure([("SYNC_RATE", "1s")]).await?;

    let rendered = std::fs::read_to_string(&config_path)?;
    if !rendered.contains("MONETA_SYNC_SYNC_RATE=1s") {
        return Err("override must land in the rendered config".into());
    }
    let commands = controller.commands();
    let restarts: Vec<&String> =
        commands.iter().filter(|command| command.starts_with("restart ")).collect();
    if restarts.len() != 2 {
        return Err(format!("expected both units restarted, got {commands:?}").into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn waiting_on_a_unit_that_never_runs_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let controller = FakeController::default();
    let orchestrator = Orchestrator::new(controller, dir.path(), dir.path()).with_poller(
        Eventually::within(Duration::from_millis(200)).interval(Duration::from_millis(20)),
    );

    let result = orchestrator.wait_until_running("moneta-sync-import@ghost").await;
    let Err(err) = result else {
        return Err("expected a convergence timeout".into());
    };
    if !err.to_string().contains("moneta-sync-import@ghost") {
        return Err(format!("timeout should name the unit: {err}").into());
    }
    Ok(())
}
