// system-tests/tests/metrics.rs
// ============================================================================
// Module: Metrics Publication Suite
// Description: Convergence-polled assertions over a published metrics file.
// Purpose: Verify scenarios can wait on metrics without racing the refresh.
// Dependencies: moneta-orchestration, tempfile, tokio
// ============================================================================

//! ## Overview
//! The connector publishes its metrics file on a refresh interval, so
//! scenarios poll for it instead of asserting immediately. These scenarios
//! stand in for the connector with a delayed writer task and drive the same
//! polling helpers the real suites use.

mod helpers;

use std::time::Duration;

use moneta_orchestration::Eventually;
use moneta_orchestration::metrics;
use serde_json::json;
use system_tests::IMPORT_METRIC_KEYS;

use crate::helpers::timeouts::resolve_timeout;

fn scenario_poller() -> Eventually {
    Eventually::within(resolve_timeout(Duration::from_secs(2)))
        .interval(Duration::from_millis(25))
}

#[tokio::test(flavor = "multi_thread")]
async fn metrics_file_published_late_still_converges() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("metrics.json");

    // Stand-in for the connector's metrics refresh: the file shows up only
    // after a few poll attempts have already failed.
    let writer_path = path.clone();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        let body = json!({
            "createdTokens": 1,
            "deletedTokens": 0,
            "importedTransactions": 5,
            "importedTransfers": 5,
        });
        std::fs::write(&writer_path, body.to_string())
    });

    let poller = scenario_poller();
    metrics::wait_for_file(&poller, &path).await?;
    metrics::wait_for_keys(&poller, &path, IMPORT_METRIC_KEYS).await?;
    writer.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn extra_metric_keys_fail_the_wait_with_the_offender_named()
-> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("metrics.json");
    std::fs::write(
        &path,
        json!({
            "createdTokens": 0,
            "deletedTokens": 0,
            "importedTransactions": 0,
            "importedTransfers": 0,
            "surprise": 1,
        })
        .to_string(),
    )?;

    let poller = Eventually::within(Duration::from_millis(200)).interval(Duration::from_millis(25));
    let result = metrics::wait_for_keys(&poller, &path, IMPORT_METRIC_KEYS).await;
    let Err(err) = result else {
        return Err("an unexpected key must fail the wait".into());
    };
    if !err.last_error.contains("surprise") {
        return Err(format!("timeout should name the unexpected key: {err}").into());
    }
    Ok(())
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn published_metrics_file_is_world_readable() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("metrics.json");
    std::fs::write(&path, "{}")?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;

    if metrics::file_permissions(&path)? != "0644" {
        return Err("metrics file must stay world-readable".into());
    }
    Ok(())
}
