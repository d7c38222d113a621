// crates/moneta-orchestration/src/metrics.rs
// ============================================================================
// Module: Metrics Assertions
// Description: Convergence-polled checks over the connector's metrics file.
// Purpose: Assert metric publication without racing the refresh interval.
// Dependencies: serde_json, tokio
// ============================================================================

//! ## Overview
//! The connector publishes metrics as a JSON file on a refresh interval, so
//! scenarios must poll for it rather than assert immediately. These helpers
//! wrap the checks in the convergence poller and compare key sets exactly.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::eventually::ConvergenceError;
use crate::eventually::Eventually;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// One failed metrics check, re-evaluated on every poll attempt.
#[derive(Debug, Error)]
enum MetricsCheckError {
    /// The file does not exist yet or cannot be read.
    #[error("metrics file {path} not readable: {detail}")]
    Unreadable {
        /// Path polled.
        path: String,
        /// Underlying failure description.
        detail: String,
    },
    /// The file exists but is not a JSON object.
    #[error("metrics file {path} is not a json object")]
    NotAnObject {
        /// Path polled.
        path: String,
    },
    /// The key set differs from the expectation.
    #[error("metrics file {path} keys {actual:?} != expected {expected:?}")]
    KeysMismatch {
        /// Path polled.
        path: String,
        /// Keys the file actually carries, sorted.
        actual: Vec<String>,
        /// Keys the scenario expects, sorted.
        expected: Vec<String>,
    },
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Waits until the metrics file exists.
///
/// # Errors
///
/// Returns [`ConvergenceError`] when the file never materializes within the
/// poller's budget.
pub async fn wait_for_file(poller: &Eventually, path: &Path) -> Result<(), ConvergenceError> {
    let display = path.display().to_string();
    poller.run_until(&format!("file {display} exists"), || {
        let exists = path.is_file();
        async move { exists }
    })
    .await
}

/// Waits until the metrics file holds exactly the expected key set.
///
/// # Errors
///
/// Returns [`ConvergenceError`] carrying the last mismatch once the poller's
/// budget is spent.
pub async fn wait_for_keys(
    poller: &Eventually,
    path: &Path,
    expected: &[&str],
) -> Result<(), ConvergenceError> {
    let mut expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
    expected.sort_unstable();
    poller.run(|| {
        let expected = expected.clone();
        async move { check_keys(path, &expected) }
    })
    .await
}

/// Reads the file and compares its sorted key set to `expected`.
fn check_keys(path: &Path, expected: &[String]) -> Result<(), MetricsCheckError> {
    let display = path.display().to_string();
    let raw = std::fs::read(path).map_err(|err| MetricsCheckError::Unreadable {
        path: display.clone(),
        detail: err.to_string(),
    })?;
    let value: Value = serde_json::from_slice(&raw).map_err(|err| MetricsCheckError::Unreadable {
        path: display.clone(),
        detail: err.to_string(),
    })?;
    let Some(object) = value.as_object() else {
        return Err(MetricsCheckError::NotAnObject {
            path: display,
        });
    };
    let mut actual: Vec<String> = object.keys().cloned().collect();
    actual.sort_unstable();
    if actual == expected {
        Ok(())
    } else {
        Err(MetricsCheckError::KeysMismatch {
            path: display,
            actual,
            expected: expected.to_vec(),
        })
    }
}

/// Returns the file's permission bits as a four-digit octal string.
///
/// # Errors
///
/// Returns the underlying io error when the file cannot be inspected.
#[cfg(unix)]
pub fn file_permissions(path: &Path) -> Result<String, std::io::Error> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode();
    Ok(format!("{:04o}", mode & 0o7777))
}
