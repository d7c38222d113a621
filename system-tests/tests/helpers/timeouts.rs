// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: System Test Timeouts
// Description: Centralized timeout configuration with env overrides.
// Purpose: Keep system-test timeouts consistent and configurable across suites.
// ============================================================================

use std::env;
use std::time::Duration;

/// Environment override for slow CI machines, in whole seconds.
const ENV_TIMEOUT_SECS: &str = "MONETA_SYSTEM_TEST_TIMEOUT_SEC";

/// Returns the effective timeout, honoring `MONETA_SYSTEM_TEST_TIMEOUT_SEC`
/// when set. The override acts as a minimum so it never shortens an
/// explicitly longer test timeout; unparseable values are ignored.
#[must_use]
pub fn resolve_timeout(requested: Duration) -> Duration {
    match env::var(ENV_TIMEOUT_SECS) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => std::cmp::max(requested, Duration::from_secs(secs)),
            _ => requested,
        },
        Err(_) => requested,
    }
}
