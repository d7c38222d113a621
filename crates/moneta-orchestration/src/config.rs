// crates/moneta-orchestration/src/config.rs
// ============================================================================
// Module: Connector Configuration
// Description: Render the environment file the connector units read.
// Purpose: Point the connector at the mocks with scenario overrides applied.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! The connector under test is configured through `MONETA_SYNC_*` environment
//! keys loaded from a drop-in file. [`ConnectorConfig`] owns the defaults of
//! the current deployment topology, merges scenario overrides, and renders
//! the file with a stable key order. The harness never validates these keys;
//! its only obligation is to present working mocks at the configured gateway
//! URLs.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix applied to every rendered key.
pub const ENV_PREFIX: &str = "MONETA_SYNC_";

/// Drop-in path the connector units read their environment from.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/init/moneta-sync.conf";

/// Default key/value pairs of the current topology, unprefixed.
const DEFAULTS: &[(&str, &str)] = &[
    ("STORAGE", "/data"),
    ("LOG_LEVEL", "DEBUG"),
    ("PARTNER_GATEWAY", "https://127.0.0.1:4000"),
    ("SYNC_RATE", "1h"),
    ("VAULT_GATEWAY", "https://127.0.0.1:4400"),
    ("LEDGER_GATEWAY", "https://127.0.0.1:4401"),
    ("METRICS_OUTPUT", "/reports/metrics.json"),
    ("LAKE_HOSTNAME", "127.0.0.1"),
    ("METRICS_REFRESHRATE", "1h"),
    ("HTTP_PORT", "443"),
    ("SECRETS", "/opt/moneta-sync/secrets"),
    ("ENCRYPTION_KEY", "/opt/moneta-sync/secrets/fs_encryption.key"),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure to write the rendered configuration.
#[derive(Debug, Error)]
#[error("failed to write connector config {path}: {source}")]
pub struct ConfigWriteError {
    /// Path the write targeted.
    pub path: PathBuf,
    /// Underlying io failure.
    #[source]
    pub source: std::io::Error,
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Connector environment, defaults merged with scenario overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Unprefixed key/value pairs, sorted by key.
    values: BTreeMap<String, String>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        let values = DEFAULTS
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        Self {
            values,
        }
    }
}

impl ConnectorConfig {
    /// Sets one unprefixed key, replacing any previous value.
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns the value for an unprefixed key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the defaults with `overrides` merged on top.
    #[must_use]
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in overrides {
            config.set(key, value);
        }
        config
    }

    /// Renders the environment file with prefixed keys in stable order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut rendered = String::new();
        for (key, value) in &self.values {
            rendered.push_str(ENV_PREFIX);
            rendered.push_str(key);
            rendered.push('=');
            rendered.push_str(value);
            rendered.push('\n');
        }
        rendered
    }

    /// Writes the rendered file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigWriteError`] when a directory or the file cannot be
    /// written.
    pub fn write(&self, path: &Path) -> Result<(), ConfigWriteError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigWriteError {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.render()).map_err(|source| ConfigWriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectorConfig;
    use super::ENV_PREFIX;

    #[test]
    fn defaults_point_at_the_local_mock_topology() {
        let config = ConnectorConfig::default();
        assert_eq!(config.get("PARTNER_GATEWAY"), Some("https://127.0.0.1:4000"));
        assert_eq!(config.get("VAULT_GATEWAY"), Some("https://127.0.0.1:4400"));
        assert_eq!(config.get("LEDGER_GATEWAY"), Some("https://127.0.0.1:4401"));
    }

    #[test]
    fn overrides_replace_defaults_without_duplicating_keys() {
        let config = ConnectorConfig::with_overrides([("SYNC_RATE", "1s"), ("EXTRA", "x")]);
        assert_eq!(config.get("SYNC_RATE"), Some("1s"));
        let rendered = config.render();
        assert_eq!(rendered.matches("MONETA_SYNC_SYNC_RATE=").count(), 1);
        assert!(rendered.contains("MONETA_SYNC_EXTRA=x\n"));
    }

    #[test]
    fn rendering_is_sorted_and_prefixed_once() {
        let rendered = ConnectorConfig::default().render();
        let mut lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 12);
        let original = lines.clone();
        lines.sort_unstable();
        assert_eq!(lines, original);
        for line in lines {
            assert!(line.starts_with(ENV_PREFIX));
            assert!(!line.trim_start_matches(ENV_PREFIX).starts_with(ENV_PREFIX));
        }
    }
}
