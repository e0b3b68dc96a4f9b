// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::MAX_INTERVAL_HOURS;
use crate::error::{Result as SyncResult, SyncError};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// One certificate kept in sync: a secret in the cluster and the file prefix it lands at
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTarget {
    pub secret_namespace: String,
    pub secret_name: String,
    /// Path prefix; `.crt` and `.key` are appended to it
    pub cert_path: String,
}

/// Sync configuration loaded once at startup from a JSON file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub certs: Vec<SyncTarget>,
    pub nginx_reload_cmd: String,
    pub nginx_test_cmd: String,
    pub trigger_interval_hours: u64,
}

impl SyncConfig {
    /// Read, parse and validate the sync configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Error reading sync config {}", path.display()))?;
        let config: SyncConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Error parsing sync config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.trigger_interval_hours == 0 {
            return Err(SyncError::Config(
                "triggerIntervalHours must be at least 1".to_string(),
            ));
        }
        if self.trigger_interval_hours > MAX_INTERVAL_HOURS {
            return Err(SyncError::Config(format!(
                "triggerIntervalHours must be at most {}",
                MAX_INTERVAL_HOURS
            )));
        }
        if self.nginx_test_cmd.trim().is_empty() {
            return Err(SyncError::Config("nginxTestCmd must not be empty".to_string()));
        }
        if self.nginx_reload_cmd.trim().is_empty() {
            return Err(SyncError::Config(
                "nginxReloadCmd must not be empty".to_string(),
            ));
        }

        let mut seen_paths = HashSet::new();
        for (i, target) in self.certs.iter().enumerate() {
            if target.secret_namespace.is_empty()
                || target.secret_name.is_empty()
                || target.cert_path.is_empty()
            {
                return Err(SyncError::Config(format!(
                    "certs[{}]: secretNamespace, secretName and certPath are required",
                    i
                )));
            }
            if !seen_paths.insert(target.cert_path.as_str()) {
                return Err(SyncError::Config(format!(
                    "certs[{}]: certPath {} is used by more than one target",
                    i, target.cert_path
                )));
            }
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.trigger_interval_hours.saturating_mul(3600))
    }
}
