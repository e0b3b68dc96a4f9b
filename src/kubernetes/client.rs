// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation from a kubeconfig file or the ambient environment

use crate::error::{Result, SyncError};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Create a client from `kubeconfig` if given, otherwise from `~/.kube/config`
/// when present, otherwise inferred (in-cluster service account)
#[instrument]
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client> {
    let path = kubeconfig
        .map(Path::to_path_buf)
        .or_else(|| default_kubeconfig_path().filter(|p| p.exists()));

    match path {
        Some(path) => {
            info!("Using kubeconfig {}", path.display());
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                SyncError::Kubeconfig(format!("Failed to read {}: {}", path.display(), e))
            })?;
            create_client_from_kubeconfig(&raw).await
        }
        None => {
            info!("No kubeconfig found, inferring cluster configuration");
            Client::try_default().await.map_err(|e| {
                SyncError::Kubeconfig(format!("Failed to infer config: {}", e))
            })
        }
    }
}

/// `$HOME/.kube/config`, if a home directory is known
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".kube").join("config"))
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let client_config = config_from_kubeconfig(kubeconfig).await?;

    Client::try_from(client_config)
        .map_err(|e| SyncError::Kubeconfig(format!("Failed to create client: {}", e)))
}

async fn config_from_kubeconfig(kubeconfig: &str) -> Result<kube::Config> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| SyncError::Kubeconfig(format!("Failed to parse kubeconfig: {}", e)))?;

    kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
        .await
        .map_err(|e| SyncError::Kubeconfig(format!("Failed to create config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
- name: test
  cluster:
    server: https://127.0.0.1:6443
    insecure-skip-tls-verify: true
contexts:
- name: test
  context:
    cluster: test
    user: test
current-context: test
users:
- name: test
  user:
    token: abc123
"#;

    #[tokio::test]
    async fn test_config_from_kubeconfig() {
        let config = config_from_kubeconfig(KUBECONFIG).await.unwrap();

        assert_eq!(config.cluster_url.host(), Some("127.0.0.1"));
        assert_eq!(config.cluster_url.port_u16(), Some(6443));
        assert!(config.accept_invalid_certs);
    }

    #[tokio::test]
    async fn test_kubeconfig_without_current_context_is_error() {
        let raw = KUBECONFIG.replace("current-context: test", "current-context: other");
        assert!(config_from_kubeconfig(&raw).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_file_is_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = create_client(Some(&dir.path().join("nope"))).await.err().unwrap();
        assert!(matches!(err, SyncError::Kubeconfig(_)));
    }

    #[tokio::test]
    async fn test_malformed_kubeconfig_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"clusters: [unterminated").unwrap();

        let err = create_client(Some(file.path())).await.err().unwrap();
        assert!(err.to_string().contains("Failed to parse kubeconfig"));
    }
}
