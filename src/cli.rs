// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::DEFAULT_LISTEN_ADDRESS;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Keeps nginx TLS certificates in sync with Kubernetes secrets
#[derive(Debug, Parser)]
#[command(name = "nginx-tls-sync", version)]
pub struct Cli {
    /// Path to the kubeconfig file; defaults to ~/.kube/config, then in-cluster config
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Path to the sync configuration JSON file
    #[arg(long, env = "SYNC_CONFIG", alias = "syncConfig")]
    pub sync_config: PathBuf,

    /// Address to serve /metrics on
    #[arg(long, env = "LISTEN_ADDRESS", default_value = DEFAULT_LISTEN_ADDRESS)]
    pub listen_address: SocketAddr,

    /// Log nginx test/reload commands instead of executing them
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["nginx-tls-sync", "--sync-config", "/etc/sync.json"]).unwrap();

        assert_eq!(cli.sync_config, PathBuf::from("/etc/sync.json"));
        assert_eq!(cli.listen_address, "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "nginx-tls-sync",
            "--kubeconfig",
            "/root/.kube/prod",
            "--syncConfig",
            "/etc/sync.json",
            "--listen-address",
            "127.0.0.1:9090",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.kubeconfig, Some(PathBuf::from("/root/.kube/prod")));
        assert_eq!(cli.sync_config, PathBuf::from("/etc/sync.json"));
        assert_eq!(cli.listen_address, "127.0.0.1:9090".parse().unwrap());
        assert!(cli.dry_run);
    }

    #[test]
    fn test_invalid_listen_address_rejected() {
        let result = Cli::try_parse_from([
            "nginx-tls-sync",
            "--sync-config",
            "/etc/sync.json",
            "--listen-address",
            "not-an-address",
        ]);
        assert!(result.is_err());
    }
}
