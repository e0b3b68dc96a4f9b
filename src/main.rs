// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::Parser;
use prometheus::Registry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use nginx_tls_sync::cli::Cli;
use nginx_tls_sync::config::SyncConfig;
use nginx_tls_sync::kubernetes::{create_client, KubeSecretSource};
use nginx_tls_sync::metrics::{register_process_metrics, SyncMetrics};
use nginx_tls_sync::server;
use nginx_tls_sync::sync::{
    shutdown_signal, CommandRunner, DryRunRunner, FileStore, ProcessReloader, Reconciler,
    Scheduler, ShellRunner,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        error!("Fatal: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting nginx-tls-sync");

    // Load configuration
    let config = SyncConfig::from_file(&cli.sync_config)?;
    info!(
        "Configuration loaded: {} certificates, every {} hours",
        config.certs.len(),
        config.trigger_interval_hours
    );
    if config.certs.is_empty() {
        warn!("No certificates configured, passes will do nothing");
    }

    // Create Kubernetes client
    let client = create_client(cli.kubeconfig.as_deref())
        .await
        .context("Failed to create Kubernetes client")?;

    let registry = Registry::new();
    register_process_metrics(&registry).context("Failed to register process metrics")?;
    let metrics = SyncMetrics::new(&registry).context("Failed to register sync metrics")?;

    let runner: Arc<dyn CommandRunner> = if cli.dry_run {
        warn!("Dry run enabled, nginx commands will not be executed");
        Arc::new(DryRunRunner)
    } else {
        Arc::new(ShellRunner)
    };

    let reconciler = Reconciler::new(
        Arc::new(KubeSecretSource::new(client)),
        FileStore::new(),
        ProcessReloader::new(runner, config.nginx_test_cmd.clone(), config.nginx_reload_cmd.clone()),
        metrics,
    );
    let interval = config.interval();
    let scheduler = Scheduler::new(reconciler, config.certs, interval);

    let listener = TcpListener::bind(cli.listen_address)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen_address))?;

    // The scheduler stops on SIGINT/SIGTERM; the metrics server only ends on error
    tokio::select! {
        res = server::serve(listener, registry) => {
            res.context("Metrics server failed")?;
            warn!("Metrics server stopped unexpectedly");
        }
        res = scheduler.run(shutdown_signal()) => {
            res.context("Certificate sync aborted")?;
        }
    }

    info!("Shut down cleanly");
    Ok(())
}
