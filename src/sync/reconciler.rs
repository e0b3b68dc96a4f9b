// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Diff-and-renew of on-disk certificates against their secrets.

use crate::config::SyncTarget;
use crate::error::Result;
use crate::metrics::SyncMetrics;
use crate::sync::files::{CertPaths, FileStore};
use crate::sync::reload::{ProcessReloader, ReloadOutcome};
use crate::sync::source::{SecretPayload, SecretSource};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// What happened to one target during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Files already match the secret
    Current,
    /// Files were rewritten and nginx reloaded
    Renewed,
    FetchFailed,
    InvalidSecret,
    WriteFailed,
    /// Files were rewritten but the nginx config test failed
    TestFailed,
    /// Files were rewritten (or already current) but reloading nginx failed
    ReloadFailed,
    /// Files were already current and a previously failed reload now succeeded
    Reloaded,
}

impl TargetOutcome {
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Current | Self::Renewed | Self::Reloaded)
    }
}

/// Per-pass tally, logged when a pass ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub current: usize,
    pub renewed: usize,
    pub failed: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: TargetOutcome) {
        match outcome {
            TargetOutcome::Renewed => self.renewed += 1,
            o if o.is_failure() => self.failed += 1,
            _ => self.current += 1,
        }
    }
}

/// Keeps certificate files in step with their secrets and reloads nginx on change.
///
/// A pass never stops early on a per-target failure. The only error a pass
/// returns is a failed read of an existing certificate file, which the caller
/// treats as fatal.
pub struct Reconciler {
    source: Arc<dyn SecretSource>,
    files: FileStore,
    reloader: ProcessReloader,
    metrics: SyncMetrics,
    /// Targets whose files are on disk but whose reload has not yet succeeded.
    /// A reload is process-wide, so any successful reload clears every entry.
    pending_reload: HashSet<String>,
}

impl Reconciler {
    pub fn new(
        source: Arc<dyn SecretSource>,
        files: FileStore,
        reloader: ProcessReloader,
        metrics: SyncMetrics,
    ) -> Self {
        Self {
            source,
            files,
            reloader,
            metrics,
            pending_reload: HashSet::new(),
        }
    }

    /// Reconcile every target in order, one at a time
    pub async fn run_pass(&mut self, targets: &[SyncTarget]) -> Result<PassSummary> {
        let mut summary = PassSummary::default();

        for target in targets {
            let outcome = self.reconcile_target(target).await?;
            summary.record(outcome);
        }

        info!(
            "Pass complete: {} current, {} renewed, {} failed",
            summary.current, summary.renewed, summary.failed
        );
        Ok(summary)
    }

    #[instrument(
        skip(self, target),
        fields(
            secret = %format!("{}/{}", target.secret_namespace, target.secret_name),
            cert_path = %target.cert_path
        )
    )]
    pub async fn reconcile_target(&mut self, target: &SyncTarget) -> Result<TargetOutcome> {
        let data = match self
            .source
            .fetch(&target.secret_namespace, &target.secret_name)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                self.fail(format_args!("Get secret failed: {}", e));
                return Ok(TargetOutcome::FetchFailed);
            }
        };

        let payload = match SecretPayload::from_data(&data) {
            Ok(payload) => payload,
            Err(e) => {
                self.fail(format_args!(
                    "Secret {}/{} is unusable: {}",
                    target.secret_namespace, target.secret_name, e
                ));
                return Ok(TargetOutcome::InvalidSecret);
            }
        };

        let paths = CertPaths::from_prefix(&target.cert_path);
        // Both files are checked so a broken read surfaces even when the other file changed
        let cert_changed = self.files.differs(&paths.cert, &payload.certificate)?;
        let key_changed = self.files.differs(&paths.key, &payload.key)?;

        if !cert_changed && !key_changed {
            if self.pending_reload.contains(&target.cert_path) {
                info!("Certificates are current, retrying the previously failed reload");
                return Ok(self.validate_then_reload(target, TargetOutcome::Reloaded).await);
            }
            info!("Certificates are all current");
            return Ok(TargetOutcome::Current);
        }

        info!(
            "Renewing certificates (certificate changed: {}, key changed: {})",
            cert_changed, key_changed
        );

        for (path, bytes) in [(&paths.cert, &payload.certificate), (&paths.key, &payload.key)] {
            if let Err(e) = self.files.write(path, bytes) {
                self.fail(format_args!("{}", e));
                return Ok(TargetOutcome::WriteFailed);
            }
        }
        self.metrics.record_renewal();

        Ok(self.validate_then_reload(target, TargetOutcome::Renewed).await)
    }

    async fn validate_then_reload(
        &mut self,
        target: &SyncTarget,
        on_success: TargetOutcome,
    ) -> TargetOutcome {
        match self.reloader.validate_then_reload().await {
            ReloadOutcome::Reloaded => {
                self.pending_reload.clear();
                on_success
            }
            ReloadOutcome::TestFailed => {
                self.pending_reload.remove(&target.cert_path);
                self.metrics.record_failure();
                TargetOutcome::TestFailed
            }
            ReloadOutcome::ReloadFailed => {
                warn!("Reload will be retried on the next pass");
                self.pending_reload.insert(target.cert_path.clone());
                self.metrics.record_failure();
                TargetOutcome::ReloadFailed
            }
        }
    }

    fn fail(&self, message: std::fmt::Arguments<'_>) {
        self.metrics.record_failure();
        error!("{}", message);
    }
}
