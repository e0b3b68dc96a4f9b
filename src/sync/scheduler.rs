// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval driver for reconciliation passes.

use crate::config::SyncTarget;
use crate::error::Result;
use crate::sync::reconciler::Reconciler;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Shutdown,
}

/// Runs a pass immediately and then once per interval until shut down.
///
/// Passes run inline on the scheduler's own task, so two passes never overlap.
/// A pass that is still running when the next tick is due is not cancelled; a
/// warning is logged for every interval it overruns.
pub struct Scheduler {
    reconciler: Reconciler,
    targets: Vec<SyncTarget>,
    interval: Duration,
    state: watch::Sender<SchedulerState>,
    overruns: watch::Sender<u64>,
}

impl Scheduler {
    pub fn new(reconciler: Reconciler, targets: Vec<SyncTarget>, interval: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        let (overruns, _) = watch::channel(0);
        Self {
            reconciler,
            targets,
            interval,
            state,
            overruns,
        }
    }

    pub fn state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Number of times a tick came due while a pass was still running
    pub fn overruns(&self) -> watch::Receiver<u64> {
        self.overruns.subscribe()
    }

    /// Tick until `shutdown` resolves. A pass in flight when it resolves runs to
    /// completion first. Returns an error only when a pass hit a fatal error.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        self.state.send_replace(SchedulerState::Running);
        info!(
            "Scheduler running: {} targets every {:?}",
            self.targets.len(),
            self.interval
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            let mut next_due = started + self.interval;
            let pass = self.reconciler.run_pass(&self.targets);
            tokio::pin!(pass);

            let result = loop {
                tokio::select! {
                    result = &mut pass => break result,
                    _ = time::sleep_until(next_due) => {
                        warn!(
                            "Pass still running after {:?}, past the {:?} interval",
                            started.elapsed(),
                            self.interval
                        );
                        self.overruns.send_modify(|n| *n += 1);
                        next_due += self.interval;
                    }
                }
            };

            if let Err(e) = result {
                error!("Aborting after fatal error during pass: {}", e);
                self.state.send_replace(SchedulerState::Shutdown);
                return Err(e);
            }
        }

        self.state.send_replace(SchedulerState::Shutdown);
        info!("Scheduler stopped");
        Ok(())
    }
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
