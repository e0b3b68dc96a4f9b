// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Renewal and failure counters exported on `/metrics`.

use crate::constants::metrics::{FAILURES_TOTAL, RENEWALS_TOTAL};
use prometheus::{IntCounter, Registry};

/// Process-wide counters written by the reconciler.
///
/// Cloning is cheap and clones share the same underlying counters.
#[derive(Debug, Clone)]
pub struct SyncMetrics {
    renewals: IntCounter,
    failures: IntCounter,
}

impl SyncMetrics {
    /// Create the counters and register them with `registry`
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let renewals = IntCounter::new(
            RENEWALS_TOTAL,
            "Number of times certificate files were renewed from a secret",
        )?;
        let failures = IntCounter::new(
            FAILURES_TOTAL,
            "Number of errors while syncing certificates or reloading nginx",
        )?;

        registry.register(Box::new(renewals.clone()))?;
        registry.register(Box::new(failures.clone()))?;

        Ok(Self { renewals, failures })
    }

    pub fn record_renewal(&self) {
        self.renewals.inc();
    }

    pub fn record_failure(&self) {
        self.failures.inc();
    }

    pub fn renewals(&self) -> u64 {
        self.renewals.get()
    }

    pub fn failures(&self) -> u64 {
        self.failures.get()
    }
}

/// Register process collector metrics (cpu, memory, fds) where supported
pub fn register_process_metrics(registry: &Registry) -> prometheus::Result<()> {
    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;
    #[cfg(not(target_os = "linux"))]
    let _ = registry;
    Ok(())
}
