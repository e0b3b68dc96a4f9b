// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Certificate synchronization: fetch, diff, write, validate and reload.

pub mod files;
pub mod reconciler;
pub mod reload;
pub mod scheduler;
pub mod source;

pub use files::{CertPaths, FileStore};
pub use reconciler::{PassSummary, Reconciler, TargetOutcome};
pub use reload::{CommandOutput, CommandRunner, DryRunRunner, ProcessReloader, ShellRunner};
pub use scheduler::{shutdown_signal, Scheduler, SchedulerState};
pub use source::{SecretData, SecretPayload, SecretSource};
