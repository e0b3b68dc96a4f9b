// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Validate-then-reload of the nginx process consuming the certificates.

use crate::constants::SHELL;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, error, info, instrument};

/// Result of running a single shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// stdout followed by stderr
    pub output: String,
}

/// Executes shell command strings
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> CommandOutput;
}

/// Runs commands through `bash -c`; success means a zero exit status
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> CommandOutput {
        match Command::new(SHELL).arg("-c").arg(command).output().await {
            Ok(out) => {
                let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
                output.push_str(&String::from_utf8_lossy(&out.stderr));
                CommandOutput {
                    success: out.status.success(),
                    output,
                }
            }
            Err(e) => CommandOutput {
                success: false,
                output: format!("failed to spawn {}: {}", SHELL, e),
            },
        }
    }
}

/// Never executes anything; every command succeeds and echoes itself back
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &str) -> CommandOutput {
        info!("Dry run, not executing: {}", command);
        CommandOutput {
            success: true,
            output: format!("Output of command: {}", command),
        }
    }
}

/// How a validate-then-reload attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded,
    /// Config test failed; reload was not attempted
    TestFailed,
    /// Config test passed but the reload command failed
    ReloadFailed,
}

/// Runs the nginx config test and, only if it passes, the reload command
#[derive(Clone)]
pub struct ProcessReloader {
    runner: Arc<dyn CommandRunner>,
    test_cmd: String,
    reload_cmd: String,
}

impl ProcessReloader {
    pub fn new(runner: Arc<dyn CommandRunner>, test_cmd: String, reload_cmd: String) -> Self {
        Self {
            runner,
            test_cmd,
            reload_cmd,
        }
    }

    #[instrument(skip(self))]
    pub async fn validate_then_reload(&self) -> ReloadOutcome {
        let test = self.runner.run(&self.test_cmd).await;
        if !test.success {
            error!("Nginx config test failed, not reloading: {}", test.output.trim());
            return ReloadOutcome::TestFailed;
        }
        info!("Nginx config test succeeded");
        debug!("{}", test.output.trim());

        let reload = self.runner.run(&self.reload_cmd).await;
        if !reload.success {
            error!("Nginx reload failed: {}", reload.output.trim());
            return ReloadOutcome::ReloadFailed;
        }
        info!("Nginx reloaded successfully");
        debug!("{}", reload.output.trim());

        ReloadOutcome::Reloaded
    }
}

impl std::fmt::Debug for ProcessReloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessReloader")
            .field("test_cmd", &self.test_cmd)
            .field("reload_cmd", &self.reload_cmd)
            .finish_non_exhaustive()
    }
}
