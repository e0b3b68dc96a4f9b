// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Secret data key conventions
pub mod secret_keys {
    /// Keys ending with this suffix hold the certificate chain
    pub const CERT_SUFFIX: &str = "crt";
    /// Keys ending with this suffix hold the private key
    pub const KEY_SUFFIX: &str = "key";
}

/// On-disk layout of synced certificate material
pub mod files {
    /// Appended to a target's `certPath` for the certificate file
    pub const CERT_EXTENSION: &str = ".crt";
    /// Appended to a target's `certPath` for the private key file
    pub const KEY_EXTENSION: &str = ".key";
    /// Mode for directories created on the way to a certificate (rwxrwx---)
    pub const DIR_MODE: u32 = 0o770;
    /// Mode for newly created certificate and key files (rw-r--r--)
    pub const FILE_MODE: u32 = 0o644;
}

/// Prometheus metric names
pub mod metrics {
    pub const RENEWALS_TOTAL: &str = "cert_sync_renewals_total";
    pub const FAILURES_TOTAL: &str = "cert_sync_failures_total";
}

/// Longest accepted `triggerIntervalHours` (one leap year)
pub const MAX_INTERVAL_HOURS: u64 = 24 * 366;

/// Shell used to execute nginx test/reload commands
pub const SHELL: &str = "bash";

/// Default address for the metrics endpoint
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";
