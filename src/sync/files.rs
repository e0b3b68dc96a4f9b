// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! On-disk certificate and key files consumed by nginx.

use crate::constants::files::{CERT_EXTENSION, DIR_MODE, FILE_MODE, KEY_EXTENSION};
use crate::error::{Result, SyncError};
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Certificate and key file locations derived from a target's `certPath`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl CertPaths {
    /// Append `.crt` / `.key` to the prefix; an existing extension is kept
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            cert: with_suffix(prefix, CERT_EXTENSION),
            key: with_suffix(prefix, KEY_EXTENSION),
        }
    }
}

fn with_suffix(prefix: &str, suffix: &str) -> PathBuf {
    let mut path = OsString::from(prefix);
    path.push(suffix);
    PathBuf::from(path)
}

/// Reads and replaces certificate files.
///
/// The reconciler is the only writer, and every write replaces the whole file.
#[derive(Debug, Clone, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }

    /// Read a file, returning `Ok(None)` when it does not exist.
    ///
    /// Any other I/O failure is returned as [`SyncError::FileRead`].
    pub fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SyncError::FileRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Whether `path` is absent or holds bytes different from `desired`
    pub fn differs(&self, path: &Path, desired: &[u8]) -> Result<bool> {
        Ok(match self.read(path)? {
            Some(current) => current != desired,
            None => true,
        })
    }

    /// Create missing parent directories, then replace the file's content
    pub fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let to_write_error = |source| SyncError::FileWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent).map_err(to_write_error)?;
        }

        let mut file = open_for_replace(path).map_err(to_write_error)?;
        file.write_all(bytes).map_err(to_write_error)?;
        file.sync_all().map_err(to_write_error)?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn create_dir_all(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
}

#[cfg(not(unix))]
fn create_dir_all(dir: &Path) -> std::io::Result<()> {
    let _ = DIR_MODE;
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn open_for_replace(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_replace(path: &Path) -> std::io::Result<fs::File> {
    let _ = FILE_MODE;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
