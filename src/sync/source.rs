// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Where certificate material comes from, and how it is picked out of a secret.

use crate::constants::secret_keys::{CERT_SUFFIX, KEY_SUFFIX};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::warn;

/// Raw data of a fetched secret, keyed by data key
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Fetches a named secret from a namespace
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData>;
}

/// Certificate and key bytes extracted from a secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPayload {
    pub certificate: Vec<u8>,
    pub key: Vec<u8>,
}

impl SecretPayload {
    /// Pick the certificate and key out of a secret by key suffix.
    ///
    /// When several keys share a suffix the last one in key order wins, so a
    /// cert-manager secret holding both `ca.crt` and `tls.crt` yields `tls.crt`.
    /// Both payloads must be non-empty.
    pub fn from_data(data: &SecretData) -> Result<Self> {
        let certificate = last_with_suffix(data, CERT_SUFFIX);
        let key = last_with_suffix(data, KEY_SUFFIX);

        match (certificate, key) {
            (Some(certificate), Some(key)) if !certificate.is_empty() && !key.is_empty() => {
                Ok(Self {
                    certificate: certificate.clone(),
                    key: key.clone(),
                })
            }
            _ => Err(SyncError::InvalidSecret(format!(
                "expected non-empty '*{}' and '*{}' entries, found keys [{}]",
                CERT_SUFFIX,
                KEY_SUFFIX,
                data.keys().cloned().collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

fn last_with_suffix<'a>(data: &'a SecretData, suffix: &str) -> Option<&'a Vec<u8>> {
    let matches: Vec<(&String, &Vec<u8>)> =
        data.iter().filter(|(k, _)| k.ends_with(suffix)).collect();

    if matches.len() > 1 {
        let ignored: Vec<&str> = matches[..matches.len() - 1]
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        warn!(
            "Multiple secret keys end with '{}', using '{}' and ignoring {:?}",
            suffix,
            matches[matches.len() - 1].0,
            ignored
        );
    }

    matches.last().map(|(_, v)| *v)
}
