// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Certificate secrets read from the cluster API

use crate::error::{Result, SyncError};
use crate::sync::source::{SecretData, SecretSource};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::{debug, instrument};

/// [`SecretSource`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretSource {
    client: Client,
}

impl KubeSecretSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretSource for KubeSecretSource {
    #[instrument(skip(self))]
    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let secret = secrets.get(name).await.map_err(|e| SyncError::SecretFetch {
            namespace: namespace.to_string(),
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let data: SecretData = secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, v.0))
            .collect();

        debug!("Fetched secret with keys {:?}", data.keys().collect::<Vec<_>>());
        Ok(data)
    }
}
