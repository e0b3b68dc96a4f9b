// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the Kubernetes API, secret sources and command runners.

use crate::error::{Result, SyncError};
use crate::sync::reload::{CommandOutput, CommandRunner};
use crate::sync::source::{SecretData, SecretSource};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses for GET requests.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<String, (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let response = if req.method() == http::Method::GET {
            self.responses
                .lock()
                .unwrap()
                .get(req.uri().path())
                .cloned()
        } else {
            None
        };

        Box::pin(async move {
            let (status, body) = response
                .unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock Secret JSON response; values are base64 encoded by ByteString
pub fn secret_json(namespace: &str, name: &str, data: &[(&str, &[u8])]) -> String {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.to_vec())))
                .collect::<BTreeMap<_, _>>(),
        ),
        type_: Some("kubernetes.io/tls".to_string()),
        ..Default::default()
    };

    let mut value = serde_json::to_value(&secret).unwrap();
    value["apiVersion"] = "v1".into();
    value["kind"] = "Secret".into();
    value.to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// In-memory secret store; unknown secrets fail to fetch
#[derive(Default)]
pub struct FakeSecrets {
    secrets: Mutex<HashMap<(String, String), SecretData>>,
    fetches: AtomicUsize,
}

impl FakeSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, namespace: &str, name: &str, entries: &[(&str, &str)]) -> Self {
        self.set_secret(namespace, name, entries);
        self
    }

    /// Insert or replace a secret
    pub fn set_secret(&self, namespace: &str, name: &str, entries: &[(&str, &str)]) {
        let data = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect();
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), data);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretSource for FakeSecrets {
    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SyncError::SecretFetch {
                namespace: namespace.to_string(),
                name: name.to_string(),
                reason: "secrets not found".to_string(),
            })
    }
}

/// Records every command; commands marked as failing report a non-zero exit
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self, command: &str) -> Self {
        self.set_failing(command, true);
        self
    }

    pub fn set_failing(&self, command: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(command.to_string());
        } else {
            set.remove(command);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &str) -> CommandOutput {
        self.calls.lock().unwrap().push(command.to_string());
        let success = !self.failing.lock().unwrap().contains(command);
        CommandOutput {
            success,
            output: if success {
                String::new()
            } else {
                format!("{}: exited with status 1", command)
            },
        }
    }
}
