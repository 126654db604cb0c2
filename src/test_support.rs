//! In-memory collaborators used by unit tests across services and routes.

use crate::{
    models::{credential::AccessCredential, notification::NotificationEnvelope, status::StatusSettings},
    services::{
        dispatcher::{DispatchError, NotificationDispatcher},
        identity_service::IdentityGate,
        object_reader::{ObjectReader, ReadError},
        status_source::{StatusError, StatusSource},
    },
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use axum::{
    Router,
    body::Bytes,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
};
use chrono::{Duration, Utc};
use serde_json::json;
use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::net::TcpListener;

/// Identity gate returning a fixed answer and counting exchanges.
pub struct FakeIdentity {
    grant: bool,
    calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn granting() -> Self {
        Self {
            grant: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn refusing() -> Self {
        Self {
            grant: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityGate for FakeIdentity {
    async fn acquire_credential(&self) -> Option<AccessCredential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.grant.then(|| AccessCredential {
            token: "test-token".into(),
            expires_at: Utc::now() + Duration::seconds(3600),
            scopes: BTreeSet::from(["scope/.default".to_string()]),
        })
    }
}

/// Object reader serving a fixed set of `(bucket, key)` objects and
/// recording every key it was asked for, in order.
#[derive(Default)]
pub struct FakeReader {
    objects: HashMap<(String, String), String>,
    requested: Mutex<Vec<String>>,
}

impl FakeReader {
    pub fn with(objects: &[(&str, &str, &str)]) -> Self {
        Self {
            objects: objects
                .iter()
                .map(|(bucket, key, body)| ((bucket.to_string(), key.to_string()), body.to_string()))
                .collect(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectReader for FakeReader {
    async fn read(&self, bucket: &str, key: &str) -> Option<String> {
        self.requested.lock().unwrap().push(key.to_string());
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

/// Status source returning a fixed snapshot, or failing.
pub struct FakeStatus {
    settings: Option<StatusSettings>,
    calls: AtomicUsize,
}

impl FakeStatus {
    pub fn with(settings: StatusSettings) -> Self {
        Self {
            settings: Some(settings),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            settings: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for FakeStatus {
    async fn current_status(&self) -> Result<StatusSettings, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.settings.clone().ok_or_else(|| {
            StatusError::Read(ReadError::ObjectNotFound {
                bucket: "status".into(),
                key: "status.json".into(),
            })
        })
    }
}

/// A push captured by [`FakeDispatcher`].
#[derive(Clone, Debug)]
pub struct Pushed {
    pub endpoint: String,
    pub connection_id: String,
    pub payload: Vec<u8>,
}

/// Dispatcher that records pushes, optionally failing them.
#[derive(Default)]
pub struct FakeDispatcher {
    fail: bool,
    pushed: Mutex<Vec<Pushed>>,
}

impl FakeDispatcher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            pushed: Mutex::new(Vec::new()),
        }
    }

    pub fn pushed(&self) -> Vec<Pushed> {
        self.pushed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for FakeDispatcher {
    async fn dispatch(
        &self,
        endpoint: &str,
        connection_id: &str,
        envelope: &NotificationEnvelope,
    ) -> Result<(), DispatchError> {
        self.pushed.lock().unwrap().push(Pushed {
            endpoint: endpoint.to_string(),
            connection_id: connection_id.to_string(),
            payload: envelope.to_bytes()?,
        });
        if self.fail {
            return Err(DispatchError::Gone(connection_id.to_string()));
        }
        Ok(())
    }
}

pub fn sample_settings() -> StatusSettings {
    serde_json::from_value(json!({
        "Level": "Information",
        "IntakeEnabled": true,
        "Buckets": ["intake-raw"]
    }))
    .unwrap()
}

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn serve_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// SDK configuration with static credentials and a fixed region, so no
/// provider chain lookups happen in tests.
pub async fn local_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            "AKIDTEST", "test-secret", None, None, "tests",
        ))
        .load()
        .await
}

/// A request received by a [`stub_endpoint`].
#[derive(Clone, Debug)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub body: Vec<u8>,
}

/// Serve the same canned response to every request and keep what arrived.
pub async fn stub_endpoint(
    status: StatusCode,
    headers: &[(&'static str, &'static str)],
    body: &[u8],
) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let mut header_map = HeaderMap::new();
    for &(name, value) in headers {
        header_map.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    let body = body.to_vec();
    let log = captured.clone();

    let router = Router::new().fallback(move |method: Method, uri: Uri, request_body: Bytes| {
        let log = log.clone();
        let header_map = header_map.clone();
        let body = body.clone();
        async move {
            log.lock().unwrap().push(Captured {
                method,
                path: uri.path().to_string(),
                body: request_body.to_vec(),
            });
            (status, header_map, body)
        }
    });

    (serve_router(router).await, captured)
}
