#![allow(dead_code)]

use async_trait::async_trait;
use sgw_mock::domain::api_request::ApiRequestDocument;
use sgw_mock::domain::client::{ClientCreationRequest, CreateClientResponse};
use sgw_mock::domain::ports::{ApiRequestStore, ClientProvisioner};
use sgw_mock::error::{GatewayError, Result};
use sgw_mock::infrastructure::in_memory::InMemoryDocumentStore;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

pub const REQUEST_DATA: &str = r#"{
    "clientId": {"documentTypeId": 1, "documentKey": "A1"},
    "clientBio": {"firstname": "Jane", "lastname": "Doe", "locale": "en", "primaryPhoneNumber": "+254700000000"},
    "clientAddress": {"city": "Nairobi", "street": "Moi Avenue"}
}"#;

/// Store holding a single PENDING document.
pub async fn store_with(id: &str, request_data: &str) -> InMemoryDocumentStore {
    let store = InMemoryDocumentStore::new();
    store
        .upsert(id, &ApiRequestDocument::new(id, request_data))
        .await
        .unwrap();
    store
}

/// Provisioner returning a fixed account number, or failing when `None`.
pub struct FixedProvisioner(pub Option<&'static str>);

#[async_trait]
impl ClientProvisioner for FixedProvisioner {
    async fn create_client(&self, _: &ClientCreationRequest) -> Result<CreateClientResponse> {
        match self.0 {
            Some(account_no) => Ok(CreateClientResponse {
                account_no: account_no.to_string(),
                ..CreateClientResponse::default()
            }),
            None => Err(GatewayError::remote(Some(500), "core banking unavailable")),
        }
    }
}

/// Provisioner that holds every call until released; each release lets one
/// call through.
pub struct GatedProvisioner {
    gate: Semaphore,
    pub calls: AtomicUsize,
}

impl Default for GatedProvisioner {
    fn default() -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

impl GatedProvisioner {
    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl ClientProvisioner for GatedProvisioner {
    async fn create_client(&self, _: &ClientCreationRequest) -> Result<CreateClientResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.acquire().await.unwrap().forget();
        Ok(CreateClientResponse {
            account_no: "000000007".to_string(),
            ..CreateClientResponse::default()
        })
    }
}

/// Wraps an in-memory store and rejects writes once `writes_allowed` is used up.
pub struct FlakyStore {
    pub inner: InMemoryDocumentStore,
    writes_allowed: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: InMemoryDocumentStore, writes_allowed: usize) -> Self {
        Self {
            inner,
            writes_allowed: AtomicUsize::new(writes_allowed),
        }
    }
}

#[async_trait]
impl ApiRequestStore for FlakyStore {
    async fn get(&self, id: &str) -> Result<ApiRequestDocument> {
        self.inner.get(id).await
    }

    async fn upsert(&self, id: &str, document: &ApiRequestDocument) -> Result<()> {
        let remaining = self
            .writes_allowed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if remaining.is_err() {
            return Err(GatewayError::PersistFailed {
                id: id.to_string(),
                reason: "write rejected".to_string(),
            });
        }
        self.inner.upsert(id, document).await
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
