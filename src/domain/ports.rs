use super::api_request::ApiRequestDocument;
use super::client::{ClientCreationRequest, ClientRecord, CreateClientResponse};
use super::sync_document::{ClientDocument, GroupDocument};
use super::user::SyncGatewayUser;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Writes collection holding queued API requests.
///
/// Documents are keyed by the id they were requested under, whatever the
/// body's own `id` says. `get` fails with `NotFound` for unknown ids; `upsert`
/// replaces the whole document stored at `id`.
#[async_trait]
pub trait ApiRequestStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<ApiRequestDocument>;
    async fn upsert(&self, id: &str, document: &ApiRequestDocument) -> Result<()>;
}

/// Reads collection replicated to devices.
#[async_trait]
pub trait SyncDocumentStore: Send + Sync {
    async fn upsert_client(&self, client: &ClientDocument) -> Result<()>;
    async fn upsert_group(&self, group: &GroupDocument) -> Result<()>;
    async fn get_client(&self, id: &str) -> Result<ClientDocument>;
    async fn get_group(&self, id: &str) -> Result<GroupDocument>;
}

/// Creates client records in the core banking system.
#[async_trait]
pub trait ClientProvisioner: Send + Sync {
    async fn create_client(&self, request: &ClientCreationRequest) -> Result<CreateClientResponse>;
}

/// Read access to client records in the core banking system.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn get_client(&self, client_id: u64) -> Result<ClientRecord>;
    async fn office_clients(&self, office_id: u32) -> Result<Vec<ClientRecord>>;
}

/// Sync gateway admin API.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    async fn create_user(&self, database: &str, user: &SyncGatewayUser) -> Result<()>;
}

pub type ApiRequestStoreRef = Arc<dyn ApiRequestStore>;
pub type SyncDocumentStoreRef = Arc<dyn SyncDocumentStore>;
pub type ClientProvisionerRef = Arc<dyn ClientProvisioner>;
pub type ClientDirectoryRef = Arc<dyn ClientDirectory>;
pub type UserRegistryRef = Arc<dyn UserRegistry>;
