use crate::domain::api_request::ApiRequestDocument;
use crate::domain::ports::{ApiRequestStore, SyncDocumentStore};
use crate::domain::sync_document::{ClientDocument, GroupDocument};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory document store.
///
/// Holds the writes collection (API requests) and the reads collection
/// (client and group documents) behind `Arc<RwLock<..>>`, so clones share the
/// same data. Always available; used for tests and when no persistent store
/// is configured.
#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    api_requests: Arc<RwLock<HashMap<String, ApiRequestDocument>>>,
    clients: Arc<RwLock<HashMap<String, ClientDocument>>>,
    groups: Arc<RwLock<HashMap<String, GroupDocument>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn api_request_count(&self) -> usize {
        self.api_requests.read().await.len()
    }

    /// Number of client and group documents in the reads collection.
    pub async fn sync_document_count(&self) -> usize {
        self.clients.read().await.len() + self.groups.read().await.len()
    }
}

#[async_trait]
impl ApiRequestStore for InMemoryDocumentStore {
    async fn get(&self, id: &str) -> Result<ApiRequestDocument> {
        let documents = self.api_requests.read().await;
        documents
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn upsert(&self, id: &str, document: &ApiRequestDocument) -> Result<()> {
        let mut documents = self.api_requests.write().await;
        documents.insert(id.to_string(), document.clone());
        Ok(())
    }
}

#[async_trait]
impl SyncDocumentStore for InMemoryDocumentStore {
    async fn upsert_client(&self, client: &ClientDocument) -> Result<()> {
        let mut clients = self.clients.write().await;
        clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn upsert_group(&self, group: &GroupDocument) -> Result<()> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn get_client(&self, id: &str) -> Result<ClientDocument> {
        let clients = self.clients.read().await;
        clients
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn get_group(&self, id: &str) -> Result<GroupDocument> {
        let groups = self.groups.read().await;
        groups
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_api_request_round_trip() {
        let store = InMemoryDocumentStore::new();
        let document = ApiRequestDocument::new("req-1", "{}");

        store.upsert("req-1", &document).await.unwrap();
        let retrieved = store.get("req-1").await.unwrap();
        assert_eq!(retrieved, document);

        assert!(matches!(
            store.get("req-2").await,
            Err(GatewayError::NotFound(id)) if id == "req-2"
        ));
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() {
        let store = InMemoryDocumentStore::new();
        let mut document = ApiRequestDocument::new("req-1", "{}");
        document.checksum = "abc".to_string();
        store.upsert("req-1", &document).await.unwrap();

        let replacement = ApiRequestDocument::new("req-1", "{\"x\":1}");
        store.upsert("req-1", &replacement).await.unwrap();

        let retrieved = store.get("req-1").await.unwrap();
        assert_eq!(retrieved.checksum, "");
        assert_eq!(retrieved.request_data, "{\"x\":1}");
        assert_eq!(store.api_request_count().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_keys_by_requested_id() {
        let store = InMemoryDocumentStore::new();
        let document = ApiRequestDocument::new("other", "{}");

        store.upsert("req-1", &document).await.unwrap();

        assert_eq!(store.get("req-1").await.unwrap(), document);
        assert!(store.get("other").await.is_err());
    }

    #[tokio::test]
    async fn test_sync_documents() {
        let store = InMemoryDocumentStore::new();
        let client = ClientDocument {
            id: ClientDocument::document_id("001"),
            ..ClientDocument::default()
        };
        let group = GroupDocument {
            id: GroupDocument::document_id("001"),
            ..GroupDocument::default()
        };

        store.upsert_client(&client).await.unwrap();
        store.upsert_group(&group).await.unwrap();

        assert_eq!(store.get_client("clients_001").await.unwrap(), client);
        assert_eq!(store.get_group("groups_001").await.unwrap(), group);
        assert!(store.get_client("groups_001").await.is_err());
        assert_eq!(store.sync_document_count().await, 2);
    }
}
