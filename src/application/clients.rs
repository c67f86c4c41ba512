use crate::domain::client::ClientRecord;
use crate::domain::ports::{ClientDirectoryRef, SyncDocumentStoreRef};
use crate::domain::sync_document::ClientDocument;
use crate::error::Result;
use chrono::Utc;
use tracing::{info, warn};

/// Mirrors core banking clients into the reads collection.
pub struct ClientSyncService {
    directory: ClientDirectoryRef,
    store: SyncDocumentStoreRef,
    office_id: u32,
}

impl ClientSyncService {
    /// # Arguments
    ///
    /// * `directory` - Read access to the core banking API.
    /// * `store` - The reads collection.
    /// * `office_id` - Office whose clients are loaded on initialization.
    pub fn new(directory: ClientDirectoryRef, store: SyncDocumentStoreRef, office_id: u32) -> Self {
        Self {
            directory,
            store,
            office_id,
        }
    }

    /// Fetches every client of the configured office.
    pub async fn fetch_office_clients(&self) -> Result<Vec<ClientRecord>> {
        let records = self.directory.office_clients(self.office_id).await?;
        info!(office_id = self.office_id, count = records.len(), "fetched office clients");
        Ok(records)
    }

    /// Upserts one document per record. Failures are logged and skipped.
    ///
    /// Returns the number of documents saved.
    pub async fn save_initial_clients(&self, records: &[ClientRecord]) -> usize {
        let now = Utc::now();
        let mut saved = 0;
        for record in records {
            let document = ClientDocument::from_record(record, now);
            match self.store.upsert_client(&document).await {
                Ok(()) => saved += 1,
                Err(e) => warn!(id = %document.id, "failed to save client: {}", e),
            }
        }
        info!(saved, total = records.len(), "initial clients saved");
        saved
    }

    /// Refreshes the document of the client named by a change notification.
    pub async fn update_from_webhook(&self, resource_id: u64) -> Result<ClientDocument> {
        let record = self.directory.get_client(resource_id).await?;
        let document = ClientDocument::from_record(&record, Utc::now());
        self.store.upsert_client(&document).await?;
        info!(id = %document.id, resource_id, "client updated from webhook");
        Ok(document)
    }
}
