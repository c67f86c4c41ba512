use crate::domain::api_request::ApiRequestDocument;
use crate::domain::ports::{ApiRequestStore, SyncDocumentStore};
use crate::domain::sync_document::{ClientDocument, GroupDocument};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Column family names backing the two collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionLayout {
    /// Documents replicated to devices (clients, groups).
    pub reads: String,
    /// API requests written by devices.
    pub writes: String,
}

impl Default for CollectionLayout {
    fn default() -> Self {
        Self {
            reads: "offline_reads".to_string(),
            writes: "offline_writes".to_string(),
        }
    }
}

/// A persistent document store backed by RocksDB.
///
/// The database is opened lazily on first use and the outcome is cached for
/// the lifetime of the store: concurrent first callers wait on a single open
/// attempt and all observe the same handle, or the same error.
///
/// `Clone` shares the underlying connection.
#[derive(Clone)]
pub struct RocksDbStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    layout: CollectionLayout,
    connection: OnceCell<std::result::Result<Arc<DB>, String>>,
}

impl RocksDbStore {
    /// Creates a store for the database at `path`. No I/O happens until the
    /// first operation or an explicit [`RocksDbStore::connect`].
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database is stored.
    /// * `layout` - Column family names for the reads and writes collections.
    pub fn new<P: AsRef<Path>>(path: P, layout: CollectionLayout) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.as_ref().to_path_buf(),
                layout,
                connection: OnceCell::new(),
            }),
        }
    }

    /// Establishes the connection if that has not happened yet.
    pub async fn connect(&self) -> Result<()> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<Arc<DB>> {
        let inner = &self.inner;
        let outcome = inner
            .connection
            .get_or_init(|| async {
                let opened = open(&inner.path, &inner.layout)
                    .map(Arc::new)
                    .map_err(|e| e.to_string());
                if opened.is_ok() {
                    info!(path = %inner.path.display(), "connected to document store");
                }
                opened
            })
            .await;
        outcome.clone().map_err(GatewayError::StoreUnavailable)
    }

    async fn read<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T> {
        let db = self.connection().await?;
        let cf = db.cf_handle(collection).ok_or_else(|| {
            GatewayError::StoreUnavailable(format!("{} column family not found", collection))
        })?;

        let bytes = db
            .get_cf(cf, id.as_bytes())
            .map_err(|e| GatewayError::StoreUnavailable(e.to_string()))?
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| GatewayError::CorruptDocument {
            id: id.to_string(),
            reason: format!("Deserialization error: {}", e),
        })
    }

    async fn write<T: Serialize>(&self, collection: &str, id: &str, document: &T) -> Result<()> {
        let db = self.connection().await?;
        let cf = db.cf_handle(collection).ok_or_else(|| {
            GatewayError::StoreUnavailable(format!("{} column family not found", collection))
        })?;

        let value = serde_json::to_vec(document).map_err(|e| GatewayError::PersistFailed {
            id: id.to_string(),
            reason: format!("Serialization error: {}", e),
        })?;

        db.put_cf(cf, id.as_bytes(), value)
            .map_err(|e| GatewayError::PersistFailed {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }
}

fn open(path: &Path, layout: &CollectionLayout) -> std::result::Result<DB, rocksdb::Error> {
    let mut opts = Options::default();
    opts.create_if_missing(true);
    opts.create_missing_column_families(true);

    let cf_reads = ColumnFamilyDescriptor::new(&layout.reads, Options::default());
    let cf_writes = ColumnFamilyDescriptor::new(&layout.writes, Options::default());

    DB::open_cf_descriptors(&opts, path, vec![cf_reads, cf_writes])
}

#[async_trait]
impl ApiRequestStore for RocksDbStore {
    async fn get(&self, id: &str) -> Result<ApiRequestDocument> {
        self.read(&self.inner.layout.writes, id).await
    }

    async fn upsert(&self, id: &str, document: &ApiRequestDocument) -> Result<()> {
        self.write(&self.inner.layout.writes, id, document).await
    }
}

#[async_trait]
impl SyncDocumentStore for RocksDbStore {
    async fn upsert_client(&self, client: &ClientDocument) -> Result<()> {
        self.write(&self.inner.layout.reads, &client.id, client).await
    }

    async fn upsert_group(&self, group: &GroupDocument) -> Result<()> {
        self.write(&self.inner.layout.reads, &group.id, group).await
    }

    async fn get_client(&self, id: &str) -> Result<ClientDocument> {
        self.read(&self.inner.layout.reads, id).await
    }

    async fn get_group(&self, id: &str) -> Result<GroupDocument> {
        self.read(&self.inner.layout.reads, id).await
    }
}
