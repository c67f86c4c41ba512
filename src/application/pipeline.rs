use crate::domain::api_request::{
    ApiRequestDocument, AuditTrail, ClientCreationOutcome, ProvisioningOutcome,
};
use crate::domain::client::ClientCreationRequest;
use crate::domain::ports::{ApiRequestStoreRef, ClientProvisioner, ClientProvisionerRef};
use crate::error::{GatewayError, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Processes queued API requests.
///
/// `process_request` runs the synchronous prefix of a cycle (load, claim,
/// persist `PROCESSING`) and hands the side effect to a detached task that
/// records the outcome and persists `PROCESSED`.
///
/// At most one cycle per document id runs at a time within this process; a
/// second call for an id whose cycle is still running is rejected with
/// `AlreadyProcessing`.
pub struct RequestPipeline {
    store: ApiRequestStoreRef,
    provisioner: ClientProvisionerRef,
    claims: ClaimRegistry,
    trail: AuditTrail,
}

impl RequestPipeline {
    /// Creates a new `RequestPipeline`.
    ///
    /// # Arguments
    ///
    /// * `store` - The writes collection holding API request documents.
    /// * `provisioner` - The real or simulated client provisioner.
    pub fn new(store: ApiRequestStoreRef, provisioner: ClientProvisionerRef) -> Self {
        Self {
            store,
            provisioner,
            claims: ClaimRegistry::default(),
            trail: AuditTrail::default(),
        }
    }

    /// Sets how the audit trail is treated when a document is claimed.
    pub fn with_audit_trail(mut self, trail: AuditTrail) -> Self {
        self.trail = trail;
        self
    }

    /// Starts a processing cycle for the document `id`.
    ///
    /// Returns once the `PROCESSING` state is persisted. The returned handle
    /// may be dropped; the detached phase keeps running either way.
    pub async fn process_request(&self, id: &str) -> Result<ProcessingHandle> {
        let claim = self.claims.claim(id)?;

        info!(id, "processing API request");
        let mut document = self.store.get(id).await?;
        document.begin_processing(Utc::now(), self.trail)?;
        self.store.upsert(id, &document).await?;
        info!(id, "document marked as processing");

        let store = Arc::clone(&self.store);
        let provisioner = Arc::clone(&self.provisioner);
        let key = id.to_string();
        let task = tokio::spawn(async move {
            let _claim = claim;
            complete(store, provisioner, key, document).await
        });

        Ok(ProcessingHandle {
            id: id.to_string(),
            task,
        })
    }

    /// Stores `document` under `id` so it can be processed later, replacing
    /// any document already there.
    ///
    /// Rejected with `AlreadyProcessing` while a cycle for `id` is running.
    pub async fn enqueue(&self, id: &str, document: &ApiRequestDocument) -> Result<()> {
        let _claim = self.claims.claim(id)?;
        self.store.upsert(id, document).await?;
        info!(id, "API request queued");
        Ok(())
    }

    /// Fetches the stored document, e.g. to observe the outcome of a cycle.
    pub async fn document(&self, id: &str) -> Result<ApiRequestDocument> {
        self.store.get(id).await
    }

    /// Whether a cycle for `id` is currently running.
    pub fn is_in_flight(&self, id: &str) -> bool {
        self.claims.contains(id)
    }
}

/// Handle to the detached phase of a processing cycle.
#[derive(Debug)]
pub struct ProcessingHandle {
    id: String,
    task: JoinHandle<Completion>,
}

impl ProcessingHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Waits for the detached phase. `None` if the task panicked.
    pub async fn wait(self) -> Option<Completion> {
        match self.task.await {
            Ok(completion) => Some(completion),
            Err(e) => {
                error!(id = %self.id, "processing task aborted: {}", e);
                None
            }
        }
    }
}

/// Summary of a finished detached phase.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Completion {
    /// Status code recorded in the document.
    pub status_code: u16,
    /// Whether the final `PROCESSED` write reached the store.
    pub persisted: bool,
}

async fn complete(
    store: ApiRequestStoreRef,
    provisioner: ClientProvisionerRef,
    id: String,
    mut document: ApiRequestDocument,
) -> Completion {
    info!(id = %id, "started processing document");

    let outcome = provision(provisioner.as_ref(), &document.request_data).await;
    let status_code = outcome.status_code();

    if let Err(e) = document.finish_processing(Utc::now(), &outcome) {
        error!(id = %id, "unable to record outcome: {}", e);
        return Completion {
            status_code,
            persisted: false,
        };
    }

    let persisted = match store.upsert(&id, &document).await {
        Ok(()) => true,
        Err(e) => {
            error!(id = %id, "failed to persist processed document: {}", e);
            false
        }
    };

    info!(id = %id, status_code, "finished processing document");
    Completion {
        status_code,
        persisted,
    }
}

async fn provision(provisioner: &dyn ClientProvisioner, request_data: &str) -> ProvisioningOutcome {
    let request = match ClientCreationRequest::decode(request_data) {
        Ok(request) => request,
        Err(e) => {
            warn!("rejecting request data: {}", e);
            return ProvisioningOutcome::Rejected(e.to_string());
        }
    };

    match provisioner.create_client(&request).await {
        Ok(response) => ProvisioningOutcome::Created(ClientCreationOutcome::new(
            response.account_no,
            Utc::now(),
        )),
        Err(e) => {
            warn!("client provisioning failed: {}", e);
            ProvisioningOutcome::Failed(e.to_string())
        }
    }
}

/// Ids with a processing cycle in progress.
#[derive(Default, Clone)]
struct ClaimRegistry {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ClaimRegistry {
    fn claim(&self, id: &str) -> Result<Claim> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(id.to_string()) {
            return Err(GatewayError::AlreadyProcessing(id.to_string()));
        }
        Ok(Claim {
            id: id.to_string(),
            registry: self.clone(),
        })
    }

    fn contains(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Releases the id when dropped, including on early returns and panics.
struct Claim {
    id: String,
    registry: ClaimRegistry,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.registry
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_request::RequestStatus;
    use crate::domain::client::CreateClientResponse;
    use crate::domain::ports::ApiRequestStore;
    use crate::infrastructure::in_memory::InMemoryDocumentStore;
    use async_trait::async_trait;

    const REQUEST_DATA: &str = r#"{
        "clientId": {"documentTypeId": 1, "documentKey": "A1"},
        "clientBio": {"firstname": "Jane", "lastname": "Doe"},
        "clientAddress": {}
    }"#;

    struct FixedProvisioner(Option<&'static str>);

    #[async_trait]
    impl ClientProvisioner for FixedProvisioner {
        async fn create_client(&self, _: &ClientCreationRequest) -> Result<CreateClientResponse> {
            match self.0 {
                Some(account_no) => Ok(CreateClientResponse {
                    account_no: account_no.to_string(),
                    ..CreateClientResponse::default()
                }),
                None => Err(GatewayError::remote(Some(503), "core banking down")),
            }
        }
    }

    async fn pipeline_with(
        document: ApiRequestDocument,
        provisioner: FixedProvisioner,
    ) -> (RequestPipeline, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.upsert("req-1", &document).await.unwrap();
        let pipeline = RequestPipeline::new(store.clone(), Arc::new(provisioner));
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_successful_cycle() {
        let (pipeline, store) = pipeline_with(
            ApiRequestDocument::new("req-1", REQUEST_DATA),
            FixedProvisioner(Some("000000001")),
        )
        .await;

        let handle = pipeline.process_request("req-1").await.unwrap();
        assert_eq!(handle.id(), "req-1");
        let completion = handle.wait().await.unwrap();
        assert_eq!(
            completion,
            Completion {
                status_code: 201,
                persisted: true
            }
        );

        let stored = store.get("req-1").await.unwrap();
        assert_eq!(stored.status(), RequestStatus::Processed);
        assert_eq!(stored.response_status_code, Some(201));
        let outcome: ClientCreationOutcome = serde_json::from_str(&stored.response_data).unwrap();
        assert_eq!(outcome.account_number, "000000001");
        assert!(outcome.created_at <= outcome.updated_at);
        assert!(!pipeline.is_in_flight("req-1"));
    }

    #[tokio::test]
    async fn test_remote_failure_records_500() {
        let (pipeline, store) = pipeline_with(
            ApiRequestDocument::new("req-1", REQUEST_DATA),
            FixedProvisioner(None),
        )
        .await;

        let completion = pipeline
            .process_request("req-1")
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(completion.status_code, 500);

        let stored = store.get("req-1").await.unwrap();
        assert_eq!(stored.response_status_code, Some(500));
        assert_eq!(stored.response_data, "");
    }

    #[tokio::test]
    async fn test_malformed_request_data_records_400() {
        let (pipeline, store) = pipeline_with(
            ApiRequestDocument::new("req-1", "{oops"),
            FixedProvisioner(Some("000000001")),
        )
        .await;

        pipeline
            .process_request("req-1")
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        let stored = store.get("req-1").await.unwrap();
        assert_eq!(stored.response_status_code, Some(400));
        assert_eq!(stored.response_data, "");
        assert_eq!(stored.document_states.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pipeline = RequestPipeline::new(store.clone(), Arc::new(FixedProvisioner(None)));

        let err = pipeline.process_request("missing-id").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
        assert!(!pipeline.is_in_flight("missing-id"));
        assert_eq!(store.api_request_count().await, 0);
    }

    #[tokio::test]
    async fn test_enqueue_rejected_while_in_flight() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pipeline = RequestPipeline::new(store.clone(), Arc::new(FixedProvisioner(None)));
        let document = ApiRequestDocument::new("req-1", REQUEST_DATA);

        let claim = pipeline.claims.claim("req-1").unwrap();
        assert!(matches!(
            pipeline.enqueue("req-1", &document).await,
            Err(GatewayError::AlreadyProcessing(_))
        ));
        assert_eq!(store.api_request_count().await, 0);

        drop(claim);
        pipeline.enqueue("req-1", &document).await.unwrap();
        assert_eq!(pipeline.document("req-1").await.unwrap(), document);
        assert!(!pipeline.is_in_flight("req-1"));
    }

    #[tokio::test]
    async fn test_claim_is_exclusive_and_released() {
        let registry = ClaimRegistry::default();
        let claim = registry.claim("req-1").unwrap();
        assert!(matches!(
            registry.claim("req-1"),
            Err(GatewayError::AlreadyProcessing(_))
        ));
        assert!(registry.claim("req-2").is_ok());

        drop(claim);
        assert!(!registry.contains("req-1"));
        assert!(registry.claim("req-1").is_ok());
    }
}
