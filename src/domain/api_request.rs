use crate::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status recorded in a document's audit trail.
///
/// `Pending` is implicit: a document whose trail is empty has not been
/// touched by the pipeline yet.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Processing,
    Processed,
}

impl RequestStatus {
    /// Whether the pipeline may move a document from `self` to `next`.
    ///
    /// Claiming is allowed from any state, so finished or stuck documents can
    /// be reprocessed. Completion is only legal from `Processing`.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        match next {
            RequestStatus::Processing => true,
            RequestStatus::Processed => self == RequestStatus::Processing,
            RequestStatus::Pending => false,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Processing => "PROCESSING",
            RequestStatus::Processed => "PROCESSED",
        };
        f.write_str(name)
    }
}

/// Immutable audit trail entry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DocumentState {
    pub time: DateTime<Utc>,
    pub status: RequestStatus,
}

/// How the audit trail is treated when a document is claimed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, clap::ValueEnum)]
pub enum AuditTrail {
    /// Keep every previous entry and append the new `PROCESSING` marker.
    #[default]
    Append,
    /// Discard earlier history and start over with a single `PROCESSING` marker.
    #[value(name = "reset")]
    ResetOnClaim,
}

/// A queued API request as stored in the writes collection.
///
/// Field names round-trip with the documents written by mobile clients, so
/// everything is camelCase and every field is optional on input.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiRequestDocument {
    pub id: String,
    pub client_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub endpoint: String,
    pub verb: String,
    pub headers: String,
    pub request_data: String,
    pub organization_units: String,
    pub client_metadata: String,
    pub checksum: String,
    pub r#type: String,
    pub response_status_code: Option<u16>,
    pub response_data: String,
    pub document_states: Vec<DocumentState>,
}

impl ApiRequestDocument {
    pub fn new(id: impl Into<String>, request_data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            request_data: request_data.into(),
            created_at: Some(Utc::now()),
            r#type: "api_requests".to_string(),
            ..Self::default()
        }
    }

    /// Status of the most recent audit entry.
    pub fn status(&self) -> RequestStatus {
        self.document_states
            .last()
            .map(|state| state.status)
            .unwrap_or(RequestStatus::Pending)
    }

    fn transition(&mut self, next: RequestStatus, time: DateTime<Utc>) -> Result<()> {
        let current = self.status();
        if !current.can_transition_to(next) {
            return Err(GatewayError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        self.document_states.push(DocumentState { time, status: next });
        Ok(())
    }

    /// Claims the document for a new processing cycle.
    ///
    /// Clears the outcome of any earlier cycle so the eventual status code is
    /// the one written by this cycle.
    pub fn begin_processing(&mut self, time: DateTime<Utc>, trail: AuditTrail) -> Result<()> {
        if trail == AuditTrail::ResetOnClaim {
            self.document_states.clear();
        }
        self.transition(RequestStatus::Processing, time)?;
        self.response_status_code = None;
        self.response_data.clear();
        Ok(())
    }

    /// Records the outcome and appends the terminal `PROCESSED` entry.
    pub fn finish_processing(
        &mut self,
        time: DateTime<Utc>,
        outcome: &ProvisioningOutcome,
    ) -> Result<()> {
        self.transition(RequestStatus::Processed, time)?;
        self.response_status_code = Some(outcome.status_code());
        self.response_data = match outcome {
            ProvisioningOutcome::Created(created) => serde_json::to_string(created)
                .map_err(|e| GatewayError::CorruptDocument {
                    id: self.id.clone(),
                    reason: format!("unable to encode response data: {}", e),
                })?,
            _ => String::new(),
        };
        Ok(())
    }
}

/// Payload written to `responseData` after a successful provisioning call.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientCreationOutcome {
    pub account_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientCreationOutcome {
    pub fn new(account_number: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            account_number: account_number.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of the side-effecting phase of one processing cycle.
#[derive(Debug, PartialEq, Clone)]
pub enum ProvisioningOutcome {
    Created(ClientCreationOutcome),
    /// `requestData` did not decode; the remote call was skipped.
    Rejected(String),
    /// The remote (or simulated) call failed.
    Failed(String),
}

impl ProvisioningOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            ProvisioningOutcome::Created(_) => 201,
            ProvisioningOutcome::Rejected(_) => 400,
            ProvisioningOutcome::Failed(_) => 500,
        }
    }
}
