use crate::domain::api_request::RequestStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("failed to persist document {id}: {reason}")]
    PersistFailed { id: String, reason: String },
    #[error("stored document {id} is corrupt: {reason}")]
    CorruptDocument { id: String, reason: String },
    #[error("malformed request data: {0}")]
    DecodeFailed(String),
    #[error("remote call failed{}: {message}", status_suffix(.status))]
    RemoteCallFailed {
        status: Option<u16>,
        message: String,
    },
    #[error("document {0} is already being processed")]
    AlreadyProcessing(String),
    #[error("illegal state transition from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteCallFailed {
            status,
            message: message.into(),
        }
    }

    /// HTTP status the inbound layer answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::DecodeFailed(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::AlreadyProcessing(_) | Self::InvalidTransition { .. } => 409,
            Self::RemoteCallFailed { .. } => 502,
            Self::StoreUnavailable(_) | Self::NotConfigured(_) => 503,
            Self::PersistFailed { .. } | Self::CorruptDocument { .. } | Self::Io(_) => 500,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::remote(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, GatewayError>;
