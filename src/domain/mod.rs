//! Domain layer: documents, payloads and the ports adapters implement.

pub mod api_request;
pub mod client;
pub mod ports;
pub mod sync_document;
pub mod user;
