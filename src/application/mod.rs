//! Application layer orchestrating the domain ports.
//!
//! `RequestPipeline` drives queued API requests through their processing
//! cycle. The remaining services back the auxiliary endpoints: device login,
//! client document sync from the core banking API, and demo seeding.

pub mod auth;
pub mod clients;
pub mod fake;
pub mod pipeline;
pub mod seed;
