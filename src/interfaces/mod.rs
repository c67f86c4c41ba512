//! Inbound transports.

pub mod http;
