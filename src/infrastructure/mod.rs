//! Adapters implementing the domain ports.
//!
//! Storage: an always-available in-memory store and, behind the
//! `storage-rocksdb` feature, a lazily connected RocksDB store. Remote
//! services: the core banking API, its simulated stand-in, and the sync
//! gateway admin API.

pub mod core_banking;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod simulated;
pub mod sync_gateway;
