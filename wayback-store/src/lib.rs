//! # wayback-store — Versioned object store for map history
//!
//! Persists every historical version of every map entity (points, ways,
//! relations) in RocksDB, one column family per kind, and serves point
//! lookups by `(id, kind, version)` once ingestion is done.
//!
//! ## Architecture
//!
//! ```text
//!  history source                         downstream readers
//!       │ Entity                                   ▲ bytes
//!       ▼                                          │
//! ┌─────────────┐  write mode (destroy + rebuild)  │  read mode (read-only)
//! │ ObjectStore │ ─────────────────────────────────┴──────────────┐
//! └──────┬──────┘                                                 │
//!        │ EncodingStrategy → LookupKey → WriteBuffer             │
//!        ▼                                                        ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ PartitionedStore: CF nodes │ CF ways │ CF relations │ CF default │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`entity`] — Entity shape handed over by the history source
//! - [`key`] — `id!version` lookup keys
//! - [`encoding`] — Compact (bincode) and document (JSON) payloads
//! - [`storage`] — Batching, partitions, flush scheduling, stats
//! - [`store`] — Ingestion/lookup facade
//!
//! ## Durability
//!
//! Batches skip the RocksDB WAL and fsync. Anything not yet flushed is
//! lost on a crash; re-run the ingestion instead. Call
//! [`ObjectStore::flush`] once at the end of every write session.

pub mod encoding;
pub mod entity;
pub mod error;
pub mod key;
pub mod storage;
pub mod store;

// Re-exports for convenience
pub use encoding::{
    Augmentation, AugmentationError, CompactCodec, DocumentCodec, Encoded, EncodedRecord,
    EncodingStrategy, EncodingVariant, StoredDocument,
};
pub use entity::{Entity, EntityKind, Location, Member, Partition, Provenance};
pub use error::StoreError;
pub use key::LookupKey;
pub use storage::{
    FlushThresholds, OpenMode, PartitionStats, StatsReport, StoreConfig, StoreCounters,
};
pub use store::{ObjectStore, StoreOutcome, TeardownReport};
