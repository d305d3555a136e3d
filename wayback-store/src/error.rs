//! Error taxonomy for the object store.
//!
//! Open-time failures (engine, missing partitions, filesystem) are fatal and
//! propagate out of [`ObjectStore::open`](crate::ObjectStore::open). Lookup
//! misses surface as [`StoreError::NotFound`]. Per-record augmentation
//! failures are not errors at all; see [`Augmentation`](crate::Augmentation).

use thiserror::Error;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// RocksDB internal error
    #[error("Database error: {0}")]
    Database(String),

    /// An expected column family is absent from the store
    #[error("Partition '{0}' not found")]
    MissingPartition(&'static str),

    /// Point lookup miss
    #[error("Record not found: {partition}/{key}")]
    NotFound { partition: &'static str, key: String },

    /// Encoding an entity failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Decoding a stored payload failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A write was issued against a store opened for reading
    #[error("Store is opened read-only; writes are not permitted")]
    ReadOnly,

    /// Filesystem error around destroy/rebuild
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl StoreError {
    /// `true` for a lookup miss, the only error readers routinely expect.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
