//! Entity → stored payload.
//!
//! ```text
//!            ┌────────────────── EncodingStrategy ──────────────────┐
//!  Entity ──►│ Compact  → bincode payload (whole entity)            │──► Encoded
//!            │ Document → JSON object, selective fields + "g" / "r" │
//!            └──────────────────────────────────────────────────────┘
//! ```
//!
//! The variant is chosen once per store. Both arms expose the same
//! `encode(&Entity)` capability; callers never branch on the variant.

pub mod compact;
pub mod document;

pub use compact::CompactCodec;
pub use document::{DocumentCodec, StoredDocument, GEOMETRY_FIELD, REFERENCES_FIELD};

use crate::entity::Entity;
use crate::error::StoreError;
use thiserror::Error;

/// Which representation a store writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingVariant {
    /// Fixed binary payload, geometry always embedded
    #[default]
    Compact,
    /// JSON document with selective field inclusion
    Document,
}

/// Why a geometry or reference augmentation was left out of a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AugmentationError {
    #[error("invalid location ({lon}, {lat})")]
    InvalidLocation { lon: f64, lat: f64 },
    #[error("location missing")]
    MissingLocation,
    #[error("node references missing")]
    MissingReferences,
}

/// Outcome of the geometry/reference step. The base record is persisted
/// whatever the outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Augmentation {
    /// The kind, deletion flag or configuration excludes this step
    NotApplicable,
    /// `[lon, lat]` appended under [`GEOMETRY_FIELD`]
    Geometry,
    /// Node ids appended under [`REFERENCES_FIELD`]
    References,
    /// The step failed; the record carries no augmentation
    Skipped(AugmentationError),
}

/// A payload ready to be queued.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub bytes: Vec<u8>,
    /// Entity carried at least one tag
    pub tagged: bool,
    pub augmentation: Augmentation,
}

/// Result of encoding one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    Record(EncodedRecord),
    /// Nothing worth persisting (untagged point, geometries disabled)
    Empty,
}

/// Encoder selected at store construction.
#[derive(Debug, Clone)]
pub enum EncodingStrategy {
    Compact(CompactCodec),
    Document(DocumentCodec),
}

impl EncodingStrategy {
    pub fn new(variant: EncodingVariant, store_geometries: bool) -> Self {
        match variant {
            EncodingVariant::Compact => EncodingStrategy::Compact(CompactCodec::new(store_geometries)),
            EncodingVariant::Document => {
                EncodingStrategy::Document(DocumentCodec::new(store_geometries))
            }
        }
    }

    pub fn variant(&self) -> EncodingVariant {
        match self {
            EncodingStrategy::Compact(_) => EncodingVariant::Compact,
            EncodingStrategy::Document(_) => EncodingVariant::Document,
        }
    }

    pub fn encode(&self, entity: &Entity) -> Result<Encoded, StoreError> {
        match self {
            EncodingStrategy::Compact(codec) => Ok(Encoded::Record(EncodedRecord {
                bytes: codec.encode(entity)?,
                tagged: entity.has_tags(),
                augmentation: Augmentation::NotApplicable,
            })),
            EncodingStrategy::Document(codec) => codec.encode(entity),
        }
    }
}
