//! JSON documents with selective field inclusion.
//!
//! Field sets:
//! ```text
//! minimal   { "@changeset", "@timestamp" }
//! full      { "@version", "@timestamp", "@changeset", "@uid", "@user",
//!             "@visible", "tags" }
//! + "g": [lon, lat]     live points, geometries enabled
//! + "r": [id, id, ...]  live ways, geometries enabled
//! ```
//!
//! Points pick their field set from tags and version:
//!
//! | tags | geometries | version | stored                    |
//! |------|------------|---------|---------------------------|
//! | none | off        | any     | nothing ([`Encoded::Empty`]) |
//! | none | on         | 1       | minimal                   |
//! | none | on         | > 1     | full (tag removal event)  |
//! | some | any        | any     | full                      |
//!
//! Ways and relations always carry the full set.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::{Augmentation, AugmentationError, Encoded, EncodedRecord};
use crate::entity::{Entity, EntityKind};
use crate::error::StoreError;

/// Field key for the `[lon, lat]` pair.
pub const GEOMETRY_FIELD: &str = "g";
/// Field key for way node references.
pub const REFERENCES_FIELD: &str = "r";

/// Selective JSON codec.
#[derive(Debug, Clone)]
pub struct DocumentCodec {
    store_geometries: bool,
}

impl DocumentCodec {
    pub fn new(store_geometries: bool) -> Self {
        Self { store_geometries }
    }

    pub fn encode(&self, entity: &Entity) -> Result<Encoded, StoreError> {
        let mut doc = match entity.kind {
            EntityKind::Point if !entity.has_tags() => {
                if !self.store_geometries {
                    return Ok(Encoded::Empty);
                }
                if entity.version == 1 {
                    primary_properties(entity)
                } else {
                    full_properties(entity)
                }
            }
            _ => full_properties(entity),
        };

        let augmentation = self.augment(entity, &mut doc);
        let bytes = serde_json::to_vec(&Value::Object(doc))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(Encoded::Record(EncodedRecord {
            bytes,
            tagged: entity.has_tags(),
            augmentation,
        }))
    }

    /// Append geometry (points) or node references (ways).
    fn augment(&self, entity: &Entity, doc: &mut Map<String, Value>) -> Augmentation {
        if entity.deleted || !self.store_geometries {
            return Augmentation::NotApplicable;
        }

        match entity.kind {
            EntityKind::Point => match entity.location {
                Some(loc) if loc.is_valid() => {
                    doc.insert(GEOMETRY_FIELD.into(), json!([loc.lon, loc.lat]));
                    Augmentation::Geometry
                }
                Some(loc) => Augmentation::Skipped(AugmentationError::InvalidLocation {
                    lon: loc.lon,
                    lat: loc.lat,
                }),
                None => Augmentation::Skipped(AugmentationError::MissingLocation),
            },
            EntityKind::Way => match &entity.references {
                Some(refs) => {
                    doc.insert(REFERENCES_FIELD.into(), json!(refs));
                    Augmentation::References
                }
                None => Augmentation::Skipped(AugmentationError::MissingReferences),
            },
            EntityKind::Relation => Augmentation::NotApplicable,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<StoredDocument, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Deserialization(e.to_string()))
    }
}

/// Changeset provenance only.
fn primary_properties(entity: &Entity) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("@changeset".into(), json!(entity.provenance.changeset));
    doc.insert("@timestamp".into(), json!(entity.provenance.timestamp));
    doc
}

/// Standard property set plus tags.
fn full_properties(entity: &Entity) -> Map<String, Value> {
    let mut doc = primary_properties(entity);
    doc.insert("@version".into(), json!(entity.version));
    doc.insert("@uid".into(), json!(entity.provenance.uid));
    doc.insert("@user".into(), json!(entity.provenance.user));
    doc.insert("@visible".into(), json!(!entity.deleted));
    doc.insert("tags".into(), json!(entity.tags));
    doc
}

/// Read view of a stored document. Absent fields were not stored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "@version")]
    pub version: Option<i32>,
    #[serde(rename = "@timestamp")]
    pub timestamp: Option<i64>,
    #[serde(rename = "@changeset")]
    pub changeset: Option<i64>,
    #[serde(rename = "@uid")]
    pub uid: Option<i64>,
    #[serde(rename = "@user")]
    pub user: Option<String>,
    #[serde(rename = "@visible")]
    pub visible: Option<bool>,
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(rename = "g")]
    pub geometry: Option<[f64; 2]>,
    #[serde(rename = "r")]
    pub references: Option<Vec<i64>>,
}

impl StoredDocument {
    /// Only the changeset provenance was kept.
    pub fn is_minimal(&self) -> bool {
        self.changeset.is_some() && self.version.is_none() && self.tags.is_none()
    }
}
