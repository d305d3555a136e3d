//! Versioned map entities as handed over by the upstream history source.
//!
//! An entity is one version of one map object. Entities sharing an `id`
//! form a version chain; `(id, version)` is unique within a kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Entity kinds. Each kind is stored in its own partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityKind {
    /// Point feature (node) with a lon/lat location
    Point = 1,
    /// Way feature with ordered node references
    Way = 2,
    /// Relation feature with typed members
    Relation = 3,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Point, EntityKind::Way, EntityKind::Relation];

    /// Resolve the numeric kind code used by history tooling
    /// (1 = node, 2 = way, 3 = relation).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(EntityKind::Point),
            2 => Some(EntityKind::Way),
            3 => Some(EntityKind::Relation),
            _ => None,
        }
    }

    /// The partition holding entities of this kind.
    pub fn partition(self) -> Partition {
        match self {
            EntityKind::Point => Partition::Nodes,
            EntityKind::Way => Partition::Ways,
            EntityKind::Relation => Partition::Relations,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Point => write!(f, "node"),
            EntityKind::Way => write!(f, "way"),
            EntityKind::Relation => write!(f, "relation"),
        }
    }
}

/// One independent keyspace per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Nodes,
    Ways,
    Relations,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Nodes, Partition::Ways, Partition::Relations];

    /// Column family name.
    pub fn name(self) -> &'static str {
        match self {
            Partition::Nodes => "nodes",
            Partition::Ways => "ways",
            Partition::Relations => "relations",
        }
    }

    pub fn kind(self) -> EntityKind {
        match self {
            Partition::Nodes => EntityKind::Point,
            Partition::Ways => EntityKind::Way,
            Partition::Relations => EntityKind::Relation,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who changed the entity, and when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub changeset: i64,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    pub uid: i64,
    pub user: String,
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Both coordinates finite and inside the WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// Relation member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub kind: EntityKind,
    pub reference: i64,
    pub role: String,
}

/// One version of one map object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub version: i32,
    pub kind: EntityKind,
    pub deleted: bool,
    pub provenance: Provenance,
    pub tags: BTreeMap<String, String>,
    /// Point location (Point kind only)
    pub location: Option<Location>,
    /// Ordered node ids (Way kind only)
    pub references: Option<Vec<i64>>,
    /// Members (Relation kind only)
    pub members: Vec<Member>,
}

impl Entity {
    fn bare(id: i64, version: i32, kind: EntityKind) -> Self {
        Self {
            id,
            version,
            kind,
            deleted: false,
            provenance: Provenance::default(),
            tags: BTreeMap::new(),
            location: None,
            references: None,
            members: Vec::new(),
        }
    }

    pub fn point(id: i64, version: i32, location: Location) -> Self {
        Self {
            location: Some(location),
            ..Self::bare(id, version, EntityKind::Point)
        }
    }

    /// Point whose location could not be resolved upstream.
    pub fn point_without_location(id: i64, version: i32) -> Self {
        Self::bare(id, version, EntityKind::Point)
    }

    pub fn way(id: i64, version: i32, references: Vec<i64>) -> Self {
        Self {
            references: Some(references),
            ..Self::bare(id, version, EntityKind::Way)
        }
    }

    pub fn relation(id: i64, version: i32, members: Vec<Member>) -> Self {
        Self {
            members,
            ..Self::bare(id, version, EntityKind::Relation)
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn mark_deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_partition_bijection() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.partition().kind(), kind);
        }
        for partition in Partition::ALL {
            assert_eq!(partition.kind().partition(), partition);
        }
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(EntityKind::from_code(1), Some(EntityKind::Point));
        assert_eq!(EntityKind::from_code(2), Some(EntityKind::Way));
        assert_eq!(EntityKind::from_code(3), Some(EntityKind::Relation));
        assert_eq!(EntityKind::from_code(0), None);
        assert_eq!(EntityKind::from_code(4), None);
    }

    #[test]
    fn test_partition_names() {
        let names: Vec<_> = Partition::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["nodes", "ways", "relations"]);
    }

    #[test]
    fn test_location_validity() {
        assert!(Location::new(7.5, 51.2).is_valid());
        assert!(Location::new(-180.0, -90.0).is_valid());
        assert!(!Location::new(180.5, 0.0).is_valid());
        assert!(!Location::new(0.0, 91.0).is_valid());
        assert!(!Location::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_builders() {
        let way = Entity::way(7, 3, vec![1, 2, 3])
            .with_tag("highway", "residential")
            .mark_deleted();
        assert_eq!(way.kind, EntityKind::Way);
        assert!(way.deleted);
        assert!(way.has_tags());
        assert_eq!(way.references.as_deref(), Some(&[1, 2, 3][..]));
        assert!(way.location.is_none());
    }
}
