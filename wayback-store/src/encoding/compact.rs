//! Compact binary payloads (bincode, standard config).

use crate::entity::Entity;
use crate::error::StoreError;
use std::borrow::Cow;

/// Whole-entity bincode codec.
#[derive(Debug, Clone)]
pub struct CompactCodec {
    store_geometries: bool,
}

impl CompactCodec {
    pub fn new(store_geometries: bool) -> Self {
        Self { store_geometries }
    }

    /// Encode the entity. Location and references are dropped when
    /// geometry storage is disabled.
    pub fn encode(&self, entity: &Entity) -> Result<Vec<u8>, StoreError> {
        let payload = if self.store_geometries {
            Cow::Borrowed(entity)
        } else {
            Cow::Owned(Entity {
                location: None,
                references: None,
                ..entity.clone()
            })
        };
        bincode::serde::encode_to_vec(&*payload, bincode::config::standard())
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Entity, StoreError> {
        let (entity, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| StoreError::Deserialization(e.to_string()))?;
        Ok(entity)
    }
}
