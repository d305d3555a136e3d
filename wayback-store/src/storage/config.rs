//! Store configuration.

use std::path::PathBuf;

use crate::encoding::EncodingVariant;
use crate::entity::Partition;

/// Record-count thresholds driving batch submission and partition flushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushThresholds {
    /// Submit the pending batch once it holds more than this many operations
    pub batch_ops: usize,
    /// Flush `nodes` every N stored points
    pub nodes: u64,
    /// Flush `ways` every N stored ways
    pub ways: u64,
    /// Flush `relations` every N stored relations
    pub relations: u64,
}

impl FlushThresholds {
    /// Defaults tuned per encoding: documents are larger, so batches and
    /// node flushes come sooner.
    pub fn for_variant(variant: EncodingVariant) -> Self {
        match variant {
            EncodingVariant::Compact => Self {
                batch_ops: 2000,
                nodes: 5_000_000,
                ways: 2_000_000,
                relations: 1_000_000,
            },
            EncodingVariant::Document => Self {
                batch_ops: 1000,
                nodes: 4_000_000,
                ways: 2_000_000,
                relations: 1_000_000,
            },
        }
    }

    pub fn for_partition(&self, partition: Partition) -> u64 {
        match partition {
            Partition::Nodes => self.nodes,
            Partition::Ways => self.ways,
            Partition::Relations => self.relations,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database directory path
    pub path: PathBuf,
    /// Payload representation (fixed for the lifetime of the store)
    pub variant: EncodingVariant,
    /// Keep point locations and way node references (default: true)
    pub store_geometries: bool,
    /// Batch and partition flush thresholds (default: per variant)
    pub thresholds: FlushThresholds,
    /// Bloom filter bits per key (default: 10)
    pub bloom_filter_bits: f64,
    /// SST target file size (default: 512MB)
    pub target_file_size_base: u64,
    /// Background flush workers (default: 4)
    pub max_background_flushes: i32,
    /// Write buffer size per column family (default: 64MB)
    pub write_buffer_size: usize,
    /// Max open files for RocksDB (default: -1, unlimited)
    pub max_open_files: i32,
    /// Block cache for read-mode point lookups (default: 64MB)
    pub read_block_cache_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("wayback_data", EncodingVariant::default())
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>, variant: EncodingVariant) -> Self {
        Self {
            path: path.into(),
            variant,
            store_geometries: true,
            thresholds: FlushThresholds::for_variant(variant),
            bloom_filter_bits: 10.0,
            target_file_size_base: 512 * 1024 * 1024, // 512MB
            max_background_flushes: 4,
            write_buffer_size: 64 * 1024 * 1024, // 64MB
            max_open_files: -1,
            read_block_cache_size: 64 * 1024 * 1024, // 64MB
        }
    }

    /// Create config for testing (small buffers, few open files).
    pub fn for_testing(path: impl Into<PathBuf>, variant: EncodingVariant) -> Self {
        Self {
            target_file_size_base: 8 * 1024 * 1024, // 8MB
            max_background_flushes: 1,
            write_buffer_size: 4 * 1024 * 1024, // 4MB
            max_open_files: 64,
            read_block_cache_size: 8 * 1024 * 1024, // 8MB
            ..Self::new(path, variant)
        }
    }

    pub fn with_geometries(mut self, store_geometries: bool) -> Self {
        self.store_geometries = store_geometries;
        self
    }

    pub fn with_thresholds(mut self, thresholds: FlushThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_per_variant() {
        let compact = FlushThresholds::for_variant(EncodingVariant::Compact);
        assert_eq!(compact.batch_ops, 2000);
        assert_eq!(compact.for_partition(Partition::Nodes), 5_000_000);
        assert_eq!(compact.for_partition(Partition::Ways), 2_000_000);
        assert_eq!(compact.for_partition(Partition::Relations), 1_000_000);

        let document = FlushThresholds::for_variant(EncodingVariant::Document);
        assert_eq!(document.batch_ops, 1000);
        assert_eq!(document.for_partition(Partition::Nodes), 4_000_000);
        assert_eq!(document.for_partition(Partition::Ways), 2_000_000);
        assert_eq!(document.for_partition(Partition::Relations), 1_000_000);
    }

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.variant, EncodingVariant::Compact);
        assert!(config.store_geometries);
        assert_eq!(config.bloom_filter_bits, 10.0);
        assert_eq!(config.target_file_size_base, 512 * 1024 * 1024);
        assert_eq!(config.max_background_flushes, 4);
        assert_eq!(config.read_block_cache_size, 64 * 1024 * 1024);
    }

    #[test]
    fn test_new_derives_thresholds_from_variant() {
        let config = StoreConfig::new("db", EncodingVariant::Document);
        assert_eq!(config.thresholds, FlushThresholds::for_variant(EncodingVariant::Document));
    }
}
