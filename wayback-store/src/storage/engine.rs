//! RocksDB-backed partitioned store.
//!
//! Column families:
//! - `nodes`     — point versions, keyed `id!version`
//! - `ways`      — way versions, keyed `id!version`
//! - `relations` — relation versions, keyed `id!version`
//! - `default`   — opened in read mode, otherwise unused
//!
//! Two lifecycles:
//! - write: destroy whatever is at the path, reopen tuned for bulk
//!   sequential loading (bulk-load profile, large SST files, background
//!   flush workers, no mmap writes, bloom-filtered block index per CF).
//! - read: open the existing store read-only; any missing partition is
//!   fatal.
//!
//! Batches are written with the RocksDB WAL disabled and without fsync.
//! A crash loses everything not yet flushed to SST files. The producer is
//! a replayable batch source, so ingestion throughput wins over
//! durability here; do not turn the WAL back on.

use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamily, ColumnFamilyDescriptor, DBCompressionType,
    DBWithThreadMode, DataBlockIndexType, Options, SingleThreaded, WriteBatch, WriteOptions,
    DEFAULT_COLUMN_FAMILY_NAME,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::batch::{BatchSink, PendingWrite};
use super::config::StoreConfig;
use crate::entity::Partition;
use crate::error::StoreError;
use crate::key::LookupKey;

/// How the store was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Destroyed and rebuilt, accepting writes
    Write,
    /// Existing store, point lookups only
    Read,
}

/// Three independent keyspaces over one RocksDB instance.
pub struct PartitionedStore {
    /// RocksDB instance (single-threaded CF map; one writer, shared readers)
    db: DBWithThreadMode<SingleThreaded>,
    mode: OpenMode,
    path: PathBuf,
}

impl PartitionedStore {
    /// Open in write mode (`create = true`) or read mode.
    pub fn open(config: &StoreConfig, create: bool) -> Result<Self, StoreError> {
        if create {
            Self::create(config)
        } else {
            Self::open_read_only(config)
        }
    }

    /// Destroy any store at the configured path and build a fresh one.
    pub fn create(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut db_opts = Self::db_options(config);

        // Never append to a stale store.
        if config.path.exists() {
            DBWithThreadMode::<SingleThreaded>::destroy(&db_opts, &config.path)?;
        }

        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = Partition::ALL
            .iter()
            .map(|p| ColumnFamilyDescriptor::new(p.name(), Self::cf_options(config, OpenMode::Write)))
            .collect();

        let db = DBWithThreadMode::<SingleThreaded>::open_cf_descriptors(
            &db_opts,
            &config.path,
            cf_descriptors,
        )?;

        let store = Self {
            db,
            mode: OpenMode::Write,
            path: config.path.clone(),
        };
        store.ensure_partitions()?;
        Ok(store)
    }

    /// Attach read-only to an existing store.
    pub fn open_read_only(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(false);
        db_opts.set_error_if_exists(false);
        db_opts.set_max_open_files(config.max_open_files);

        let names = std::iter::once(DEFAULT_COLUMN_FAMILY_NAME)
            .chain(Partition::ALL.iter().map(|p| p.name()));
        let cf_descriptors: Vec<ColumnFamilyDescriptor> = names
            .map(|name| ColumnFamilyDescriptor::new(name, Self::cf_options(config, OpenMode::Read)))
            .collect();

        let db = DBWithThreadMode::<SingleThreaded>::open_cf_descriptors_read_only(
            &db_opts,
            &config.path,
            cf_descriptors,
            false,
        )?;

        let store = Self {
            db,
            mode: OpenMode::Read,
            path: config.path.clone(),
        };
        store.ensure_partitions()?;
        Ok(store)
    }

    /// Database-wide options for bulk loading.
    fn db_options(config: &StoreConfig) -> Options {
        let mut opts = Options::default();
        opts.prepare_for_bulk_load();
        opts.set_allow_mmap_writes(false);
        #[allow(deprecated)]
        opts.set_max_background_flushes(config.max_background_flushes);
        opts.set_max_open_files(config.max_open_files);
        opts.set_target_file_size_base(config.target_file_size_base);
        opts
    }

    /// Per-partition options: bloom-filtered block index, LZ4 blocks.
    fn cf_options(config: &StoreConfig, mode: OpenMode) -> Options {
        let mut opts = Options::default();
        opts.set_block_based_table_factory(&Self::block_options(config, mode));
        opts.set_compression_type(DBCompressionType::Lz4);

        if mode == OpenMode::Write {
            // Auto compaction off; the teardown compacts every partition.
            opts.prepare_for_bulk_load();
            opts.set_write_buffer_size(config.write_buffer_size);
            opts.set_target_file_size_base(config.target_file_size_base);
        }

        opts
    }

    /// Table options. Read mode adds a block cache and a hashed data block
    /// index for point lookups on top of the bloom filter.
    fn block_options(config: &StoreConfig, mode: OpenMode) -> BlockBasedOptions {
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(config.bloom_filter_bits, false);

        if mode == OpenMode::Read {
            let cache = Cache::new_lru_cache(config.read_block_cache_size);
            block_opts.set_block_cache(&cache);
            block_opts.set_data_block_index_type(DataBlockIndexType::BinaryAndHash);
        }

        block_opts
    }

    fn ensure_partitions(&self) -> Result<(), StoreError> {
        for partition in Partition::ALL {
            self.cf(partition)?;
        }
        Ok(())
    }

    // ─── Reads ────────────────────────────────────────────────────────

    /// Point lookup of one key in one partition.
    pub fn get(&self, partition: Partition, key: &LookupKey) -> Result<Vec<u8>, StoreError> {
        let cf = self.cf(partition)?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(value) => Ok(value),
            None => Err(StoreError::NotFound {
                partition: partition.name(),
                key: key.to_string(),
            }),
        }
    }

    /// Engine estimate of the key count (lazily refreshed, not exact).
    pub fn estimate_keys(&self, partition: Partition) -> Result<u64, StoreError> {
        let cf = self.cf(partition)?;
        Ok(self
            .db
            .property_int_value_cf(cf, rocksdb::properties::ESTIMATE_NUM_KEYS)?
            .unwrap_or(0))
    }

    // ─── Maintenance ──────────────────────────────────────────────────

    /// Flush a partition's memtable to SST files. Blocks until done.
    pub fn flush_partition(&self, partition: Partition) -> Result<Duration, StoreError> {
        self.ensure_writable()?;
        let cf = self.cf(partition)?;
        let start = Instant::now();
        self.db.flush_cf(cf)?;
        let elapsed = start.elapsed();
        log::info!("Flushed {partition} in {:.3} ms", elapsed.as_secs_f64() * 1000.0);
        Ok(elapsed)
    }

    /// Full-range compaction of a partition. Blocks until done.
    pub fn compact_partition(&self, partition: Partition) -> Result<Duration, StoreError> {
        self.ensure_writable()?;
        let cf = self.cf(partition)?;
        let start = Instant::now();
        self.db.compact_range_cf(cf, None::<&[u8]>, None::<&[u8]>);
        let elapsed = start.elapsed();
        log::info!("Compacted {partition} in {:.3} ms", elapsed.as_secs_f64() * 1000.0);
        Ok(elapsed)
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ─── Helpers ──────────────────────────────────────────────────────

    fn ensure_writable(&self) -> Result<(), StoreError> {
        match self.mode {
            OpenMode::Write => Ok(()),
            OpenMode::Read => Err(StoreError::ReadOnly),
        }
    }

    /// Get a column family handle.
    fn cf(&self, partition: Partition) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(partition.name())
            .ok_or(StoreError::MissingPartition(partition.name()))
    }
}

impl BatchSink for PartitionedStore {
    fn submit(&self, writes: &[PendingWrite]) -> Result<(), StoreError> {
        self.ensure_writable()?;

        let nodes = self.cf(Partition::Nodes)?;
        let ways = self.cf(Partition::Ways)?;
        let relations = self.cf(Partition::Relations)?;

        let mut batch = WriteBatch::default();
        for write in writes {
            let cf = match write.partition {
                Partition::Nodes => nodes,
                Partition::Ways => ways,
                Partition::Relations => relations,
            };
            batch.put_cf(cf, write.key.as_bytes(), &write.value);
        }

        let mut write_opts = WriteOptions::default();
        write_opts.disable_wal(true);
        write_opts.set_sync(false);
        self.db.write_opt(batch, &write_opts)?;
        Ok(())
    }
}
