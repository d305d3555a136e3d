//! Ingestion and lookup facade over the partitioned store.
//!
//! ```text
//! store(entity) ─► EncodingStrategy ─► LookupKey ─► WriteBuffer::put ─► count
//!                                                        │ flush_if_full: ops > batch limit
//!                                                        ▼
//!                                               PartitionedStore::submit
//!               counter % partition threshold == 0 ─► flush partition + stats
//!
//! flush() ─► submit pending ─► flush all ─► compact all ─► stats
//! ```
//!
//! One producer thread drives a write-mode store; read-mode stores serve
//! `get` from any number of threads.

use std::path::Path;

use crate::encoding::{Augmentation, Encoded, EncodingStrategy, EncodingVariant};
use crate::entity::{Entity, EntityKind, Partition};
use crate::error::StoreError;
use crate::key::LookupKey;
use crate::storage::{
    FlushScheduler, OpenMode, PartitionTiming, PartitionedStore, StatsReport, StatsReporter,
    StoreConfig, StoreCounters, WriteBuffer,
};

/// What `store` did with an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Queued for the given partition
    Stored(Partition),
    /// Nothing worth persisting; counted in `empty_objects`
    Skipped,
}

/// Everything the teardown did, in order.
#[derive(Debug, Clone)]
pub struct TeardownReport {
    /// Writes submitted from the pending batch
    pub submitted_writes: usize,
    pub flushes: Vec<PartitionTiming>,
    pub compactions: Vec<PartitionTiming>,
    pub stats: StatsReport,
}

/// Versioned object store for map history.
pub struct ObjectStore {
    engine: PartitionedStore,
    strategy: EncodingStrategy,
    buffer: WriteBuffer,
    scheduler: FlushScheduler,
    reporter: StatsReporter,
    counters: StoreCounters,
    /// Set once `flush()` has completed
    finished: bool,
}

impl ObjectStore {
    /// `create = true` destroys anything at `config.path` and opens a fresh
    /// store for ingestion; `create = false` opens an existing store
    /// read-only. Both fail fast.
    pub fn open(config: StoreConfig, create: bool) -> Result<Self, StoreError> {
        let engine = PartitionedStore::open(&config, create)?;
        log::info!(
            "Opened object store at {} ({:?} mode, {:?} encoding)",
            config.path.display(),
            engine.mode(),
            config.variant
        );

        Ok(Self {
            engine,
            strategy: EncodingStrategy::new(config.variant, config.store_geometries),
            buffer: WriteBuffer::new(config.thresholds.batch_ops),
            scheduler: FlushScheduler::new(config.thresholds),
            reporter: StatsReporter::new(),
            counters: StoreCounters::default(),
            finished: false,
        })
    }

    pub fn create(config: StoreConfig) -> Result<Self, StoreError> {
        Self::open(config, true)
    }

    pub fn open_read_only(config: StoreConfig) -> Result<Self, StoreError> {
        Self::open(config, false)
    }

    // ─── Ingestion ────────────────────────────────────────────────────

    /// Encode and queue one entity version.
    ///
    /// May block while a full batch is submitted or a partition is flushed.
    /// If that submit fails the entity is already queued and counted; retry
    /// with [`flush_pending`](Self::flush_pending), not by storing it again.
    pub fn store(&mut self, entity: &Entity) -> Result<StoreOutcome, StoreError> {
        self.ensure_writable()?;

        let outcome = self.enqueue(entity)?;
        if let StoreOutcome::Stored(partition) = outcome {
            self.buffer.flush_if_full(&self.engine)?;

            let stored = self.counters.stored(partition);
            if self.scheduler.on_stored(&self.engine, partition, stored)? {
                self.reporter.report(&self.engine, &self.counters)?;
            }
        }
        Ok(outcome)
    }

    /// Encode `entity`, queue its record and count it. Touches no engine
    /// state.
    fn enqueue(&mut self, entity: &Entity) -> Result<StoreOutcome, StoreError> {
        let record = match self.strategy.encode(entity)? {
            Encoded::Record(record) => record,
            Encoded::Empty => {
                self.counters.empty_objects += 1;
                return Ok(StoreOutcome::Skipped);
            }
        };

        if let Augmentation::Skipped(reason) = &record.augmentation {
            log::warn!(
                "{} {} v{} stored without augmentation: {reason}",
                entity.kind,
                entity.id,
                entity.version
            );
        }
        if record.tagged {
            self.counters.stored_tags += 1;
        }

        let partition = entity.kind.partition();
        let key = LookupKey::encode(entity.id, entity.version);
        self.buffer.put(partition, key, record.bytes);
        self.counters.record_stored(partition);

        Ok(StoreOutcome::Stored(partition))
    }

    /// Submit the pending batch now. Returns the number of writes submitted.
    pub fn flush_pending(&mut self) -> Result<usize, StoreError> {
        self.ensure_writable()?;
        self.buffer.flush_to(&self.engine)
    }

    /// End-of-ingestion teardown: submit the pending batch, flush and
    /// compact every partition, report stats.
    ///
    /// Must be called once before the process exits; writes still in the
    /// batch are lost otherwise.
    pub fn flush(&mut self) -> Result<TeardownReport, StoreError> {
        self.ensure_writable()?;

        let submitted_writes = self.buffer.flush_to(&self.engine)?;
        let flushes = self.scheduler.flush_all(&self.engine)?;
        let compactions = self.scheduler.compact_all(&self.engine)?;
        let stats = self.reporter.report(&self.engine, &self.counters)?;
        self.finished = true;

        Ok(TeardownReport {
            submitted_writes,
            flushes,
            compactions,
            stats,
        })
    }

    // ─── Lookups ──────────────────────────────────────────────────────

    /// Raw stored bytes for one entity version.
    ///
    /// Only writes already submitted to the engine are visible.
    pub fn get(&self, id: i64, kind: EntityKind, version: i32) -> Result<Vec<u8>, StoreError> {
        self.engine
            .get(kind.partition(), &LookupKey::encode(id, version))
    }

    /// On-demand stats report.
    pub fn report_stats(&mut self) -> Result<StatsReport, StoreError> {
        self.reporter.report(&self.engine, &self.counters)
    }

    // ─── Accessors ────────────────────────────────────────────────────

    pub fn counters(&self) -> &StoreCounters {
        &self.counters
    }

    /// Writes queued but not yet submitted.
    pub fn pending_writes(&self) -> usize {
        self.buffer.pending_count()
    }

    /// Batches submitted so far (automatic and explicit).
    pub fn submitted_batches(&self) -> u64 {
        self.buffer.submitted_batches()
    }

    /// Threshold-triggered partition flushes so far.
    pub fn scheduled_flushes(&self) -> u64 {
        self.scheduler.triggered()
    }

    /// Stats reports produced so far (scheduled, on demand and teardown).
    pub fn stats_reports(&self) -> u64 {
        self.reporter.reports()
    }

    pub fn variant(&self) -> EncodingVariant {
        self.strategy.variant()
    }

    pub fn mode(&self) -> OpenMode {
        self.engine.mode()
    }

    pub fn path(&self) -> &Path {
        self.engine.path()
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.engine.mode() == OpenMode::Read {
            log::error!(
                "Write attempted on read-only store at {}",
                self.engine.path().display()
            );
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

impl Drop for ObjectStore {
    fn drop(&mut self) {
        if self.engine.mode() != OpenMode::Write || self.finished {
            return;
        }
        let pending = self.buffer.pending_count();
        if pending > 0 {
            log::warn!(
                "Object store at {} dropped with {pending} unflushed writes; they are lost",
                self.engine.path().display()
            );
        } else {
            log::warn!(
                "Object store at {} dropped without flush(); partitions left uncompacted",
                self.engine.path().display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{CompactCodec, DocumentCodec};
    use crate::entity::Location;
    use crate::storage::FlushThresholds;
    use tempfile::tempdir;

    fn small_thresholds(variant: EncodingVariant) -> FlushThresholds {
        FlushThresholds {
            batch_ops: 4,
            ..FlushThresholds::for_variant(variant)
        }
    }

    #[test]
    fn test_store_counts_per_partition() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Compact);
        let mut store = ObjectStore::create(config).unwrap();

        for id in 1..=7 {
            store.store(&Entity::point(id, 1, Location::new(1.0, 1.0))).unwrap();
        }
        store.store(&Entity::way(1, 1, vec![1, 2]).with_tag("highway", "path")).unwrap();
        store.store(&Entity::relation(1, 1, vec![])).unwrap();

        let counters = store.counters();
        assert_eq!(counters.stored_nodes, 7);
        assert_eq!(counters.stored_ways, 1);
        assert_eq!(counters.stored_relations, 1);
        assert_eq!(counters.stored_tags, 1);
        assert_eq!(counters.empty_objects, 0);
        assert_eq!(counters.stored_objects(), 9);
    }

    #[test]
    fn test_auto_batch_submission() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Compact)
            .with_thresholds(small_thresholds(EncodingVariant::Compact));
        let mut store = ObjectStore::create(config).unwrap();

        for id in 1..=4 {
            store.store(&Entity::point(id, 1, Location::new(1.0, 1.0))).unwrap();
        }
        assert_eq!(store.pending_writes(), 4);
        assert!(store.get(1, EntityKind::Point, 1).unwrap_err().is_not_found());

        store.store(&Entity::point(5, 1, Location::new(1.0, 1.0))).unwrap();
        assert_eq!(store.pending_writes(), 0);
        assert_eq!(store.submitted_batches(), 1);
        assert!(store.get(1, EntityKind::Point, 1).is_ok());
        assert!(store.get(5, EntityKind::Point, 1).is_ok());

        store.store(&Entity::point(6, 1, Location::new(1.0, 1.0))).unwrap();
        assert_eq!(store.pending_writes(), 1);
    }

    #[test]
    fn test_compact_roundtrip() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Compact);
        let mut store = ObjectStore::create(config).unwrap();

        let way = Entity::way(77, 2, vec![10, 20, 30]).with_tag("building", "yes");
        assert_eq!(store.store(&way).unwrap(), StoreOutcome::Stored(Partition::Ways));
        store.flush_pending().unwrap();

        let bytes = store.get(77, EntityKind::Way, 2).unwrap();
        assert_eq!(CompactCodec::decode(&bytes).unwrap(), way);
    }

    #[test]
    fn test_document_skip_is_not_found() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Document)
            .with_geometries(false);
        let mut store = ObjectStore::create(config).unwrap();

        let point = Entity::point(3, 1, Location::new(1.0, 1.0));
        assert_eq!(store.store(&point).unwrap(), StoreOutcome::Skipped);
        store.flush().unwrap();

        assert_eq!(store.counters().empty_objects, 1);
        assert_eq!(store.counters().stored_nodes, 0);
        assert!(store.get(3, EntityKind::Point, 1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_geometry_still_stored() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Document);
        let mut store = ObjectStore::create(config).unwrap();

        let point = Entity::point(9, 2, Location::new(f64::NAN, 0.0)).with_tag("name", "x");
        assert_eq!(store.store(&point).unwrap(), StoreOutcome::Stored(Partition::Nodes));
        store.flush_pending().unwrap();

        let doc = DocumentCodec::decode(&store.get(9, EntityKind::Point, 2).unwrap()).unwrap();
        assert_eq!(doc.geometry, None);
        assert_eq!(doc.tags.unwrap()["name"], "x");
    }

    #[test]
    fn test_way_without_references_still_stored() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Document);
        let mut store = ObjectStore::create(config).unwrap();

        let mut way = Entity::way(12, 1, vec![]).with_tag("highway", "track");
        way.references = None;
        assert_eq!(store.store(&way).unwrap(), StoreOutcome::Stored(Partition::Ways));
        store.flush_pending().unwrap();

        let doc = DocumentCodec::decode(&store.get(12, EntityKind::Way, 1).unwrap()).unwrap();
        assert_eq!(doc.references, None);
        assert_eq!(doc.tags.unwrap()["highway"], "track");
        assert_eq!(store.counters().stored_ways, 1);
    }

    #[test]
    fn test_scheduled_partition_flush() {
        let dir = tempdir().unwrap();
        let thresholds = FlushThresholds {
            batch_ops: 1000,
            nodes: 3,
            ways: 2,
            relations: 1,
        };
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Compact)
            .with_thresholds(thresholds);
        let mut store = ObjectStore::create(config).unwrap();

        for id in 1..=7 {
            store.store(&Entity::point(id, 1, Location::new(1.0, 1.0))).unwrap();
        }
        // nodes flushed at 3 and 6, each followed by a stats report
        assert_eq!(store.scheduled_flushes(), 2);
        assert_eq!(store.stats_reports(), 2);

        store.store(&Entity::relation(1, 1, vec![])).unwrap();
        assert_eq!(store.scheduled_flushes(), 3);
        assert_eq!(store.stats_reports(), 3);

        // below the ways threshold: no flush, no report
        store.store(&Entity::way(1, 1, vec![1, 2])).unwrap();
        assert_eq!(store.scheduled_flushes(), 3);
        assert_eq!(store.stats_reports(), 3);
    }

    #[test]
    fn test_failed_auto_flush_keeps_counters_exact() {
        use crate::storage::{BatchSink, PendingWrite};

        struct FailingSink;

        impl BatchSink for FailingSink {
            fn submit(&self, _writes: &[PendingWrite]) -> Result<(), StoreError> {
                Err(StoreError::Database("disk full".into()))
            }
        }

        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Compact)
            .with_thresholds(small_thresholds(EncodingVariant::Compact));
        let mut store = ObjectStore::create(config).unwrap();

        // Fifth write tips the batch over; its submit fails.
        for id in 1..=5 {
            store.enqueue(&Entity::point(id, 1, Location::new(1.0, 1.0))).unwrap();
        }
        assert!(store.buffer.flush_if_full(&FailingSink).is_err());
        assert_eq!(store.counters().stored_nodes, 5);
        assert_eq!(store.pending_writes(), 5);

        // The next store submits the kept batch along with its own write.
        store.store(&Entity::point(6, 1, Location::new(1.0, 1.0))).unwrap();
        assert_eq!(store.pending_writes(), 0);
        assert_eq!(store.counters().stored_nodes, 6);

        let persisted = (1..=6)
            .filter(|&id| store.get(id, EntityKind::Point, 1).is_ok())
            .count() as u64;
        assert_eq!(persisted, store.counters().stored_nodes);
        store.flush().unwrap();
    }

    #[test]
    fn test_teardown_report() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::for_testing(dir.path().join("db"), EncodingVariant::Compact);
        let mut store = ObjectStore::create(config).unwrap();

        store.store(&Entity::point(1, 1, Location::new(1.0, 1.0))).unwrap();
        store.store(&Entity::point(1, 2, Location::new(1.5, 1.0))).unwrap();

        let report = store.flush().unwrap();
        assert_eq!(report.submitted_writes, 2);
        assert_eq!(report.flushes.len(), 3);
        assert_eq!(report.compactions.len(), 3);
        let compacted: Vec<_> = report.compactions.iter().map(|t| t.partition).collect();
        assert_eq!(compacted, Partition::ALL);
        assert_eq!(report.stats.get(Partition::Nodes).unwrap().stored, 2);
        assert_eq!(store.pending_writes(), 0);
    }
}
