//! Counter-driven partition flushes.
//!
//! Every `threshold` stored records of a kind, that kind's memtable is
//! flushed to disk. This bounds resident memory during multi-hour
//! ingestion and is independent of the (much finer) batch threshold.
//! At teardown every partition is flushed and then compacted over its
//! full key range so the read-mode store serves point lookups from as
//! few levels as possible.

use std::time::Duration;

use super::config::FlushThresholds;
use super::engine::PartitionedStore;
use crate::entity::Partition;
use crate::error::StoreError;

/// Time spent on one partition operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionTiming {
    pub partition: Partition,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct FlushScheduler {
    thresholds: FlushThresholds,
    /// Threshold-triggered flushes so far
    triggered: u64,
}

impl FlushScheduler {
    pub fn new(thresholds: FlushThresholds) -> Self {
        Self {
            thresholds,
            triggered: 0,
        }
    }

    /// `true` when `stored` sits on a multiple of the partition threshold.
    pub fn is_due(&self, partition: Partition, stored: u64) -> bool {
        let threshold = self.thresholds.for_partition(partition);
        threshold != 0 && stored != 0 && stored % threshold == 0
    }

    /// Flush `partition` if `stored` crossed its threshold.
    pub fn on_stored(
        &mut self,
        store: &PartitionedStore,
        partition: Partition,
        stored: u64,
    ) -> Result<bool, StoreError> {
        if !self.is_due(partition, stored) {
            return Ok(false);
        }
        store.flush_partition(partition)?;
        self.triggered += 1;
        Ok(true)
    }

    pub fn flush_all(&self, store: &PartitionedStore) -> Result<Vec<PartitionTiming>, StoreError> {
        Partition::ALL
            .iter()
            .map(|&partition| {
                Ok(PartitionTiming {
                    partition,
                    elapsed: store.flush_partition(partition)?,
                })
            })
            .collect()
    }

    pub fn compact_all(&self, store: &PartitionedStore) -> Result<Vec<PartitionTiming>, StoreError> {
        Partition::ALL
            .iter()
            .map(|&partition| {
                Ok(PartitionTiming {
                    partition,
                    elapsed: store.compact_partition(partition)?,
                })
            })
            .collect()
    }

    pub fn triggered(&self) -> u64 {
        self.triggered
    }

    pub fn thresholds(&self) -> &FlushThresholds {
        &self.thresholds
    }
}
