//! Record counters and stored-vs-estimated reports.
//!
//! The estimate comes from `rocksdb.estimate-num-keys`, which RocksDB
//! refreshes lazily. It routinely lags or overshoots the exact counters;
//! a mismatch is not an error.

use std::fmt;

use super::engine::PartitionedStore;
use crate::entity::Partition;
use crate::error::StoreError;

/// Exact per-store counters, mutated only by the store's write path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounters {
    /// Entities intentionally not persisted
    pub empty_objects: u64,
    /// Stored entities carrying at least one tag
    pub stored_tags: u64,
    pub stored_nodes: u64,
    pub stored_ways: u64,
    pub stored_relations: u64,
}

impl StoreCounters {
    pub fn stored(&self, partition: Partition) -> u64 {
        match partition {
            Partition::Nodes => self.stored_nodes,
            Partition::Ways => self.stored_ways,
            Partition::Relations => self.stored_relations,
        }
    }

    /// Increment a partition counter, returning the new value.
    pub(crate) fn record_stored(&mut self, partition: Partition) -> u64 {
        let counter = match partition {
            Partition::Nodes => &mut self.stored_nodes,
            Partition::Ways => &mut self.stored_ways,
            Partition::Relations => &mut self.stored_relations,
        };
        *counter += 1;
        *counter
    }

    pub fn stored_objects(&self) -> u64 {
        self.stored_nodes + self.stored_ways + self.stored_relations
    }
}

/// One partition's line in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionStats {
    pub partition: Partition,
    /// Engine estimate
    pub estimated: u64,
    /// Exact count queued by this store instance
    pub stored: u64,
}

/// Stats for all partitions, in partition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    pub partitions: Vec<PartitionStats>,
}

impl StatsReport {
    pub fn get(&self, partition: Partition) -> Option<&PartitionStats> {
        self.partitions.iter().find(|s| s.partition == partition)
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stored")?;
        for stats in &self.partitions {
            write!(f, " ~{}/{} {}", stats.estimated, stats.stored, stats.partition)?;
        }
        Ok(())
    }
}

/// Builds and logs stats reports.
#[derive(Debug, Default)]
pub struct StatsReporter {
    reports: u64,
}

impl StatsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect estimates from the engine and pair them with `counters`.
    pub fn report(
        &mut self,
        store: &PartitionedStore,
        counters: &StoreCounters,
    ) -> Result<StatsReport, StoreError> {
        let partitions = Partition::ALL
            .iter()
            .map(|&partition| {
                Ok(PartitionStats {
                    partition,
                    estimated: store.estimate_keys(partition)?,
                    stored: counters.stored(partition),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let report = StatsReport { partitions };
        self.reports += 1;
        log::info!("{report}");
        Ok(report)
    }

    /// Reports produced so far.
    pub fn reports(&self) -> u64 {
        self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut counters = StoreCounters::default();
        assert_eq!(counters.record_stored(Partition::Nodes), 1);
        assert_eq!(counters.record_stored(Partition::Nodes), 2);
        assert_eq!(counters.record_stored(Partition::Relations), 1);
        assert_eq!(counters.stored(Partition::Nodes), 2);
        assert_eq!(counters.stored(Partition::Ways), 0);
        assert_eq!(counters.stored_objects(), 3);
    }

    #[test]
    fn test_report_display() {
        let report = StatsReport {
            partitions: vec![
                PartitionStats { partition: Partition::Nodes, estimated: 98, stored: 100 },
                PartitionStats { partition: Partition::Ways, estimated: 12, stored: 10 },
                PartitionStats { partition: Partition::Relations, estimated: 0, stored: 1 },
            ],
        };
        assert_eq!(report.to_string(), "Stored ~98/100 nodes ~12/10 ways ~0/1 relations");
        assert_eq!(report.get(Partition::Ways).unwrap().stored, 10);
    }
}
