//! Persistent storage layer for versioned map entities.
//!
//! Architecture:
//! ```text
//! ┌─────────────┐  put   ┌─────────────┐  submit  ┌────────────────────────────┐
//! │ ObjectStore │ ─────► │ WriteBuffer │ ───────► │ PartitionedStore (RocksDB) │
//! │             │        │ (one batch) │ > limit  │                            │
//! └──────┬──────┘        └─────────────┘          │ CF "nodes"     — points    │
//!        │ counters                               │ CF "ways"      — ways      │
//!        ▼                                        │ CF "relations" — relations │
//! ┌──────────────┐  flush_cf / compact_range_cf   │ CF "default"   — unused    │
//! │FlushScheduler│ ─────────────────────────────► └────────────────────────────┘
//! └──────┬───────┘                                          ▲
//!        ▼                  estimate-num-keys               │
//! ┌──────────────┐ ─────────────────────────────────────────┘
//! │StatsReporter │
//! └──────────────┘
//! ```
//!
//! | Threshold             | Compact   | Document  |
//! |-----------------------|-----------|-----------|
//! | batch submit (ops >)  | 2,000     | 1,000     |
//! | nodes flush (every)   | 5,000,000 | 4,000,000 |
//! | ways flush (every)    | 2,000,000 | 2,000,000 |
//! | relations flush       | 1,000,000 | 1,000,000 |

pub mod batch;
pub mod config;
pub mod engine;
pub mod schedule;
pub mod stats;

pub use batch::{BatchSink, PendingWrite, WriteBuffer};
pub use config::{FlushThresholds, StoreConfig};
pub use engine::{OpenMode, PartitionedStore};
pub use schedule::{FlushScheduler, PartitionTiming};
pub use stats::{PartitionStats, StatsReport, StatsReporter, StoreCounters};
