//! Cross-partition write batching.
//!
//! ```text
//! put ──► [ w | w | w | ... | w ]
//!                                 │ len > threshold
//!                                 ▼
//!              flush_if_full ──► sink.submit(all) ──► clear
//! ```
//!
//! One batch is shared by all three partitions. `put` never rejects a
//! write. The caller follows every `put` with `flush_if_full`, which
//! submits the whole batch synchronously once it outgrows its threshold,
//! so ingestion latency spikes on those calls.

use crate::entity::Partition;
use crate::error::StoreError;
use crate::key::LookupKey;

/// One queued key/value write.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub partition: Partition,
    pub key: LookupKey,
    pub value: Vec<u8>,
}

/// Destination of submitted batches.
pub trait BatchSink {
    /// Apply every write in `writes` as one atomic batch.
    fn submit(&self, writes: &[PendingWrite]) -> Result<(), StoreError>;
}

/// Pending writes awaiting submission.
#[derive(Debug)]
pub struct WriteBuffer {
    pending: Vec<PendingWrite>,
    threshold: usize,
    /// Number of batches submitted over the lifetime of the buffer
    submitted_batches: u64,
}

impl WriteBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            pending: Vec::with_capacity(threshold + 1),
            threshold,
            submitted_batches: 0,
        }
    }

    /// Queue a write. Never fails; returns `true` once the batch has
    /// outgrown its threshold and [`flush_if_full`](Self::flush_if_full)
    /// will submit it.
    pub fn put(&mut self, partition: Partition, key: LookupKey, value: Vec<u8>) -> bool {
        self.pending.push(PendingWrite { partition, key, value });
        self.is_full()
    }

    /// Submit the batch if it outgrew its threshold. Returns `true` if it
    /// was submitted.
    ///
    /// A failed submit keeps every queued write, including the one that
    /// tipped the batch over.
    pub fn flush_if_full<S: BatchSink + ?Sized>(&mut self, sink: &S) -> Result<bool, StoreError> {
        if !self.is_full() {
            return Ok(false);
        }
        log::debug!("Submitting batch of {} writes", self.pending.len());
        self.flush_to(sink)?;
        Ok(true)
    }

    /// Submit everything pending. Returns the number of writes submitted.
    ///
    /// On failure the batch is kept so the caller may retry.
    pub fn flush_to<S: BatchSink + ?Sized>(&mut self, sink: &S) -> Result<usize, StoreError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        sink.submit(&self.pending)?;
        let submitted = self.pending.len();
        self.pending.clear();
        self.submitted_batches += 1;
        Ok(submitted)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.pending.len() > self.threshold
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[inline]
    pub fn submitted_batches(&self) -> u64 {
        self.submitted_batches
    }
}
