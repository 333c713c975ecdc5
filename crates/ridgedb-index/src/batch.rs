//! Bulk index batches.
//!
//! Reindexing produces index updates faster than a search backend accepts
//! them one by one. An [`IndexBatch`] buffers updates and tells the producer
//! when to flush:
//!
//! 1. after each unit of work the producer pushes its updates
//! 2. [`IndexBatch::should_flush`] turns true once the batch is full or the
//!    injected [`ResourcePressure`] reports too little free memory
//! 3. [`IndexBatch::flush`] hands the whole batch to an [`IndexWriter`]
//!
//! A flush either lands the whole batch or fails and keeps it, so the caller
//! can retry it as a unit.

use tracing::{debug, warn};

use crate::config::BatchConfig;
use crate::error::{BackendError, IndexResult};
use crate::update::IndexUpdate;

/// Source of memory pressure for flush decisions.
pub trait ResourcePressure {
    /// Free memory as a percentage, `0..=100`.
    fn free_memory_percent(&self) -> u8;
}

/// Never reports pressure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPressure;

impl ResourcePressure for NoPressure {
    fn free_memory_percent(&self) -> u8 {
        100
    }
}

impl<F: Fn() -> u8> ResourcePressure for F {
    fn free_memory_percent(&self) -> u8 {
        self()
    }
}

/// Writes batches of index updates to a backend.
pub trait IndexWriter {
    /// Apply all of `updates`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns a classified [`BackendError`]; the batch is then considered
    /// unwritten.
    fn write_batch(&mut self, updates: &[IndexUpdate]) -> Result<(), BackendError>;
}

/// Pending index updates with a flush policy.
#[derive(Debug)]
pub struct IndexBatch<P = NoPressure> {
    config: BatchConfig,
    pressure: P,
    pending: Vec<IndexUpdate>,
}

impl IndexBatch {
    /// A batch that flushes on size only.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self::with_pressure(config, NoPressure)
    }
}

impl<P: ResourcePressure> IndexBatch<P> {
    /// A batch that also flushes when `pressure` reports low memory.
    #[must_use]
    pub fn with_pressure(config: BatchConfig, pressure: P) -> Self {
        Self { config, pressure, pending: Vec::with_capacity(config.batch_size.min(4096)) }
    }

    /// Add one update.
    pub fn push(&mut self, update: IndexUpdate) {
        self.pending.push(update);
    }

    /// Number of pending updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending updates in push order.
    #[must_use]
    pub fn pending(&self) -> &[IndexUpdate] {
        &self.pending
    }

    /// Whether the producer should flush now.
    ///
    /// True once the batch holds `batch_size` updates, or if it is not empty
    /// and free memory is at or below `min_free_memory_percent`.
    #[must_use]
    pub fn should_flush(&self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        self.pending.len() >= self.config.batch_size
            || self.pressure.free_memory_percent() <= self.config.min_free_memory_percent
    }

    /// Write every pending update through `writer`. Returns how many were
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Backend`](crate::IndexError::Backend) if the
    /// writer fails; all updates stay pending.
    pub fn flush(&mut self, writer: &mut dyn IndexWriter) -> IndexResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        if let Err(e) = writer.write_batch(&self.pending) {
            warn!(pending = self.pending.len(), error = %e, "index batch flush failed");
            return Err(e.into());
        }
        let written = self.pending.len();
        self.pending.clear();
        debug!(written, "flushed index batch");
        Ok(written)
    }
}

impl<P: ResourcePressure> Extend<IndexUpdate> for IndexBatch<P> {
    fn extend<I: IntoIterator<Item = IndexUpdate>>(&mut self, iter: I) {
        self.pending.extend(iter);
    }
}
