//! Pipeline configuration
//!
//! Built once (usually from CLI flags) and handed to [`crate::Pipeline::new`];
//! nothing in the pipeline reads process-wide settings.

use std::path::PathBuf;

use crate::chunk_reader::DEFAULT_BLOCK_SIZE;
use crate::error::{AggregateError, Result};

/// Default input file name
pub const DEFAULT_SOURCE: &str = "measurements.txt";

/// Chunks allowed to wait in the queue between reader and workers.
/// Peak memory is roughly `(this + workers) × block_size`.
pub const DEFAULT_CHUNK_QUEUE_CAPACITY: usize = 4;

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Measurement file to aggregate
    pub source: PathBuf,
    /// Bytes requested per read
    pub block_size: usize,
    /// Number of parsing workers
    pub workers: usize,
    /// Capacity of the reader → workers queue
    pub chunk_queue_capacity: usize,
    /// Capacity of the workers → reducer queue
    pub result_queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let workers = num_cpus::get();
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            block_size: DEFAULT_BLOCK_SIZE,
            workers,
            chunk_queue_capacity: DEFAULT_CHUNK_QUEUE_CAPACITY,
            result_queue_capacity: workers,
        }
    }
}

impl PipelineConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_chunk_queue_capacity(mut self, capacity: usize) -> Self {
        self.chunk_queue_capacity = capacity;
        self
    }

    pub fn with_result_queue_capacity(mut self, capacity: usize) -> Self {
        self.result_queue_capacity = capacity;
        self
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("block size", self.block_size),
            ("worker count", self.workers),
            ("chunk queue capacity", self.chunk_queue_capacity),
            ("result queue capacity", self.result_queue_capacity),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);

        match zero {
            Some((name, _)) => Err(AggregateError::InvalidConfig(format!(
                "{name} must be at least 1"
            ))),
            None => Ok(()),
        }
    }
}
