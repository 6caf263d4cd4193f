//! Parallel aggregation pipeline
//!
//! ```text
//! ChunkReader ──(bounded chunk queue)──▶ N workers ──(bounded result queue)──▶ reducer
//! ```
//!
//! The reader and the workers run on scoped threads; the reducer runs on the
//! calling thread. Workers share no aggregation state: each chunk becomes its
//! own partial table and only the reducer touches the global table, so no
//! locks sit on the hot path. Both queues are bounded, which caps in-flight
//! memory at a few blocks regardless of input size.
//!
//! The result queue closes once the reader and every worker have dropped
//! their senders, which is the barrier the reducer waits on.
//!
//! On the first error (a failed read, an unterminated tail, a malformed
//! record) the abort flag is raised: the reader stops, workers keep draining
//! the chunk queue but discard what they receive, and the reducer discards
//! remaining partials. That first error is what the run returns.

use std::fs::File;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::aggregate::AggregateTable;
use crate::chunk_reader::{Chunk, ChunkReader};
use crate::config::PipelineConfig;
use crate::error::{AggregateError, Result};
use crate::parser::parse_chunk;

type PartialResult = Result<AggregateTable>;

/// Counters for a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    /// Chunks emitted by the reader
    pub chunks: u64,
    /// Bytes read from the source
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Final table plus run statistics
#[derive(Debug)]
pub struct PipelineOutput {
    pub table: AggregateTable,
    pub stats: PipelineStats,
}

/// A validated, reusable pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Open the configured source file and aggregate it.
    pub fn run(&self) -> Result<PipelineOutput> {
        let path = &self.config.source;
        let file = File::open(path).map_err(|source| AggregateError::SourceOpen {
            path: path.clone(),
            source,
        })?;
        info!(source = %path.display(), "aggregating file");
        self.run_reader(file)
    }

    /// Aggregate any byte source.
    pub fn run_reader<R: Read + Send>(&self, source: R) -> Result<PipelineOutput> {
        let PipelineConfig {
            block_size,
            workers,
            chunk_queue_capacity,
            result_queue_capacity,
            ..
        } = self.config;

        let start = Instant::now();
        let abort = AtomicBool::new(false);

        info!(
            workers,
            block_size,
            chunk_queue_capacity,
            result_queue_capacity,
            "pipeline starting"
        );

        let (table, (chunks, bytes)) = thread::scope(|scope| -> Result<_> {
            // Channels live inside the scope so an early return drops them
            // before the scope joins, unblocking any thread still sending.
            let (chunk_tx, chunk_rx) = bounded::<Chunk>(chunk_queue_capacity);
            let (result_tx, result_rx) = bounded::<PartialResult>(result_queue_capacity);
            let abort = &abort;

            let reader = {
                let result_tx = result_tx.clone();
                let chunk_reader = ChunkReader::new(source, block_size);
                spawn(scope, "chunk-reader".to_string(), move || {
                    read_chunks(chunk_reader, chunk_tx, result_tx, abort)
                })?
            };

            let mut handles = Vec::with_capacity(workers);
            for worker_idx in 0..workers {
                let chunk_rx = chunk_rx.clone();
                let result_tx = result_tx.clone();
                let handle = spawn(scope, format!("agg-worker-{worker_idx}"), move || {
                    work(chunk_rx, result_tx, abort)
                })?;
                handles.push(handle);
            }

            // Drop our copies so disconnection is driven by the spawned units.
            drop(chunk_rx);
            drop(result_tx);

            let outcome = reduce(result_rx, abort);

            let reader_stats = join(reader, "chunk-reader");
            let mut panicked = None;
            for (worker_idx, handle) in handles.into_iter().enumerate() {
                match join(handle, &format!("agg-worker-{worker_idx}")) {
                    Ok(parsed) => debug!(worker_idx, parsed, "worker finished"),
                    Err(e) => {
                        panicked.get_or_insert(e);
                    }
                }
            }

            let table = outcome?;
            let reader_stats = reader_stats?;
            if let Some(e) = panicked {
                return Err(e);
            }
            Ok((table, reader_stats))
        })?;

        let stats = PipelineStats {
            chunks,
            bytes,
            elapsed: start.elapsed(),
        };
        info!(
            keys = table.len(),
            chunks = stats.chunks,
            bytes = stats.bytes,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "pipeline finished"
        );
        Ok(PipelineOutput { table, stats })
    }
}

/// Aggregate the file named by `config` and return only the table.
pub fn aggregate_file(config: PipelineConfig) -> Result<AggregateTable> {
    Ok(Pipeline::new(config)?.run()?.table)
}

fn spawn<'scope, 'env, T, F>(
    scope: &'scope thread::Scope<'scope, 'env>,
    name: String,
    f: F,
) -> Result<ScopedJoinHandle<'scope, T>>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn_scoped(scope, f)
        .map_err(|source| AggregateError::ThreadSpawn { unit: name, source })
}

fn join<T>(handle: ScopedJoinHandle<'_, T>, unit: &str) -> Result<T> {
    handle.join().map_err(|_| AggregateError::ThreadPanicked {
        unit: unit.to_string(),
    })
}

/// Reader unit: feed chunks until EOF, error, or abort.
///
/// Returns `(chunks emitted, bytes read)`.
fn read_chunks<R: Read>(
    mut reader: ChunkReader<R>,
    chunks: Sender<Chunk>,
    results: Sender<PartialResult>,
    abort: &AtomicBool,
) -> (u64, u64) {
    while !abort.load(Ordering::Relaxed) {
        match reader.next_chunk() {
            Ok(Some(chunk)) => {
                // Blocks while the queue is full; fails only if every worker is gone.
                if chunks.send(chunk).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                abort.store(true, Ordering::Relaxed);
                let _ = results.send(Err(e));
                break;
            }
        }
    }
    (reader.chunks_emitted(), reader.bytes_read())
}

/// Worker unit: one partial table per chunk until the chunk queue closes.
///
/// Returns the number of chunks parsed.
fn work(chunks: Receiver<Chunk>, results: Sender<PartialResult>, abort: &AtomicBool) -> u64 {
    let mut parsed = 0;
    for chunk in chunks.iter() {
        if abort.load(Ordering::Relaxed) {
            // Drain and discard so the reader never blocks on a dead queue.
            continue;
        }
        let partial = parse_chunk(&chunk);
        drop(chunk);
        parsed += 1;
        if partial.is_err() {
            abort.store(true, Ordering::Relaxed);
        }
        if results.send(partial).is_err() {
            break;
        }
    }
    parsed
}

/// Reducer: fold every partial table into one, or keep the first error.
fn reduce(results: Receiver<PartialResult>, abort: &AtomicBool) -> Result<AggregateTable> {
    let mut table = AggregateTable::new();
    let mut first_error = None;

    for partial in results.iter() {
        match partial {
            Ok(partial) if first_error.is_none() => {
                debug!(keys = partial.len(), "merging partial table");
                table.merge(partial);
            }
            Ok(_) => {}
            Err(e) => {
                if first_error.is_none() {
                    warn!(error = %e, "aborting pipeline");
                    abort.store(true, Ordering::Relaxed);
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(table),
    }
}
