//! station-agg - Parallel min/mean/max aggregation of measurement files
//!
//! Input is a text file of `station;temperature\n` records. The file is cut
//! into record-aligned chunks, parsed by a pool of workers into partial
//! tables, and folded by a single reducer into one [`AggregateTable`].
//!
//! ```no_run
//! use station_agg::{report, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::new("measurements.txt"))?;
//! let output = pipeline.run()?;
//! println!("{}", report::format_report(&output.table));
//! # Ok::<(), station_agg::AggregateError>(())
//! ```

pub mod aggregate;
pub mod chunk_reader;
pub mod config;
pub mod error;
/// Synthetic measurement generation
pub mod generate;
pub mod parser;
pub mod pipeline;
/// Report rendering
pub mod report;
pub mod temperature;

pub use aggregate::{Aggregate, AggregateTable};
pub use chunk_reader::{Chunk, ChunkReader};
pub use config::PipelineConfig;
pub use error::{AggregateError, RecordError, Result};
pub use pipeline::{aggregate_file, Pipeline, PipelineOutput, PipelineStats};
pub use temperature::{decode, DecodeError, FixedPoint};
