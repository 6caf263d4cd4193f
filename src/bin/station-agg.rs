//! station-agg CLI tool
//!
//! Command-line interface for aggregating and generating measurement files

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use station_agg::chunk_reader::DEFAULT_BLOCK_SIZE;
use station_agg::config::{DEFAULT_CHUNK_QUEUE_CAPACITY, DEFAULT_SOURCE};
use station_agg::{generate, report, Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "low-mem-alloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "station-agg")]
#[command(about = "Min/mean/max per station over very large measurement files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a measurement file and print the report
    Aggregate {
        /// Measurement file (`station;temperature` per line)
        #[arg(short, long, env = "STATION_AGG_FILE", default_value = DEFAULT_SOURCE)]
        file: PathBuf,
        /// Bytes requested per read
        #[arg(long, env = "STATION_AGG_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,
        /// Parsing worker threads (defaults to available CPUs)
        #[arg(short, long, env = "STATION_AGG_WORKERS")]
        workers: Option<usize>,
        /// Chunks allowed to wait between reader and workers
        #[arg(long, env = "STATION_AGG_CHUNK_QUEUE", default_value_t = DEFAULT_CHUNK_QUEUE_CAPACITY)]
        chunk_queue: usize,
        /// Partial tables allowed to wait for the reducer (defaults to worker count)
        #[arg(long, env = "STATION_AGG_RESULT_QUEUE")]
        result_queue: Option<usize>,
        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Print elapsed time to stderr
        #[arg(long)]
        timing: bool,
    },
    /// Write a synthetic measurement file
    Generate {
        /// Output path
        #[arg(short, long, default_value = DEFAULT_SOURCE)]
        output: PathBuf,
        /// Number of rows
        #[arg(long, default_value_t = 1_000_000)]
        rows: u64,
        /// Number of distinct stations
        #[arg(long, default_value_t = 400)]
        stations: usize,
        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `{key=min/mean/max, ...}`
    Text,
    /// Pretty-printed JSON array
    Json,
}

fn main() -> Result<()> {
    // Optional .env (input path, workers, block size) before clap reads env fallbacks
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            file,
            block_size,
            workers,
            chunk_queue,
            result_queue,
            format,
            timing,
        } => {
            let start = Instant::now();

            let mut config = PipelineConfig::new(file)
                .with_block_size(block_size)
                .with_chunk_queue_capacity(chunk_queue);
            if let Some(workers) = workers {
                config = config.with_workers(workers).with_result_queue_capacity(workers);
            }
            if let Some(result_queue) = result_queue {
                config = config.with_result_queue_capacity(result_queue);
            }

            let pipeline = Pipeline::new(config).context("Invalid pipeline configuration")?;
            let output = pipeline.run().with_context(|| {
                format!("Failed to aggregate {}", pipeline.config().source.display())
            })?;

            match format {
                OutputFormat::Text => println!("{}", report::format_report(&output.table)),
                OutputFormat::Json => println!(
                    "{}",
                    report::format_json(&output.table, true).context("Failed to encode report")?
                ),
            }

            if timing {
                eprintln!("Time took: {:?}", start.elapsed());
            }
        }
        Commands::Generate {
            output,
            rows,
            stations,
            seed,
        } => {
            let start = Instant::now();
            generate::generate_file(&output, rows, stations, seed)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Wrote {} rows over {} stations to {} in {:.1}s",
                rows,
                stations,
                output.display(),
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}
