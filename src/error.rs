//! Error types for the aggregation pipeline
//!
//! Every error is fatal to the run: nothing is skipped or defaulted, so a
//! table that comes back `Ok` accounts for every record in the source.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::temperature::DecodeError;

/// Pipeline-level failure. The first one raised anywhere in the pipeline wins.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Input file could not be opened
    #[error("failed to open {}: {source}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O failure while streaming the source
    #[error("read failed at byte offset {offset}: {source}")]
    SourceRead {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// A record whose key/value could not be parsed
    #[error("malformed record at byte offset {offset} ({record:?}): {reason}")]
    RecordParse {
        offset: u64,
        record: String,
        #[source]
        reason: RecordError,
    },

    /// Input does not end with a terminated record
    #[error("input ends with an unterminated record of {len} bytes at byte offset {offset}")]
    IncompleteTrailingRecord { offset: u64, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn {unit} thread: {source}")]
    ThreadSpawn {
        unit: String,
        #[source]
        source: io::Error,
    },

    #[error("{unit} thread panicked")]
    ThreadPanicked { unit: String },
}

/// Why a single record was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing ';' between key and value")]
    MissingDelimiter,

    #[error("record is not terminated by '\\n'")]
    MissingTerminator,

    #[error(transparent)]
    Value(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, AggregateError>;
