//! Record-aligned chunking of a byte stream
//!
//! Reads the source in fixed-size blocks into one reusable scratch buffer and
//! re-cuts them at the last `\n` of each block. Bytes after that terminator
//! are carried into the next chunk, so every emitted chunk holds whole
//! records only and the chunks concatenate back to the exact source.
//!
//! Chunks are copied out of the scratch buffer: the buffer is overwritten by
//! the next read, and a chunk may still be queued or being parsed by then.

use std::io::{ErrorKind, Read};

use memchr::memrchr;
use tracing::debug;

use crate::error::{AggregateError, Result};
use crate::parser::TERMINATOR;

/// Default read block size (64 MiB)
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024 * 1024;

/// Owned, record-aligned slice of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: u64,
    offset: u64,
    bytes: Box<[u8]>,
}

impl Chunk {
    pub fn new(index: u64, offset: u64, bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            index,
            offset,
            bytes: bytes.into(),
        }
    }

    /// Sequence number in emission order
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Absolute byte offset of the first byte in the source
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Splits a readable source into [`Chunk`]s
pub struct ChunkReader<R> {
    source: R,
    scratch: Vec<u8>,
    /// Incomplete trailing record carried over from the previous block
    leftover: Vec<u8>,
    /// Absolute offset of the next chunk (= start of `leftover`)
    offset: u64,
    /// Bytes pulled from the source so far
    consumed: u64,
    next_index: u64,
    finished: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(source: R, block_size: usize) -> Self {
        Self {
            source,
            scratch: vec![0u8; block_size.max(1)],
            leftover: Vec::new(),
            offset: 0,
            consumed: 0,
            next_index: 0,
            finished: false,
        }
    }

    /// Total bytes read from the source so far
    pub fn bytes_read(&self) -> u64 {
        self.consumed
    }

    /// Chunks emitted so far
    pub fn chunks_emitted(&self) -> u64 {
        self.next_index
    }

    /// Next record-aligned chunk, `Ok(None)` at a clean end of input.
    ///
    /// After the first error the reader is finished and keeps returning
    /// `Ok(None)`.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        while !self.finished {
            let filled = self.fill()?;
            if filled == 0 {
                self.finished = true;
                if self.leftover.is_empty() {
                    return Ok(None);
                }
                return Err(AggregateError::IncompleteTrailingRecord {
                    offset: self.offset,
                    len: self.leftover.len(),
                });
            }

            // Only the first `filled` bytes are this read; the tail is stale.
            let block = &self.scratch[..filled];
            let Some(last) = memrchr(TERMINATOR, block) else {
                self.leftover.extend_from_slice(block);
                continue;
            };

            let mut bytes = Vec::with_capacity(self.leftover.len() + last + 1);
            bytes.extend_from_slice(&self.leftover);
            bytes.extend_from_slice(&block[..=last]);
            self.leftover.clear();
            self.leftover.extend_from_slice(&block[last + 1..]);

            let chunk = Chunk::new(self.next_index, self.offset, bytes);
            self.next_index += 1;
            self.offset += chunk.len() as u64;
            debug!(
                index = chunk.index,
                offset = chunk.offset,
                len = chunk.len(),
                carried = self.leftover.len(),
                "chunk emitted"
            );
            return Ok(Some(chunk));
        }
        Ok(None)
    }

    /// One read into the scratch buffer, retrying on `Interrupted`
    fn fill(&mut self) -> Result<usize> {
        loop {
            match self.source.read(&mut self.scratch) {
                Ok(n) => {
                    self.consumed += n as u64;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    self.finished = true;
                    return Err(AggregateError::SourceRead {
                        offset: self.consumed,
                        source,
                    });
                }
            }
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
