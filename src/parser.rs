//! Record parsing: `KEY;VALUE\n` lines into a partial [`AggregateTable`]

use memchr::memchr;

use crate::aggregate::AggregateTable;
use crate::chunk_reader::Chunk;
use crate::error::{AggregateError, RecordError, Result};
use crate::temperature::{self, FixedPoint};

/// Separates key from value
pub const DELIMITER: u8 = b';';
/// Ends every record
pub const TERMINATOR: u8 = b'\n';

/// Longest record excerpt carried in a parse error
const MAX_ERROR_EXCERPT: usize = 128;

/// Build the partial table for one chunk.
pub fn parse_chunk(chunk: &Chunk) -> Result<AggregateTable> {
    parse_records(chunk.bytes(), chunk.offset())
}

/// Parse `bytes` as a run of terminated records.
///
/// `base_offset` is the absolute source offset of `bytes[0]` and is only used
/// to locate errors. Any malformed record fails the whole run.
pub fn parse_records(bytes: &[u8], base_offset: u64) -> Result<AggregateTable> {
    let mut table = AggregateTable::new();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let rest = &bytes[cursor..];
        let (record, parsed) = match memchr(TERMINATOR, rest) {
            Some(end) => (&rest[..end], split_record(&rest[..end])),
            None => (rest, Err(RecordError::MissingTerminator)),
        };

        match parsed {
            Ok((key, value)) => table.observe(key, value),
            Err(reason) => {
                return Err(AggregateError::RecordParse {
                    offset: base_offset + cursor as u64,
                    record: excerpt(record),
                    reason,
                })
            }
        }
        cursor += record.len() + 1;
    }

    Ok(table)
}

/// Split one unterminated record into key bytes and decoded value
#[inline]
pub fn split_record(record: &[u8]) -> std::result::Result<(&[u8], FixedPoint), RecordError> {
    let split = memchr(DELIMITER, record).ok_or(RecordError::MissingDelimiter)?;
    let value = temperature::decode(&record[split + 1..])?;
    Ok((&record[..split], value))
}

fn excerpt(record: &[u8]) -> String {
    let end = record.len().min(MAX_ERROR_EXCERPT);
    String::from_utf8_lossy(&record[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temperature::DecodeError;

    #[test]
    fn test_parse_example_chunk() {
        let chunk = Chunk::new(
            0,
            0,
            b"Hamburg;12.0\nBulawayo;8.9\nPalembang;38.8\nHamburg;10.0\n".to_vec(),
        );
        let table = parse_chunk(&chunk).unwrap();
        assert_eq!(table.len(), 3);

        let hamburg = table.get(b"Hamburg").unwrap();
        assert_eq!(hamburg.count(), 2);
        assert_eq!(hamburg.min(), Some(FixedPoint::from_tenths(100)));
        assert_eq!(hamburg.max(), Some(FixedPoint::from_tenths(120)));
        assert_eq!(hamburg.mean(), Some(11.0));
        assert_eq!(table.get(b"Bulawayo").unwrap().count(), 1);
    }

    #[test]
    fn test_keys_outlive_chunk() {
        let table = {
            let chunk = Chunk::new(0, 0, b"St. John's;15.2\nSt. John's;-3.4\n".to_vec());
            parse_chunk(&chunk).unwrap()
        };
        let (key, agg) = table.iter().next().unwrap();
        assert_eq!(key, b"St. John's");
        assert_eq!(agg.sum_tenths(), 118);
    }

    #[test]
    fn test_empty_key_and_non_utf8_key() {
        let table = parse_records(b";1.0\n\xff\xfe;2.0\n", 0).unwrap();
        assert_eq!(table.get(b"").unwrap().count(), 1);
        assert_eq!(table.get(b"\xff\xfe").unwrap().count(), 1);
    }

    #[test]
    fn test_bad_value_reports_absolute_offset() {
        let err = parse_records(b"Hamburg;12.0\nBulawayo;8.95\n", 1000).unwrap_err();
        match err {
            AggregateError::RecordParse {
                offset,
                record,
                reason,
            } => {
                assert_eq!(offset, 1013);
                assert_eq!(record, "Bulawayo;8.95");
                assert_eq!(reason, RecordError::Value(DecodeError::Shape { len: 4 }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_delimiter() {
        let err = parse_records(b"Hamburg 12.0\n", 0).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::RecordParse {
                offset: 0,
                reason: RecordError::MissingDelimiter,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_terminator() {
        let err = parse_records(b"Hamburg;12.0\nHamburg;1.0", 0).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::RecordParse {
                offset: 13,
                reason: RecordError::MissingTerminator,
                ..
            }
        ));
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let err = parse_records(b"Hamburg;12.0\n\n", 0).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::RecordParse {
                offset: 13,
                reason: RecordError::MissingDelimiter,
                ..
            }
        ));
    }
}
