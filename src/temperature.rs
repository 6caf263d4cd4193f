//! Fixed-point temperature decoding
//!
//! Values are stored as tenths in an `i16`. The input domain is contractually
//! bounded to `-99.9..=99.9` with exactly one fractional digit, so decoding
//! reads fixed byte offsets instead of running a general numeric parser:
//!
//! - `D.D`  → `10 * d0 + d2`
//! - `DD.D` → `100 * d0 + 10 * d1 + d3`
//!
//! Either shape may carry a single leading `-`. Everything else is rejected.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A decimal with one fractional digit, stored as tenths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedPoint(i16);

impl FixedPoint {
    /// Largest value the decoder can produce (99.9)
    pub const MAX: FixedPoint = FixedPoint(999);
    /// Smallest value the decoder can produce (-99.9)
    pub const MIN: FixedPoint = FixedPoint(-999);

    pub const fn from_tenths(tenths: i16) -> Self {
        Self(tenths)
    }

    /// Raw scaled value (value × 10)
    pub const fn tenths(self) -> i16 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for FixedPoint {
    // Integer rendering keeps min/max exact; no float round trip.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenths = i32::from(self.0);
        let sign = if tenths < 0 { "-" } else { "" };
        let abs = tenths.abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
    }
}

impl Serialize for FixedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

/// Rejection reasons for a temperature field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty temperature")]
    Empty,

    #[error("temperature must look like D.D or DD.D ({len} bytes after sign)")]
    Shape { len: usize },

    #[error("non-digit byte 0x{byte:02x} in temperature")]
    NotADigit { byte: u8 },
}

#[inline(always)]
fn digit(byte: u8) -> Result<i16, DecodeError> {
    if byte.is_ascii_digit() {
        Ok(i16::from(byte - b'0'))
    } else {
        Err(DecodeError::NotADigit { byte })
    }
}

/// Decode a temperature field into tenths.
#[inline]
pub fn decode(bytes: &[u8]) -> Result<FixedPoint, DecodeError> {
    let (negative, digits) = match bytes {
        [] => return Err(DecodeError::Empty),
        [b'-', rest @ ..] => (true, rest),
        _ => (false, bytes),
    };

    let magnitude = match *digits {
        [d0, b'.', d2] => 10 * digit(d0)? + digit(d2)?,
        [d0, d1, b'.', d3] => 100 * digit(d0)? + 10 * digit(d1)? + digit(d3)?,
        _ => return Err(DecodeError::Shape { len: digits.len() }),
    };

    Ok(FixedPoint(if negative { -magnitude } else { magnitude }))
}
