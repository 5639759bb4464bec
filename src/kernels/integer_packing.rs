//! This module contains the pure, stateless kernels for integer packing.
//!
//! This is a Layer 3 (Bit-Width Reduction) transform. A 32-bit stream is
//! narrowed to 8 or 16 bits (signed when any value is negative, unsigned
//! otherwise). A value that does not fit is written as a run of the type's
//! limit followed by the remainder, so rare large values cost a few extra
//! elements instead of widening the whole column. When even the 16-bit form is
//! larger than the raw stream, packing is skipped and the stream stays 32-bit.
//!
//! `packed_len` is exact, so the classifier can price a candidate without
//! running this kernel.

use crate::error::BinaryCifError;
use crate::types::{DataType, TypedArray};

//==================================================================================
// 1. Packing Analysis
//==================================================================================

/// The limits for one packed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limits {
    upper: i64,
    lower: i64,
}

impl Limits {
    fn new(is_unsigned: bool, byte_count: u8) -> Self {
        match (is_unsigned, byte_count) {
            (true, 1) => Limits { upper: 0xFF, lower: 0 },
            (true, _) => Limits { upper: 0xFFFF, lower: 0 },
            (false, 1) => Limits { upper: 0x7F, lower: -0x80 },
            (false, _) => Limits { upper: 0x7FFF, lower: -0x8000 },
        }
    }
}

/// Number of packed elements a single value expands to.
#[inline]
fn value_len(value: i64, limits: Limits) -> usize {
    if value >= 0 {
        (value / limits.upper) as usize + 1
    } else {
        (value / limits.lower) as usize + 1
    }
}

/// The outcome of sizing a stream for packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packing {
    pub is_unsigned: bool,
    /// 1, 2 or 4. A value of 4 means the stream is stored unpacked.
    pub byte_count: u8,
    /// Element count after packing.
    pub packed_len: usize,
}

impl Packing {
    /// Size in bytes of the packed payload.
    pub fn byte_len(&self) -> usize {
        self.packed_len * self.byte_count as usize
    }
}

/// Sizes `values` for packing using exact per-width element counts.
pub fn determine_packing(values: &[i64]) -> Packing {
    let is_unsigned = values.iter().all(|&v| v >= 0);
    let limits8 = Limits::new(is_unsigned, 1);
    let limits16 = Limits::new(is_unsigned, 2);

    let (mut size8, mut size16) = (0usize, 0usize);
    for &v in values {
        size8 += value_len(v, limits8);
        size16 += value_len(v, limits16);
    }

    let n = values.len();
    if n * 4 < size16 * 2 {
        Packing { is_unsigned, byte_count: 4, packed_len: n }
    } else if size16 * 2 < size8 {
        Packing { is_unsigned, byte_count: 2, packed_len: size16 }
    } else {
        Packing { is_unsigned, byte_count: 1, packed_len: size8 }
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Packs `values` according to `packing`.
///
/// Returns `None` when `packing.byte_count == 4`; the caller stores the stream
/// as a plain `Int32` array in that case.
pub fn encode(values: &[i64], packing: Packing) -> Result<Option<TypedArray>, BinaryCifError> {
    if packing.byte_count == 4 {
        return Ok(None);
    }

    let limits = Limits::new(packing.is_unsigned, packing.byte_count);
    let mut packed: Vec<i64> = Vec::with_capacity(packing.packed_len);
    for &original in values {
        let mut value = original;
        if value >= 0 {
            while value >= limits.upper {
                packed.push(limits.upper);
                value -= limits.upper;
            }
        } else {
            while value <= limits.lower {
                packed.push(limits.lower);
                value -= limits.lower;
            }
        }
        packed.push(value);
    }

    let data_type = match (packing.is_unsigned, packing.byte_count) {
        (true, 1) => DataType::UInt8,
        (true, _) => DataType::UInt16,
        (false, 1) => DataType::Int8,
        (false, _) => DataType::Int16,
    };
    TypedArray::from_int_values(data_type, &packed).map(Some)
}

/// Unpacks a narrowed stream back into `src_size` values.
pub fn decode(
    packed: &TypedArray,
    byte_count: u8,
    is_unsigned: bool,
    src_size: usize,
) -> Result<Vec<i64>, BinaryCifError> {
    let values = packed.int_values().ok_or_else(|| {
        BinaryCifError::PackingDecodeError(format!(
            "Expected an integer stream, got {}",
            packed.data_type()
        ))
    })?;
    let limits = Limits::new(is_unsigned, byte_count);
    let is_limit = |v: i64| v == limits.upper || (!is_unsigned && v == limits.lower);

    let mut output = Vec::with_capacity(src_size);
    let mut iter = values.into_iter();
    while let Some(mut element) = iter.next() {
        let mut value = 0i64;
        while is_limit(element) {
            value += element;
            element = iter.next().ok_or_else(|| {
                BinaryCifError::PackingDecodeError("Stream ends inside a packed value".to_string())
            })?;
        }
        output.push(value + element);
    }

    if output.len() != src_size {
        return Err(BinaryCifError::PackingDecodeError(format!(
            "Decoded to {} values, but expected {}",
            output.len(),
            src_size
        )));
    }
    Ok(output)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(values: &[i64]) -> Packing {
        let packing = determine_packing(values);
        match encode(values, packing).unwrap() {
            Some(packed) => {
                assert_eq!(packed.len(), packing.packed_len);
                let decoded =
                    decode(&packed, packing.byte_count, packing.is_unsigned, values.len()).unwrap();
                assert_eq!(decoded, values);
            }
            None => assert_eq!(packing.byte_count, 4),
        }
        packing
    }

    #[test]
    fn test_small_unsigned_values_pack_to_one_byte() {
        let packing = roundtrip(&[1, 2, 3]);
        assert_eq!(
            packing,
            Packing { is_unsigned: true, byte_count: 1, packed_len: 3 }
        );
    }

    #[test]
    fn test_limit_values_are_split() {
        // 255 is the unsigned 8-bit limit, so it becomes [255, 0].
        let values = vec![255, 10, 510];
        let packing = determine_packing(&values);
        assert_eq!(packing.byte_count, 1);
        let packed = encode(&values, packing).unwrap().unwrap();
        assert_eq!(packed, TypedArray::UInt8(vec![255, 0, 10, 255, 255, 0]));
        roundtrip(&values);
    }

    #[test]
    fn test_signed_limits() {
        let values = vec![-128, 127, -1, 0, -300];
        let packing = roundtrip(&values);
        assert!(!packing.is_unsigned);
    }

    #[test]
    fn test_wide_values_fall_back_to_int32() {
        let values: Vec<i64> = vec![i32::MAX as i64, i32::MIN as i64, 1_000_000];
        let packing = roundtrip(&values);
        assert_eq!(packing.byte_count, 4);
        assert_eq!(packing.byte_len(), 12);
    }

    #[test]
    fn test_mid_range_values_use_two_bytes() {
        let values: Vec<i64> = (0..100).map(|i| 1000 + i).collect();
        let packing = roundtrip(&values);
        assert_eq!(packing.byte_count, 2);
        assert_eq!(packing.packed_len, 100);
    }

    #[test]
    fn test_empty_stream() {
        let packing = roundtrip(&[]);
        assert_eq!(packing.byte_len(), 0);
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let result = decode(&TypedArray::UInt8(vec![255]), 1, true, 1);
        assert!(matches!(result, Err(BinaryCifError::PackingDecodeError(_))));
    }
}
