//! This module contains the pure, stateless kernels for delta encoding.
//!
//! This is a Layer 1 (Value Reduction) transform. The first value is lifted out
//! as the `origin` and the stream becomes `[0, x1 - x0, x2 - x1, ...]`, which
//! turns ascending identifiers into a run of small constants. Differences are
//! stored as `i32`; a stream whose differences do not fit is rejected so the
//! classifier can drop the candidate instead of wrapping silently.

use num_traits::{PrimInt, Signed};

use crate::error::BinaryCifError;

/// Delta-encodes `values`, returning `(origin, differences)`.
///
/// An empty input has origin `0` and no differences.
pub fn encode<T>(values: &[T]) -> Result<(T, Vec<i32>), BinaryCifError>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    let Some(&origin) = values.first() else {
        return Ok((T::zero(), Vec::new()));
    };

    let mut output = Vec::with_capacity(values.len());
    output.push(0);
    for window in values.windows(2) {
        let diff = window[1]
            .checked_sub(&window[0])
            .and_then(|d| d.to_i32())
            .ok_or_else(|| BinaryCifError::OutOfRange {
                encoding: "Delta",
                value: format!("{} - {}", window[1], window[0]),
            })?;
        output.push(diff);
    }
    Ok((origin, output))
}

/// Inverts `encode`: a running sum seeded with `origin`.
pub fn decode(origin: i64, deltas: &[i32]) -> Vec<i64> {
    let mut acc = origin;
    deltas
        .iter()
        .map(|&d| {
            acc += d as i64;
            acc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let original: Vec<i64> = vec![100, 110, 115, 112, 122];
        let (origin, deltas) = encode(&original).unwrap();
        assert_eq!(origin, 100);
        assert_eq!(deltas, vec![0, 10, 5, -3, 10]);
        assert_eq!(decode(origin, &deltas), original);
    }

    #[test]
    fn test_extreme_values_roundtrip() {
        let original: Vec<i64> = vec![i32::MIN as i64, -1, i32::MAX as i64 - 1];
        let (origin, deltas) = encode(&original).unwrap();
        assert_eq!(decode(origin, &deltas), original);
    }

    #[test]
    fn test_difference_overflow_is_rejected() {
        let original: Vec<i64> = vec![i32::MIN as i64, i32::MAX as i64];
        let result = encode(&original);
        assert!(matches!(result, Err(BinaryCifError::OutOfRange { .. })));
    }

    #[test]
    fn test_empty_and_single() {
        let (origin, deltas) = encode::<i64>(&[]).unwrap();
        assert_eq!((origin, deltas.len()), (0, 0));

        let (origin, deltas) = encode(&[7i64]).unwrap();
        assert_eq!(origin, 7);
        assert_eq!(deltas, vec![0]);
        assert_eq!(decode(origin, &deltas), vec![7]);
    }
}
