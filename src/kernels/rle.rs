//! This module contains the pure, stateless kernels for Run-Length Encoding.
//!
//! This technique is a Layer 2 (Sparsity Exploitation) transform, highly
//! effective for presence masks and categorical columns. The output is a flat,
//! interleaved `[value, run_length, value, run_length, ...]` array in the same
//! element domain as the values: `i32` for integer sources, the source float
//! width for float sources. Panic-free.

use num_traits::{NumCast, ToPrimitive};

use crate::error::BinaryCifError;

//==================================================================================
// 1. Generic Core Logic
//==================================================================================

/// Collapses `input` into `(value, run_length)` pairs.
pub fn runs<T: Copy + PartialEq>(input: &[T]) -> Vec<(T, usize)> {
    let mut output: Vec<(T, usize)> = Vec::new();
    for &val in input {
        match output.last_mut() {
            Some((current, count)) if *current == val => *count += 1,
            _ => output.push((val, 1)),
        }
    }
    output
}

/// Number of runs in `input` without materializing them.
pub fn count_runs<T: PartialEq>(input: &[T]) -> usize {
    if input.is_empty() {
        return 0;
    }
    1 + input.windows(2).filter(|w| w[0] != w[1]).count()
}

/// Interleaves runs into `[value, count, ...]` in the output domain `O`.
fn interleave<T, O>(input: &[T], encoding: &'static str) -> Result<Vec<O>, BinaryCifError>
where
    T: Copy + PartialEq + ToPrimitive + std::fmt::Display,
    O: NumCast,
{
    let pairs = runs(input);
    let mut output = Vec::with_capacity(pairs.len() * 2);
    for (value, count) in pairs {
        let v: O = NumCast::from(value).ok_or_else(|| BinaryCifError::OutOfRange {
            encoding,
            value: value.to_string(),
        })?;
        let c: O = NumCast::from(count).ok_or_else(|| BinaryCifError::OutOfRange {
            encoding,
            value: format!("run length {}", count),
        })?;
        output.push(v);
        output.push(c);
    }
    Ok(output)
}

/// Expands `[value, count, ...]` back into `src_size` values.
fn expand<T>(pairs: &[T], src_size: usize) -> Result<Vec<T>, BinaryCifError>
where
    T: Copy + ToPrimitive,
{
    if pairs.len() % 2 != 0 {
        return Err(BinaryCifError::RleDecodeError(format!(
            "Expected (value, count) pairs but got {} elements",
            pairs.len()
        )));
    }

    let mut output = Vec::with_capacity(src_size);
    for pair in pairs.chunks_exact(2) {
        let count = pair[1]
            .to_usize()
            .ok_or_else(|| BinaryCifError::RleDecodeError("Invalid run length".to_string()))?;
        if output.len() + count > src_size {
            return Err(BinaryCifError::RleDecodeError(format!(
                "Runs expand past the declared size of {}",
                src_size
            )));
        }
        output.extend(std::iter::repeat(pair[0]).take(count));
    }

    if output.len() != src_size {
        return Err(BinaryCifError::RleDecodeError(format!(
            "Decoded to {} values, but expected {}",
            output.len(),
            src_size
        )));
    }
    Ok(output)
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Run-length encodes integers into an `i32` pair stream.
pub fn encode_int(values: &[i64]) -> Result<Vec<i32>, BinaryCifError> {
    interleave(values, "RunLength")
}

pub fn decode_int(pairs: &[i32], src_size: usize) -> Result<Vec<i64>, BinaryCifError> {
    Ok(expand(pairs, src_size)?.into_iter().map(|v| v as i64).collect())
}

/// Run-length encodes floats into an `f64` pair stream.
pub fn encode_float(values: &[f64]) -> Result<Vec<f64>, BinaryCifError> {
    // Bitwise equality so runs of NaN collapse and -0.0 stays distinct from 0.0.
    let bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    let mut output = Vec::new();
    for (value_bits, count) in runs(&bits) {
        output.push(f64::from_bits(value_bits));
        output.push(count as f64);
    }
    Ok(output)
}

pub fn decode_float(pairs: &[f64], src_size: usize) -> Result<Vec<f64>, BinaryCifError> {
    expand(pairs, src_size)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rle_roundtrip_int() {
        let original: Vec<i64> = vec![5, 5, 5, 5, 8, 8, 8, 2, 9, 9, 9, 9, 9];
        let encoded = encode_int(&original).unwrap();
        assert_eq!(encoded, vec![5, 4, 8, 3, 2, 1, 9, 5]);
        assert_eq!(decode_int(&encoded, original.len()).unwrap(), original);
    }

    #[test]
    fn test_rle_long_run() {
        let original: Vec<i64> = vec![42; 1000];
        let encoded = encode_int(&original).unwrap();
        assert_eq!(encoded, vec![42, 1000]);
        assert_eq!(decode_int(&encoded, 1000).unwrap(), original);
    }

    #[test]
    fn test_rle_value_out_of_i32_range() {
        let result = encode_int(&[u32::MAX as i64]);
        assert!(matches!(result, Err(BinaryCifError::OutOfRange { .. })));
    }

    #[test]
    fn test_rle_float_preserves_signed_zero() {
        let original = vec![0.0, -0.0, -0.0, 1.5];
        let encoded = encode_float(&original).unwrap();
        assert_eq!(encoded.len(), 6);
        let decoded = decode_float(&encoded, 4).unwrap();
        let bits: Vec<u64> = decoded.iter().map(|v| v.to_bits()).collect();
        let expected: Vec<u64> = original.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_rle_decode_size_mismatch_error() {
        let result = decode_int(&[1, 3], 2);
        assert!(matches!(result, Err(BinaryCifError::RleDecodeError(_))));
        let result = decode_int(&[1, 3, 4], 3);
        assert!(matches!(result, Err(BinaryCifError::RleDecodeError(_))));
    }

    #[test]
    fn test_count_runs() {
        assert_eq!(count_runs::<i32>(&[]), 0);
        assert_eq!(count_runs(&[1, 1, 2, 1]), 3);
    }

    #[test]
    fn test_empty_slice_roundtrip() {
        let encoded = encode_int(&[]).unwrap();
        assert!(encoded.is_empty());
        assert!(decode_int(&encoded, 0).unwrap().is_empty());
    }
}
