//! This module contains the universal terminal kernel: packing a typed array
//! into its fixed-width little-endian byte layout.
//!
//! Every encoding chain ends here (directly or through `IntegerPacking`), and
//! the plain `ByteArray` chain is the baseline every other candidate has to
//! beat. Text arrays use the `Utf8Text` layout: each string is written as a
//! LEB128 byte length followed by its UTF-8 bytes.

use super::leb128;
use crate::error::BinaryCifError;
use crate::types::{DataType, TypedArray};
use crate::utils::{bytes_to_typed_vec, typed_slice_to_bytes};

/// Serializes `data`, returning the element type tag and the payload.
pub fn encode(data: &TypedArray) -> (DataType, Vec<u8>) {
    let bytes = match data {
        TypedArray::Int8(v) => typed_slice_to_bytes(v),
        TypedArray::Int16(v) => typed_slice_to_bytes(v),
        TypedArray::Int32(v) => typed_slice_to_bytes(v),
        TypedArray::UInt8(v) => v.clone(),
        TypedArray::UInt16(v) => typed_slice_to_bytes(v),
        TypedArray::UInt32(v) => typed_slice_to_bytes(v),
        TypedArray::Float32(v) => typed_slice_to_bytes(v),
        TypedArray::Float64(v) => typed_slice_to_bytes(v),
        TypedArray::Str(v) => encode_text(v),
    };
    (data.data_type(), bytes)
}

/// Payload size `encode` would produce, without serializing.
pub fn encoded_len(data: &TypedArray) -> usize {
    match data {
        TypedArray::Str(v) => v
            .iter()
            .map(|s| leb128::encoded_len(s.len() as u64) + s.len())
            .sum(),
        other => other.len() * other.data_type().byte_width().unwrap_or(0),
    }
}

fn encode_text(values: &[String]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.iter().map(|s| s.len() + 1).sum());
    for s in values {
        leb128::encode_one(s.len() as u64, &mut out);
        out.extend_from_slice(s.as_bytes());
    }
    out
}

pub fn decode(data_type: DataType, bytes: &[u8]) -> Result<TypedArray, BinaryCifError> {
    Ok(match data_type {
        DataType::Int8 => TypedArray::Int8(bytes_to_typed_vec(bytes)?),
        DataType::Int16 => TypedArray::Int16(bytes_to_typed_vec(bytes)?),
        DataType::Int32 => TypedArray::Int32(bytes_to_typed_vec(bytes)?),
        DataType::UInt8 => TypedArray::UInt8(bytes.to_vec()),
        DataType::UInt16 => TypedArray::UInt16(bytes_to_typed_vec(bytes)?),
        DataType::UInt32 => TypedArray::UInt32(bytes_to_typed_vec(bytes)?),
        DataType::Float32 => TypedArray::Float32(bytes_to_typed_vec(bytes)?),
        DataType::Float64 => TypedArray::Float64(bytes_to_typed_vec(bytes)?),
        DataType::Utf8Text => TypedArray::Str(decode_text(bytes)?),
    })
}

fn decode_text(bytes: &[u8]) -> Result<Vec<String>, BinaryCifError> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while pos < bytes.len() {
        let len = leb128::decode_one(bytes, &mut pos)? as usize;
        let end = pos
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| BinaryCifError::BufferMismatch(len, bytes.len() - pos))?;
        let s = std::str::from_utf8(&bytes[pos..end]).map_err(|e| {
            BinaryCifError::UnsupportedType(format!("Text payload is not valid UTF-8: {}", e))
        })?;
        out.push(s.to_string());
        pos = end;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int32_layout() {
        let (dt, bytes) = encode(&TypedArray::Int32(vec![1, -1]));
        assert_eq!(dt, DataType::Int32);
        assert_eq!(bytes, vec![1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(decode(dt, &bytes).unwrap(), TypedArray::Int32(vec![1, -1]));
    }

    #[test]
    fn test_text_layout_has_length_prefixes() {
        let data = TypedArray::from(vec!["ab", "", "c"]);
        let (dt, bytes) = encode(&data);
        assert_eq!(dt, DataType::Utf8Text);
        assert_eq!(bytes, vec![2, b'a', b'b', 0, 1, b'c']);
        assert_eq!(encoded_len(&data), bytes.len());
        assert_eq!(decode(dt, &bytes).unwrap(), data);
    }

    #[test]
    fn test_encoded_len_matches_numeric_payload() {
        let data = TypedArray::Float64(vec![1.0, 2.0, 3.0]);
        assert_eq!(encoded_len(&data), encode(&data).1.len());
    }

    #[test]
    fn test_truncated_text_is_rejected() {
        assert!(decode(DataType::Utf8Text, &[5, b'a']).is_err());
    }

    #[test]
    fn test_float_extremes_roundtrip() {
        let data = TypedArray::Float64(vec![f64::MIN, f64::MAX, f64::MIN_POSITIVE, -0.0]);
        let (dt, bytes) = encode(&data);
        assert_eq!(decode(dt, &bytes).unwrap(), data);
    }
}
