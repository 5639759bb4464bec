//! This module contains the pure, stateless kernels for LEB128 (Little-Endian
//! Base 128) variable-length unsigned integers.
//!
//! The text `ByteArray` layout uses them as per-string length prefixes, so a
//! column of short strings pays one byte of framing per value. Fully panic-free.

use crate::error::BinaryCifError;

/// Appends `value` to `buffer` as a LEB128 byte sequence.
pub fn encode_one(mut value: u64, buffer: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buffer.push(byte);
            return;
        }
        buffer.push(byte | 0x80);
    }
}

/// Number of bytes `encode_one` would write for `value`.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decodes one value starting at `*pos`, advancing `*pos` past it.
pub fn decode_one(input: &[u8], pos: &mut usize) -> Result<u64, BinaryCifError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *input
            .get(*pos)
            .ok_or_else(|| BinaryCifError::Leb128DecodeError("Unexpected end of buffer".to_string()))?;
        *pos += 1;

        let payload = (byte & 0x7F) as u64;
        if shift >= 64 || (shift == 63 && payload > 1) {
            return Err(BinaryCifError::Leb128DecodeError(
                "Integer overflow during decoding".to_string(),
            ));
        }
        result |= payload << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leb128_roundtrip_boundaries() {
        let original: Vec<u64> = vec![0, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX];
        let mut buf = Vec::new();
        for &v in &original {
            encode_one(v, &mut buf);
        }

        let mut pos = 0;
        let decoded: Vec<u64> = original
            .iter()
            .map(|_| decode_one(&buf, &mut pos).unwrap())
            .collect();
        assert_eq!(decoded, original);
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn test_encoded_len_matches_encoder() {
        for v in [0u64, 1, 127, 128, 300, 1 << 35, u64::MAX] {
            let mut buf = Vec::new();
            encode_one(v, &mut buf);
            assert_eq!(encoded_len(v), buf.len(), "value {}", v);
        }
    }

    #[test]
    fn test_decode_truncated_buffer() {
        let mut pos = 0;
        let err = decode_one(&[0xE5, 0xB6], &mut pos).unwrap_err();
        assert!(err.to_string().contains("Unexpected end of buffer"));
    }

    #[test]
    fn test_decode_overflow_error() {
        let bytes = vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let mut pos = 0;
        let err = decode_one(&bytes, &mut pos).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }
}
