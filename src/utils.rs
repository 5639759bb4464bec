//! This module provides a set of shared, low-level utility functions used
//! throughout the bincif core.
//!
//! Its primary responsibility is converting between typed slices and the
//! little-endian byte layout every `ByteArray` payload uses, regardless of the
//! host's native byte order.

use bytemuck::Pod;

use crate::error::BinaryCifError;

//==================================================================================
// 1. Byte-Order Normalization
//==================================================================================

/// A plain-old-data element with a defined little-endian wire form.
pub trait LittleEndian: Pod {
    fn to_le_value(self) -> Self;
    fn from_le_value(self) -> Self;
}

macro_rules! impl_little_endian_int {
    ($($t:ty),*) => {
        $(
            impl LittleEndian for $t {
                #[inline]
                fn to_le_value(self) -> Self {
                    <$t>::to_le(self)
                }
                #[inline]
                fn from_le_value(self) -> Self {
                    <$t>::from_le(self)
                }
            }
        )*
    };
}

impl_little_endian_int!(i8, i16, i32, u8, u16, u32);

impl LittleEndian for f32 {
    #[inline]
    fn to_le_value(self) -> Self {
        f32::from_bits(self.to_bits().to_le())
    }
    #[inline]
    fn from_le_value(self) -> Self {
        f32::from_bits(u32::from_le(self.to_bits()))
    }
}

impl LittleEndian for f64 {
    #[inline]
    fn to_le_value(self) -> Self {
        f64::from_bits(self.to_bits().to_le())
    }
    #[inline]
    fn from_le_value(self) -> Self {
        f64::from_bits(u64::from_le(self.to_bits()))
    }
}

//==================================================================================
// 2. Core Utility Functions
//==================================================================================

/// Serializes a typed slice into little-endian bytes.
pub fn typed_slice_to_bytes<T: LittleEndian>(data: &[T]) -> Vec<u8> {
    if cfg!(target_endian = "little") {
        return bytemuck::cast_slice(data).to_vec();
    }
    let swapped: Vec<T> = data.iter().map(|&v| v.to_le_value()).collect();
    bytemuck::cast_slice(&swapped).to_vec()
}

/// Reads a little-endian byte buffer back into an owned typed vector.
///
/// The buffer does not need to be aligned for `T`.
///
/// # Errors
/// Returns `BinaryCifError::BufferMismatch` if the byte length is not a
/// multiple of the element size.
pub fn bytes_to_typed_vec<T: LittleEndian>(bytes: &[u8]) -> Result<Vec<T>, BinaryCifError> {
    let size = std::mem::size_of::<T>();
    if bytes.len() % size != 0 {
        return Err(BinaryCifError::BufferMismatch(size, bytes.len()));
    }
    Ok(bytes
        .chunks_exact(size)
        .map(|chunk| bytemuck::pod_read_unaligned::<T>(chunk).from_le_value())
        .collect())
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_roundtrip_i32() {
        let original: Vec<i32> = vec![1, -2, 1_000_000, i32::MIN, i32::MAX];
        let bytes = typed_slice_to_bytes(&original);
        assert_eq!(bytes.len(), original.len() * 4);
        assert_eq!(bytes_to_typed_vec::<i32>(&bytes).unwrap(), original);
    }

    #[test]
    fn test_bytes_are_little_endian() {
        // 258 = 0x0102
        let bytes = typed_slice_to_bytes(&[258u16]);
        assert_eq!(bytes, vec![0x02, 0x01]);
    }

    #[test]
    fn test_unaligned_read() {
        let mut bytes = vec![0xFFu8];
        bytes.extend(typed_slice_to_bytes(&[1.5f64, -0.25]));
        let values = bytes_to_typed_vec::<f64>(&bytes[1..]).unwrap();
        assert_eq!(values, vec![1.5, -0.25]);
    }

    #[test]
    fn test_length_mismatch_error() {
        let result = bytes_to_typed_vec::<i32>(&[0, 1, 2, 3, 4]);
        assert!(matches!(result, Err(BinaryCifError::BufferMismatch(4, 5))));
    }
}
