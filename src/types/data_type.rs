//! This module defines the canonical, type-safe representation of the element
//! types a `ByteArray` step can carry, and the source types recorded by the
//! other steps so a decoder can restore the original array.

use crate::error::BinaryCifError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Element type of a flat array, identified on the wire by a fixed numeric code.
///
/// The integer and float codes match BinaryCIF 0.3.0. `Utf8Text` is the
/// length-prefixed text blob used as the fallback for string columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Float32,
    Float64,
    Utf8Text,
}

impl DataType {
    /// The numeric code written into the container.
    pub fn code(&self) -> u8 {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 => 3,
            Self::UInt8 => 4,
            Self::UInt16 => 5,
            Self::UInt32 => 6,
            Self::Float32 => 32,
            Self::Float64 => 33,
            Self::Utf8Text => 64,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, BinaryCifError> {
        match code {
            1 => Ok(Self::Int8),
            2 => Ok(Self::Int16),
            3 => Ok(Self::Int32),
            4 => Ok(Self::UInt8),
            5 => Ok(Self::UInt16),
            6 => Ok(Self::UInt32),
            32 => Ok(Self::Float32),
            33 => Ok(Self::Float64),
            64 => Ok(Self::Utf8Text),
            c => Err(BinaryCifError::UnsupportedType(format!(
                "Unknown data type code {}",
                c
            ))),
        }
    }

    /// Size of one element in bytes, or `None` for variable-width text.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Float64 => Some(8),
            Self::Utf8Text => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::UInt8 | Self::UInt16 | Self::UInt32
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// The container stores the bare numeric code, not the variant name.
impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

struct DataTypeVisitor;

impl<'de> Visitor<'de> for DataTypeVisitor {
    type Value = DataType;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a BinaryCIF data type code")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DataType, E> {
        let code = u8::try_from(v).map_err(|_| E::custom(format!("data type code {}", v)))?;
        DataType::from_code(code).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DataType, E> {
        let code = u8::try_from(v).map_err(|_| E::custom(format!("data type code {}", v)))?;
        DataType::from_code(code).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_u64(DataTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for dt in [
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::UInt8,
            DataType::UInt16,
            DataType::UInt32,
            DataType::Float32,
            DataType::Float64,
            DataType::Utf8Text,
        ] {
            assert_eq!(DataType::from_code(dt.code()).unwrap(), dt);
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        assert!(matches!(
            DataType::from_code(7),
            Err(BinaryCifError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_serializes_as_bare_code() {
        let json = serde_json::to_string(&DataType::Float64).unwrap();
        assert_eq!(json, "33");
        let back: DataType = serde_json::from_str("4").unwrap();
        assert_eq!(back, DataType::UInt8);
    }
}
