//! `TypedArray` is the flat, homogeneous column buffer passed between encoding
//! steps. Numeric variants mirror the `DataType` codes; `Str` carries text
//! columns before they are dictionary- or blob-encoded.

use crate::error::BinaryCifError;
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Str(Vec<String>),
}

macro_rules! for_each_variant {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            TypedArray::Int8($v) => $body,
            TypedArray::Int16($v) => $body,
            TypedArray::Int32($v) => $body,
            TypedArray::UInt8($v) => $body,
            TypedArray::UInt16($v) => $body,
            TypedArray::UInt32($v) => $body,
            TypedArray::Float32($v) => $body,
            TypedArray::Float64($v) => $body,
            TypedArray::Str($v) => $body,
        }
    };
}

impl TypedArray {
    /// Allocates a zero-filled array of `len` elements of the given type.
    pub fn zeroed(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Int8 => Self::Int8(vec![0; len]),
            DataType::Int16 => Self::Int16(vec![0; len]),
            DataType::Int32 => Self::Int32(vec![0; len]),
            DataType::UInt8 => Self::UInt8(vec![0; len]),
            DataType::UInt16 => Self::UInt16(vec![0; len]),
            DataType::UInt32 => Self::UInt32(vec![0; len]),
            DataType::Float32 => Self::Float32(vec![0.0; len]),
            DataType::Float64 => Self::Float64(vec![0.0; len]),
            DataType::Utf8Text => Self::Str(vec![String::new(); len]),
        }
    }

    pub fn len(&self) -> usize {
        for_each_variant!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element type of this array. Text arrays report `Utf8Text`.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::UInt8(_) => DataType::UInt8,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Str(_) => DataType::Utf8Text,
        }
    }

    /// Widens an integer array to `i64`. Returns `None` for floats and text.
    pub fn int_values(&self) -> Option<Vec<i64>> {
        match self {
            Self::Int8(v) => Some(v.iter().map(|&x| x as i64).collect()),
            Self::Int16(v) => Some(v.iter().map(|&x| x as i64).collect()),
            Self::Int32(v) => Some(v.iter().map(|&x| x as i64).collect()),
            Self::UInt8(v) => Some(v.iter().map(|&x| x as i64).collect()),
            Self::UInt16(v) => Some(v.iter().map(|&x| x as i64).collect()),
            Self::UInt32(v) => Some(v.iter().map(|&x| x as i64).collect()),
            _ => None,
        }
    }

    /// Widens a float array to `f64`. Returns `None` for integers and text.
    pub fn float_values(&self) -> Option<Vec<f64>> {
        match self {
            Self::Float32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Float64(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Builds an integer array of the requested type from `i64` values.
    ///
    /// Fails if the type is not an integer type or a value does not fit.
    pub fn from_int_values(
        data_type: DataType,
        values: &[i64],
    ) -> Result<Self, BinaryCifError> {
        fn narrow<T: TryFrom<i64>>(values: &[i64], dt: DataType) -> Result<Vec<T>, BinaryCifError> {
            values
                .iter()
                .map(|&v| {
                    T::try_from(v).map_err(|_| BinaryCifError::OutOfRange {
                        encoding: "integer array",
                        value: format!("{} as {}", v, dt),
                    })
                })
                .collect()
        }

        match data_type {
            DataType::Int8 => Ok(Self::Int8(narrow(values, data_type)?)),
            DataType::Int16 => Ok(Self::Int16(narrow(values, data_type)?)),
            DataType::Int32 => Ok(Self::Int32(narrow(values, data_type)?)),
            DataType::UInt8 => Ok(Self::UInt8(narrow(values, data_type)?)),
            DataType::UInt16 => Ok(Self::UInt16(narrow(values, data_type)?)),
            DataType::UInt32 => Ok(Self::UInt32(narrow(values, data_type)?)),
            dt => Err(BinaryCifError::UnsupportedType(format!(
                "{} is not an integer type",
                dt
            ))),
        }
    }

    /// Builds a float array of the requested width from `f64` values.
    ///
    /// `Float32` narrowing is checked bit-for-bit; any value that would not
    /// survive the round trip is an error.
    pub fn from_float_values(
        data_type: DataType,
        values: Vec<f64>,
    ) -> Result<Self, BinaryCifError> {
        match data_type {
            DataType::Float64 => Ok(Self::Float64(values)),
            DataType::Float32 => {
                let mut out = Vec::with_capacity(values.len());
                for (index, v) in values.into_iter().enumerate() {
                    if !is_exact_f32(v) {
                        return Err(BinaryCifError::PrecisionLoss {
                            target: "Float32",
                            index,
                        });
                    }
                    out.push(v as f32);
                }
                Ok(Self::Float32(out))
            }
            dt => Err(BinaryCifError::UnsupportedType(format!(
                "{} is not a float type",
                dt
            ))),
        }
    }
}

/// `true` if `v` survives an `f64 -> f32 -> f64` round trip bit-for-bit.
pub fn is_exact_f32(v: f64) -> bool {
    ((v as f32) as f64).to_bits() == v.to_bits()
}

impl From<Vec<i32>> for TypedArray {
    fn from(v: Vec<i32>) -> Self {
        Self::Int32(v)
    }
}

impl From<Vec<f64>> for TypedArray {
    fn from(v: Vec<f64>) -> Self {
        Self::Float64(v)
    }
}

impl From<Vec<String>> for TypedArray {
    fn from(v: Vec<String>) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<&str>> for TypedArray {
    fn from(v: Vec<&str>) -> Self {
        Self::Str(v.into_iter().map(str::to_string).collect())
    }
}
