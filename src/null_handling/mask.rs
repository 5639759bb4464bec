//! Per-row presence masks.
//!
//! A mask is one `u8` per row holding a `ValueKind` discriminant. It is
//! attached to a column only when at least one row is not `Present`, and is
//! itself stored with the cheaper of `RunLength` over `Int32` pairs or a plain
//! `UInt8` byte array.

use super::ValueKind;
use crate::error::BinaryCifError;
use crate::pipeline::{decoder, executor};
use crate::pipeline::models::{EncodedData, Transform};
use crate::types::TypedArray;

/// Collects the presence state of each row of a column.
#[derive(Debug, Default, Clone)]
pub struct MaskBuilder {
    kinds: Vec<u8>,
    all_present: bool,
}

impl MaskBuilder {
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            kinds: Vec::with_capacity(rows),
            all_present: true,
        }
    }

    pub fn push(&mut self, kind: ValueKind) {
        self.all_present &= kind.is_present();
        self.kinds.push(kind as u8);
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn is_all_present(&self) -> bool {
        self.all_present
    }

    /// Encodes the mask, or returns `None` when every row is present.
    pub fn finish(self) -> Result<Option<EncodedData>, BinaryCifError> {
        if self.all_present {
            return Ok(None);
        }
        encode_mask(&self.kinds).map(Some)
    }
}

/// Encodes raw mask bytes with the smaller of the two mask layouts.
pub fn encode_mask(mask: &[u8]) -> Result<EncodedData, BinaryCifError> {
    let data = TypedArray::UInt8(mask.to_vec());
    let run_length =
        executor::execute_encode_chain(&data, &[Transform::RunLength, Transform::ByteArray])?;
    if run_length.data.len() < mask.len() {
        return Ok(run_length);
    }
    executor::execute_encode_chain(&data, &[Transform::ByteArray])
}

pub fn decode_mask(encoded: &EncodedData) -> Result<Vec<ValueKind>, BinaryCifError> {
    let values = decoder::decode(encoded)?.int_values().ok_or_else(|| {
        BinaryCifError::InvalidChain("Mask does not decode to integers".to_string())
    })?;
    values
        .into_iter()
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| BinaryCifError::UnsupportedType(format!("Unknown mask value {}", v)))
                .and_then(ValueKind::from_u8)
        })
        .collect()
}
