//! This module serves as the public API for presence handling.
//!
//! A BinaryCIF column carries its values densely (one slot per row) and
//! records which rows hold a real value in a separate per-row mask. Absent
//! rows still occupy a slot filled with a type placeholder so that every
//! column of a category stays row-aligned.

use crate::error::BinaryCifError;

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Building, encoding, and decoding per-row presence masks.
pub mod mask;

pub use mask::{decode_mask, encode_mask, MaskBuilder};

//==================================================================================
// 2. Value Kinds
//==================================================================================

/// The presence state of one cell. The discriminants are the mask bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ValueKind {
    #[default]
    Present = 0,
    /// CIF `.`: the value is intentionally omitted.
    NotPresent = 1,
    /// CIF `?`: the value is missing or could not be read.
    Unknown = 2,
}

impl ValueKind {
    pub fn from_u8(code: u8) -> Result<Self, BinaryCifError> {
        match code {
            0 => Ok(Self::Present),
            1 => Ok(Self::NotPresent),
            2 => Ok(Self::Unknown),
            other => Err(BinaryCifError::UnsupportedType(format!(
                "Unknown mask value {}",
                other
            ))),
        }
    }

    pub fn is_present(&self) -> bool {
        *self == Self::Present
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod mask_tests;
