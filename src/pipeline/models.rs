//! Defines the data models for encoding chains.
//!
//! `Transform` is what a caller asks for (an unparameterized recipe such as
//! "delta, then pack"); `EncodingStep` is what the executor records (the same
//! transform plus every parameter needed to invert it). An `EncodedData` holds
//! the recorded steps, outermost first, and the final payload.

use serde::{Deserialize, Serialize};

use crate::error::BinaryCifError;
use crate::pipeline::executor;
use crate::types::{DataType, TypedArray};

//==================================================================================
// I. Recorded Steps (wire format)
//==================================================================================

/// One invertible step of an encoding chain, with its inverse parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum EncodingStep {
    ByteArray {
        #[serde(rename = "type")]
        data_type: DataType,
    },
    #[serde(rename_all = "camelCase")]
    FixedPoint { factor: f64, src_type: DataType },
    #[serde(rename_all = "camelCase")]
    IntervalQuantization {
        min: f64,
        max: f64,
        num_steps: u32,
        src_type: DataType,
    },
    #[serde(rename_all = "camelCase")]
    RunLength { src_type: DataType, src_size: usize },
    #[serde(rename_all = "camelCase")]
    Delta { origin: i64, src_type: DataType },
    #[serde(rename_all = "camelCase")]
    IntegerPacking {
        byte_count: u8,
        is_unsigned: bool,
        src_size: usize,
    },
    #[serde(rename_all = "camelCase")]
    StringArray {
        data_encoding: Vec<EncodingStep>,
        string_data: String,
        offset_encoding: Vec<EncodingStep>,
        #[serde(with = "serde_bytes")]
        offsets: Vec<u8>,
    },
}

impl EncodingStep {
    /// The wire `kind` tag of this step.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ByteArray { .. } => "ByteArray",
            Self::FixedPoint { .. } => "FixedPoint",
            Self::IntervalQuantization { .. } => "IntervalQuantization",
            Self::RunLength { .. } => "RunLength",
            Self::Delta { .. } => "Delta",
            Self::IntegerPacking { .. } => "IntegerPacking",
            Self::StringArray { .. } => "StringArray",
        }
    }
}

/// An encoded flat array: the chain that produced it and the final payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EncodedData {
    pub encoding: Vec<EncodingStep>,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

impl EncodedData {
    /// The `kind` tags of the chain, outermost first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.encoding.iter().map(EncodingStep::kind).collect()
    }
}

//==================================================================================
// II. Requested Transforms (encoder recipes)
//==================================================================================

/// A transform a caller can request. Parameters the encoder can derive from
/// the data (origins, widths, sizes) are not part of the request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transform {
    ByteArray,
    /// Stores floats as 32-bit. Fails if any value would change.
    Float32Array,
    FixedPoint {
        factor: f64,
    },
    IntervalQuantization {
        min: f64,
        max: f64,
        num_steps: u32,
    },
    RunLength,
    Delta,
    IntegerPacking,
    StringArray,
}

/// An ordered recipe of transforms, applied first to last.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ArrayEncoder {
    transforms: Vec<Transform>,
}

impl ArrayEncoder {
    /// Starts a recipe with a single transform.
    pub fn by(transform: Transform) -> Self {
        Self {
            transforms: vec![transform],
        }
    }

    /// Appends a transform to the recipe.
    pub fn and(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Runs the recipe over `data`.
    pub fn encode(&self, data: &TypedArray) -> Result<EncodedData, BinaryCifError> {
        executor::execute_encode_chain(data, &self.transforms)
    }
}
