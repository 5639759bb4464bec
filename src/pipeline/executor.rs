//! This module contains the encode-side executor for encoding chains.
//!
//! It walks a requested `Transform` list over a `TypedArray`, applying each
//! kernel in turn and recording the `EncodingStep` (with its inverse
//! parameters) that the decoder will need. A chain that ends while still
//! holding an array gets an implicit trailing `ByteArray`.

use crate::error::BinaryCifError;
use crate::kernels::{
    byte_array, delta, fixed_point, integer_packing, interval_quantization, rle, string_array,
};
use crate::pipeline::classifier;
use crate::pipeline::models::{EncodedData, EncodingStep, Transform};
use crate::types::{DataType, TypedArray};

/// The value flowing between two steps of a chain.
#[derive(Debug)]
pub(crate) enum Stage {
    Array(TypedArray),
    Bytes(Vec<u8>),
}

//==================================================================================
// 1. Chain Execution
//==================================================================================

/// Applies `transforms` to `data` in order, producing the recorded chain and
/// its final byte payload.
pub fn execute_encode_chain(
    data: &TypedArray,
    transforms: &[Transform],
) -> Result<EncodedData, BinaryCifError> {
    let mut steps: Vec<EncodingStep> = Vec::with_capacity(transforms.len() + 1);
    let mut stage = Stage::Array(data.clone());

    for transform in transforms {
        let array = match stage {
            Stage::Array(array) => array,
            Stage::Bytes(_) => {
                return Err(BinaryCifError::InvalidChain(format!(
                    "{:?} cannot follow a step that already produced the byte payload",
                    transform
                )))
            }
        };
        stage = apply_transform(transform, array, &mut steps)
            .map_err(|e| e.at_stage(transform_name(transform)))?;
    }

    let payload = match stage {
        Stage::Bytes(bytes) => bytes,
        Stage::Array(array) => {
            let (data_type, bytes) = byte_array::encode(&array);
            steps.push(EncodingStep::ByteArray { data_type });
            bytes
        }
    };

    Ok(EncodedData {
        encoding: steps,
        data: payload,
    })
}

fn transform_name(transform: &Transform) -> &'static str {
    match transform {
        Transform::ByteArray | Transform::Float32Array => "ByteArray",
        Transform::FixedPoint { .. } => "FixedPoint",
        Transform::IntervalQuantization { .. } => "IntervalQuantization",
        Transform::RunLength => "RunLength",
        Transform::Delta => "Delta",
        Transform::IntegerPacking => "IntegerPacking",
        Transform::StringArray => "StringArray",
    }
}

//==================================================================================
// 2. Per-Transform Dispatch
//==================================================================================

fn apply_transform(
    transform: &Transform,
    array: TypedArray,
    steps: &mut Vec<EncodingStep>,
) -> Result<Stage, BinaryCifError> {
    let src_type = array.data_type();
    match transform {
        Transform::ByteArray => Ok(finish_bytes(&array, steps)),

        Transform::Float32Array => {
            let values = require_floats(&array, "Float32Array")?;
            let narrowed = TypedArray::from_float_values(DataType::Float32, values)?;
            Ok(finish_bytes(&narrowed, steps))
        }

        Transform::FixedPoint { factor } => {
            let values = require_floats(&array, "FixedPoint")?;
            let scaled = fixed_point::encode(&values, *factor)?;
            steps.push(EncodingStep::FixedPoint {
                factor: *factor,
                src_type,
            });
            Ok(Stage::Array(TypedArray::Int32(scaled)))
        }

        Transform::IntervalQuantization { min, max, num_steps } => {
            let values = require_floats(&array, "IntervalQuantization")?;
            let grid = interval_quantization::Grid::new(*min, *max, *num_steps)?;
            let levels = interval_quantization::encode(&values, grid);
            steps.push(EncodingStep::IntervalQuantization {
                min: grid.min,
                max: grid.max,
                num_steps: grid.num_steps,
                src_type,
            });
            Ok(Stage::Array(TypedArray::Int32(levels)))
        }

        Transform::RunLength => apply_run_length(array, steps),

        Transform::Delta => {
            let values = require_ints(&array, "Delta")?;
            let (origin, deltas) = delta::encode(&values)?;
            steps.push(EncodingStep::Delta { origin, src_type });
            Ok(Stage::Array(TypedArray::Int32(deltas)))
        }

        Transform::IntegerPacking => {
            let values = require_ints(&array, "IntegerPacking")?;
            let packing = integer_packing::determine_packing(&values);
            match integer_packing::encode(&values, packing)? {
                Some(packed) => {
                    steps.push(EncodingStep::IntegerPacking {
                        byte_count: packing.byte_count,
                        is_unsigned: packing.is_unsigned,
                        src_size: values.len(),
                    });
                    Ok(finish_bytes(&packed, steps))
                }
                // Packing would not help; store the stream as it is.
                None => Ok(finish_bytes(&array, steps)),
            }
        }

        Transform::StringArray => {
            let TypedArray::Str(values) = &array else {
                return Err(BinaryCifError::UnsupportedType(format!(
                    "StringArray requires text input, got {}",
                    src_type
                )));
            };
            let parts = string_array::encode(values)?;
            let offsets = encode_int32_stream(parts.offsets)?;
            let indices = encode_int32_stream(parts.indices)?;
            steps.push(EncodingStep::StringArray {
                data_encoding: indices.encoding,
                string_data: parts.string_data,
                offset_encoding: offsets.encoding,
                offsets: offsets.data,
            });
            Ok(Stage::Bytes(indices.data))
        }
    }
}

fn apply_run_length(
    array: TypedArray,
    steps: &mut Vec<EncodingStep>,
) -> Result<Stage, BinaryCifError> {
    let src_type = array.data_type();
    let src_size = array.len();

    let encoded = if let Some(values) = array.int_values() {
        TypedArray::Int32(rle::encode_int(&values)?)
    } else if let Some(values) = array.float_values() {
        // Pairs keep the source width so values stay bit-exact.
        TypedArray::from_float_values(src_type, rle::encode_float(&values)?)?
    } else {
        return Err(BinaryCifError::UnsupportedType(format!(
            "RunLength requires numeric input, got {}",
            src_type
        )));
    };

    steps.push(EncodingStep::RunLength { src_type, src_size });
    Ok(Stage::Array(encoded))
}

//==================================================================================
// 3. Helpers
//==================================================================================

fn finish_bytes(array: &TypedArray, steps: &mut Vec<EncodingStep>) -> Stage {
    let (data_type, bytes) = byte_array::encode(array);
    steps.push(EncodingStep::ByteArray { data_type });
    Stage::Bytes(bytes)
}

/// Encodes an auxiliary `Int32` stream with the classifier's best chain.
fn encode_int32_stream(values: Vec<i32>) -> Result<EncodedData, BinaryCifError> {
    let widened: Vec<i64> = values.iter().map(|&v| v as i64).collect();
    let encoder = classifier::classify_int_values(&widened);
    execute_encode_chain(&TypedArray::Int32(values), encoder.transforms())
}

fn require_ints(array: &TypedArray, op: &str) -> Result<Vec<i64>, BinaryCifError> {
    array.int_values().ok_or_else(|| {
        BinaryCifError::UnsupportedType(format!(
            "{} requires integer input, got {}",
            op,
            array.data_type()
        ))
    })
}

fn require_floats(array: &TypedArray, op: &str) -> Result<Vec<f64>, BinaryCifError> {
    array.float_values().ok_or_else(|| {
        BinaryCifError::UnsupportedType(format!(
            "{} requires float input, got {}",
            op,
            array.data_type()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_defaults_to_byte_array() {
        let encoded = execute_encode_chain(&TypedArray::Int32(vec![7, 8]), &[]).unwrap();
        assert_eq!(
            encoded.encoding,
            vec![EncodingStep::ByteArray {
                data_type: DataType::Int32
            }]
        );
        assert_eq!(encoded.data.len(), 8);
    }

    #[test]
    fn test_delta_then_pack_records_parameters() {
        let data = TypedArray::Int32(vec![10, 11, 12, 13]);
        let encoded =
            execute_encode_chain(&data, &[Transform::Delta, Transform::IntegerPacking]).unwrap();
        assert_eq!(
            encoded.encoding,
            vec![
                EncodingStep::Delta {
                    origin: 10,
                    src_type: DataType::Int32
                },
                EncodingStep::IntegerPacking {
                    byte_count: 1,
                    is_unsigned: true,
                    src_size: 4
                },
                EncodingStep::ByteArray {
                    data_type: DataType::UInt8
                },
            ]
        );
        assert_eq!(encoded.data, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_packing_wide_values_stores_plain_int32() {
        let data = TypedArray::Int32(vec![1_000_000, -1_000_000]);
        let encoded = execute_encode_chain(&data, &[Transform::IntegerPacking]).unwrap();
        assert_eq!(encoded.kinds(), vec!["ByteArray"]);
        assert_eq!(encoded.data.len(), 8);
    }

    #[test]
    fn test_transform_after_terminal_is_invalid() {
        let data = TypedArray::Int32(vec![1, 2]);
        let result = execute_encode_chain(&data, &[Transform::ByteArray, Transform::Delta]);
        assert!(matches!(result, Err(BinaryCifError::InvalidChain(_))));
    }

    #[test]
    fn test_type_mismatch_names_the_stage() {
        let data = TypedArray::from(vec!["a", "b"]);
        match execute_encode_chain(&data, &[Transform::Delta]) {
            Err(BinaryCifError::PipelineError { stage, source }) => {
                assert_eq!(stage, "Delta");
                assert!(matches!(*source, BinaryCifError::UnsupportedType(_)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_float32_array_rejects_lossy_values() {
        let data = TypedArray::Float64(vec![0.1]);
        let result = execute_encode_chain(&data, &[Transform::Float32Array]);
        assert!(result.is_err());

        let exact = TypedArray::Float64(vec![0.5, -2.0]);
        let encoded = execute_encode_chain(&exact, &[Transform::Float32Array]).unwrap();
        assert_eq!(
            encoded.encoding,
            vec![EncodingStep::ByteArray {
                data_type: DataType::Float32
            }]
        );
    }

    #[test]
    fn test_string_array_nests_chains() {
        let data = TypedArray::from(vec!["A", "B", "A", "A"]);
        let encoded = execute_encode_chain(&data, &[Transform::StringArray]).unwrap();
        assert_eq!(encoded.kinds(), vec!["StringArray"]);
        match &encoded.encoding[0] {
            EncodingStep::StringArray {
                string_data,
                data_encoding,
                offset_encoding,
                ..
            } => {
                assert_eq!(string_data, "AB");
                assert!(!data_encoding.is_empty());
                assert!(!offset_encoding.is_empty());
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }
}
