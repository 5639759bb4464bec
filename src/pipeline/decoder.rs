//! This module contains the decode-side executor.
//!
//! It replays a recorded chain in reverse, starting from the byte payload and
//! inverting each `EncodingStep` with the parameters the encoder stored. The
//! result is the logical array the chain was built from (lossy steps decode to
//! their quantized values).

use crate::error::BinaryCifError;
use crate::kernels::{
    byte_array, delta, fixed_point, integer_packing, interval_quantization, rle, string_array,
};
use crate::pipeline::executor::Stage;
use crate::pipeline::models::{EncodedData, EncodingStep};
use crate::types::{DataType, TypedArray};

/// Decodes `encoded` back into a typed array.
pub fn decode(encoded: &EncodedData) -> Result<TypedArray, BinaryCifError> {
    decode_parts(&encoded.encoding, &encoded.data)
}

fn decode_parts(encoding: &[EncodingStep], data: &[u8]) -> Result<TypedArray, BinaryCifError> {
    let mut stage = Stage::Bytes(data.to_vec());
    for step in encoding.iter().rev() {
        stage = invert_step(step, stage).map_err(|e| e.at_stage(step.kind()))?;
    }
    match stage {
        Stage::Array(array) => Ok(array),
        Stage::Bytes(_) => Err(BinaryCifError::InvalidChain(
            "Chain never turns its payload back into an array".to_string(),
        )),
    }
}

fn invert_step(step: &EncodingStep, stage: Stage) -> Result<Stage, BinaryCifError> {
    if let EncodingStep::ByteArray { data_type } = step {
        let Stage::Bytes(bytes) = stage else {
            return Err(misplaced(step));
        };
        return Ok(Stage::Array(byte_array::decode(*data_type, &bytes)?));
    }

    if let EncodingStep::StringArray {
        data_encoding,
        string_data,
        offset_encoding,
        offsets,
    } = step
    {
        let Stage::Bytes(index_bytes) = stage else {
            return Err(misplaced(step));
        };
        let indices = int_stream(&decode_parts(data_encoding, &index_bytes)?)?;
        let offsets = int_stream(&decode_parts(offset_encoding, offsets)?)?;
        let strings = string_array::decode(string_data, &offsets, &indices)?;
        return Ok(Stage::Array(TypedArray::Str(strings)));
    }

    let Stage::Array(array) = stage else {
        return Err(misplaced(step));
    };

    let decoded = match step {
        EncodingStep::IntegerPacking {
            byte_count,
            is_unsigned,
            src_size,
        } => {
            let values = integer_packing::decode(&array, *byte_count, *is_unsigned, *src_size)?;
            TypedArray::from_int_values(DataType::Int32, &values)?
        }
        EncodingStep::Delta { origin, src_type } => {
            let values = delta::decode(*origin, &int32_stream(&array)?);
            TypedArray::from_int_values(*src_type, &values)?
        }
        EncodingStep::RunLength { src_type, src_size } => {
            if src_type.is_float() {
                let pairs = array.float_values().ok_or_else(|| {
                    BinaryCifError::RleDecodeError(format!(
                        "Expected float pairs, got {}",
                        array.data_type()
                    ))
                })?;
                TypedArray::from_float_values(*src_type, rle::decode_float(&pairs, *src_size)?)?
            } else {
                let values = rle::decode_int(&int32_stream(&array)?, *src_size)?;
                TypedArray::from_int_values(*src_type, &values)?
            }
        }
        EncodingStep::FixedPoint { factor, src_type } => {
            let values = fixed_point::decode(&int32_stream(&array)?, *factor);
            float_array_lossy(*src_type, values)?
        }
        EncodingStep::IntervalQuantization {
            min,
            max,
            num_steps,
            src_type,
        } => {
            let grid = interval_quantization::Grid::new(*min, *max, *num_steps)?;
            let values = interval_quantization::decode(&int32_stream(&array)?, grid);
            float_array_lossy(*src_type, values)?
        }
        EncodingStep::ByteArray { .. } | EncodingStep::StringArray { .. } => {
            return Err(misplaced(step))
        }
    };
    Ok(Stage::Array(decoded))
}

//==================================================================================
// Helpers
//==================================================================================

fn misplaced(step: &EncodingStep) -> BinaryCifError {
    BinaryCifError::InvalidChain(format!("{} step received the wrong input", step.kind()))
}

fn int_stream(array: &TypedArray) -> Result<Vec<i64>, BinaryCifError> {
    array.int_values().ok_or_else(|| {
        BinaryCifError::InvalidChain(format!(
            "Expected an integer stream, got {}",
            array.data_type()
        ))
    })
}

fn int32_stream(array: &TypedArray) -> Result<Vec<i32>, BinaryCifError> {
    match TypedArray::from_int_values(DataType::Int32, &int_stream(array)?)? {
        TypedArray::Int32(values) => Ok(values),
        other => Err(BinaryCifError::InternalError(format!(
            "Int32 conversion produced {}",
            other.data_type()
        ))),
    }
}

/// Quantized values rarely survive an exact `f32` check; narrow them plainly.
fn float_array_lossy(src_type: DataType, values: Vec<f64>) -> Result<TypedArray, BinaryCifError> {
    match src_type {
        DataType::Float32 => Ok(TypedArray::Float32(
            values.into_iter().map(|v| v as f32).collect(),
        )),
        other => TypedArray::from_float_values(other, values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::models::{ArrayEncoder, Transform};

    #[test]
    fn test_decode_byte_array() {
        let data = TypedArray::UInt16(vec![1, 65535]);
        let encoded = ArrayEncoder::default().encode(&data).unwrap();
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_decode_delta_rle_pack() {
        let data = TypedArray::Int32((1..=50).chain(60..=80).collect());
        let encoder = ArrayEncoder::by(Transform::Delta)
            .and(Transform::RunLength)
            .and(Transform::IntegerPacking);
        let encoded = encoder.encode(&data).unwrap();
        assert_eq!(encoded.kinds(), vec!["Delta", "RunLength", "IntegerPacking", "ByteArray"]);
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_decode_float_rle() {
        let data = TypedArray::Float64(vec![1.5, 1.5, 1.5, f64::NAN, f64::NAN, -0.0]);
        let encoded = ArrayEncoder::by(Transform::RunLength).encode(&data).unwrap();
        let TypedArray::Float64(decoded) = decode(&encoded).unwrap() else {
            panic!("expected Float64");
        };
        let TypedArray::Float64(original) = &data else { unreachable!() };
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&decoded), bits(original));
    }

    #[test]
    fn test_decode_fixed_point_is_quantized() {
        let data = TypedArray::Float64(vec![1.2345, -7.0]);
        let encoder = ArrayEncoder::by(Transform::FixedPoint { factor: 100.0 })
            .and(Transform::IntegerPacking);
        let decoded = decode(&encoder.encode(&data).unwrap()).unwrap();
        assert_eq!(decoded, TypedArray::Float64(vec![1.23, -7.0]));
    }

    #[test]
    fn test_decode_interval_quantization_float32() {
        let data = TypedArray::Float32(vec![0.0, 0.5, 1.0]);
        let encoder = ArrayEncoder::by(Transform::IntervalQuantization {
            min: 0.0,
            max: 1.0,
            num_steps: 3,
        });
        let decoded = decode(&encoder.encode(&data).unwrap()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decode_string_array() {
        let data = TypedArray::from(vec!["HOH", "", "NAG", "HOH", "NAG"]);
        let encoded = ArrayEncoder::by(Transform::StringArray).encode(&data).unwrap();
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_chain_without_terminal_is_rejected() {
        let encoded = EncodedData {
            encoding: vec![EncodingStep::Delta {
                origin: 0,
                src_type: DataType::Int32,
            }],
            data: vec![0, 0, 0, 0],
        };
        assert!(decode(&encoded).is_err());
    }
}
