//! Fixed-point quantization of floats into `i32`.
//!
//! Lossy by construction: the caller picks `factor` as a precision contract
//! (e.g. `1000.0` keeps three decimals). The classifier never selects it.

use crate::error::BinaryCifError;

pub fn encode(values: &[f64], factor: f64) -> Result<Vec<i32>, BinaryCifError> {
    if !factor.is_finite() || factor == 0.0 {
        return Err(BinaryCifError::OutOfRange {
            encoding: "FixedPoint",
            value: format!("factor {}", factor),
        });
    }

    values
        .iter()
        .map(|&v| {
            let scaled = (v * factor).round();
            if scaled.is_finite() && scaled >= i32::MIN as f64 && scaled <= i32::MAX as f64 {
                Ok(scaled as i32)
            } else {
                Err(BinaryCifError::OutOfRange {
                    encoding: "FixedPoint",
                    value: format!("{} * {}", v, factor),
                })
            }
        })
        .collect()
}

pub fn decode(values: &[i32], factor: f64) -> Vec<f64> {
    values.iter().map(|&v| v as f64 / factor).collect()
}
