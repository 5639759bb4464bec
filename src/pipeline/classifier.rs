//! The size-driven encoder classifier.
//!
//! Given a column's data, this module selects the encoding chain expected to
//! produce the smallest payload. Integer arrays are sized against four fixed
//! candidates using exact packed-length arithmetic (no trial encoding into
//! bytes); floats choose their storage width and optional run-length; text
//! chooses between a dictionary and plain storage by distinct-value ratio.
//!
//! Ties are broken by the shorter chain, then by candidate order, so the
//! choice is deterministic for a given input.

use hashbrown::HashSet;

use crate::config::EncoderConfig;
use crate::kernels::{delta, integer_packing, rle};
use crate::pipeline::models::{ArrayEncoder, Transform};
use crate::types::typed_array::is_exact_f32;
use crate::types::{DataType, TypedArray};

/// Arrays shorter than this are stored as a plain `ByteArray`.
pub const MIN_CLASSIFY_LEN: usize = 2;

/// `f32` counts are exact up to here; longer float run streams stay 64-bit.
const MAX_EXACT_F32_COUNT: usize = 1 << 24;

//==================================================================================
// 1. Integer Candidates
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntCandidate {
    Pack,
    RunLength,
    Delta,
    DeltaRunLength,
}

impl IntCandidate {
    pub const ALL: [IntCandidate; 4] = [
        IntCandidate::Pack,
        IntCandidate::RunLength,
        IntCandidate::Delta,
        IntCandidate::DeltaRunLength,
    ];

    pub fn encoder(&self) -> ArrayEncoder {
        match self {
            Self::Pack => ArrayEncoder::by(Transform::IntegerPacking),
            Self::RunLength => ArrayEncoder::by(Transform::RunLength).and(Transform::IntegerPacking),
            Self::Delta => ArrayEncoder::by(Transform::Delta).and(Transform::IntegerPacking),
            Self::DeltaRunLength => ArrayEncoder::by(Transform::Delta)
                .and(Transform::RunLength)
                .and(Transform::IntegerPacking),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Pack => "pack",
            Self::RunLength => "rle",
            Self::Delta => "delta",
            Self::DeltaRunLength => "delta-rle",
        }
    }
}

/// Predicted payload size of one candidate chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeEstimate {
    pub candidate: IntCandidate,
    pub byte_len: usize,
    pub steps: usize,
}

/// Sizes every applicable integer candidate for `values`.
///
/// A candidate whose intermediate stream would not fit `i32` is left out.
pub fn estimate_int_candidates(values: &[i64]) -> Vec<SizeEstimate> {
    let packed_len = |stream: &[i64]| integer_packing::determine_packing(stream).byte_len();
    let widen = |stream: Vec<i32>| -> Vec<i64> { stream.into_iter().map(i64::from).collect() };

    let mut estimates = Vec::with_capacity(IntCandidate::ALL.len());
    estimates.push(SizeEstimate {
        candidate: IntCandidate::Pack,
        byte_len: packed_len(values),
        steps: 1,
    });

    if let Ok(pairs) = rle::encode_int(values) {
        estimates.push(SizeEstimate {
            candidate: IntCandidate::RunLength,
            byte_len: packed_len(&widen(pairs)),
            steps: 2,
        });
    }

    if let Ok((_, deltas)) = delta::encode(values) {
        let deltas = widen(deltas);
        estimates.push(SizeEstimate {
            candidate: IntCandidate::Delta,
            byte_len: packed_len(&deltas),
            steps: 2,
        });
        if let Ok(pairs) = rle::encode_int(&deltas) {
            estimates.push(SizeEstimate {
                candidate: IntCandidate::DeltaRunLength,
                byte_len: packed_len(&widen(pairs)),
                steps: 3,
            });
        }
    }

    estimates
}

/// Picks the smallest integer chain for `values`.
pub fn classify_int_values(values: &[i64]) -> ArrayEncoder {
    if values.len() < MIN_CLASSIFY_LEN {
        return ArrayEncoder::by(Transform::ByteArray);
    }
    // Packing stores wide streams unpacked as Int32; anything wider must stay raw.
    if values
        .iter()
        .any(|&v| v < i32::MIN as i64 || v > i32::MAX as i64)
    {
        return ArrayEncoder::by(Transform::ByteArray);
    }

    let estimates = estimate_int_candidates(values);
    for estimate in &estimates {
        log_metric!(
            "classifier_candidate" = estimate.candidate.name(),
            "estimated_bytes" = estimate.byte_len,
            "steps" = estimate.steps
        );
    }

    // `min_by_key` keeps the first of equal keys, so candidate order breaks ties.
    match estimates.iter().min_by_key(|e| (e.byte_len, e.steps)) {
        Some(best) => {
            log::debug!(
                "Classified {} integers as '{}' ({} bytes)",
                values.len(),
                best.candidate.name(),
                best.byte_len
            );
            best.candidate.encoder()
        }
        None => ArrayEncoder::by(Transform::ByteArray),
    }
}

//==================================================================================
// 2. Floats and Text
//==================================================================================

/// Picks the storage width and optional run-length for a float column.
///
/// `Float32` storage is used when the source already is `Float32` or every
/// value is exactly representable; FixedPoint and IntervalQuantization are
/// lossy and never chosen here.
pub fn classify_float_values(values: &[f64], src_type: DataType) -> ArrayEncoder {
    let n = values.len();
    let fits_f32 = src_type == DataType::Float32 || values.iter().all(|&v| is_exact_f32(v));
    let terminal = |allow_f32: bool| {
        if allow_f32 && src_type != DataType::Float32 {
            Transform::Float32Array
        } else {
            Transform::ByteArray
        }
    };

    if n < MIN_CLASSIFY_LEN {
        return ArrayEncoder::by(terminal(fits_f32));
    }

    let bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    let runs = rle::count_runs(&bits);
    let f32_counts_exact = n <= MAX_EXACT_F32_COUNT;
    let use_rle = runs * 2 < n && (src_type != DataType::Float32 || f32_counts_exact);

    log_metric!("classifier_float_runs" = runs, "len" = n, "float32" = fits_f32);

    if use_rle {
        ArrayEncoder::by(Transform::RunLength).and(terminal(fits_f32 && f32_counts_exact))
    } else {
        ArrayEncoder::by(terminal(fits_f32))
    }
}

/// Dictionary-encodes text unless it is too diverse to benefit.
pub fn classify_string_values<S: AsRef<str>>(values: &[S], max_distinct_ratio: f64) -> ArrayEncoder {
    if values.is_empty() {
        return ArrayEncoder::by(Transform::ByteArray);
    }
    let distinct: HashSet<&str> = values
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !s.is_empty())
        .collect();
    let ratio = distinct.len() as f64 / values.len() as f64;

    log_metric!("classifier_distinct_ratio" = ratio, "len" = values.len());

    if ratio > max_distinct_ratio {
        ArrayEncoder::by(Transform::ByteArray)
    } else {
        ArrayEncoder::by(Transform::StringArray)
    }
}

/// Chooses an encoder for any column array.
pub fn classify(data: &TypedArray, config: &EncoderConfig) -> ArrayEncoder {
    if let TypedArray::Str(values) = data {
        return classify_string_values(values, config.dictionary_max_distinct_ratio);
    }
    if let Some(values) = data.int_values() {
        return classify_int_values(&values);
    }
    match data.float_values() {
        Some(values) => classify_float_values(&values, data.data_type()),
        None => ArrayEncoder::by(Transform::ByteArray),
    }
}
