//! This module serves as the public API for the collection of all pure,
//! stateless encoding and decoding kernels.
//!
//! Every kernel is an (encode, decode) pair over a flat slice plus the
//! parameters needed to invert it. Kernels know nothing about encoding chains
//! or the container; the `pipeline::executor` composes them and records the
//! matching `EncodingStep` for each one.

/// Layer 0: Type Conversion (lossy, opt-in only)
pub mod fixed_point;
pub mod interval_quantization;

/// Layer 1: Value Reduction
pub mod delta;

/// Layer 2: Sparsity Exploitation
pub mod rle;
pub mod string_array;

/// Layer 3: Bit-Width Reduction
pub mod integer_packing;
pub mod leb128;

/// Final Stage: Byte Layout
pub mod byte_array;
