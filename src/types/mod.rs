//! This module defines the core, strongly-typed data representations used
//! throughout the encoder.
//!
//! It includes the `DataType` enum, whose numeric codes are part of the wire
//! format, and `TypedArray`, the flat homogeneous column buffer that every
//! encoding primitive consumes and produces.

pub mod data_type;
pub mod typed_array;

// Re-export the main type(s) for easier access.
pub use data_type::DataType;
pub use typed_array::TypedArray;
