//! This file is the root of the `bincif` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`kernels`, `pipeline`,
//!     `bridge`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types a caller needs to drive an encode
//!     session: the `BinaryEncoder`, the category/field contracts, and the
//!     encoder configuration.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod error;
pub mod kernels;
pub mod null_handling;
pub mod pipeline;
pub mod types;

mod utils;

#[doc(hidden)]
pub use log as __log;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use bridge::encoder::BinaryEncoder;
pub use bridge::field::{
    Category, CategoryInstance, Field, FieldFormat, FieldType, FieldValue, SourceShard,
};
pub use bridge::format::{
    decode_file, EncodedCategory, EncodedColumn, EncodedDataBlock, EncodedFile,
    BINARY_CIF_VERSION,
};
pub use bridge::policy::{
    CategoryFilter, CategoryFormatter, DefaultFilter, DefaultFormatter, EncodingMap,
    EncodingProvider, NameFilter,
};
pub use config::{EncoderConfig, ValuePolicy};
pub use error::BinaryCifError;
pub use null_handling::ValueKind;
pub use pipeline::models::{ArrayEncoder, EncodedData, EncodingStep, Transform};
pub use types::{DataType, TypedArray};
