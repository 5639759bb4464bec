// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing side of the encoder. It adapts caller data
// (categories of fields over ordered source shards) into flat typed arrays,
// hands those to the pure `pipeline` engine, and assembles the results into the
// container structure.
//
// Data Flow (Encoding):
//
//   1. [Stateful Facade (BinaryEncoder)]   -> start_data_block / write_category
//         |
//         `-> for each category that passes the filter and has rows ->
//
//   2. [Column Extraction (column)]        -> Field + SourceShards -> TypedArray + mask
//         |
//         `-> encoder chosen by provider > format > field default > classifier
//
//   3. [Pipeline Engine (pipeline)]        -> TypedArray -> EncodedData
//         |
//         `-> EncodedColumn appended to the current EncodedCategory
//
//   4. [finalize]                          -> EncodedFile -> MessagePack bytes
//
// Data Flow (Decoding, for verification):
//
//   decode_file(bytes) -> EncodedFile -> EncodedColumn::decode_values / decode_mask
//
// ====================================================================================
pub(crate) mod column;
pub mod encoder;
pub mod field;
pub mod format;
pub mod policy;

pub use encoder::BinaryEncoder;
pub use field::{Category, CategoryInstance, Field, FieldFormat, FieldType, FieldValue, SourceShard};
pub use format::{decode_file, EncodedFile};
