//! This module defines the single, unified error type for the entire bincif library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinaryCifError {
    // =========================================================================
    // === Encoder Call-Sequence Errors (fatal, caller must fix call order)
    // =========================================================================
    #[error("No data block created.")]
    NoDataBlock,

    #[error("The writer contents have already been encoded, no more writing.")]
    AlreadyEncoded,

    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Invalid encoding chain: {0}")]
    InvalidChain(String),

    #[error("Value {value} is out of range for {encoding}")]
    OutOfRange {
        encoding: &'static str,
        value: String,
    },

    #[error("Narrowing to {target} would lose precision at index {index}")]
    PrecisionLoss { target: &'static str, index: usize },

    #[error("Malformed value in '{category}.{field}' at row {row}: {reason}")]
    MalformedValue {
        category: String,
        field: String,
        row: usize,
        reason: String,
    },

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// The container could not be framed as MessagePack.
    #[error("MessagePack encode failed: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// The container could not be parsed from MessagePack.
    #[error("MessagePack decode failed: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading an `EncoderConfig`.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    // =========================================================================
    // === Low-Level Pipeline/Kernel Errors
    // =========================================================================
    #[error("Buffer length mismatch: expected a multiple of {0}, got {1}")]
    BufferMismatch(usize, usize),

    #[error("RLE decoding error: {0}")]
    RleDecodeError(String),

    #[error("LEB128 decoding error: {0}")]
    Leb128DecodeError(String),

    #[error("Integer packing decode error: {0}")]
    PackingDecodeError(String),

    #[error("String array decode error: {0}")]
    StringArrayError(String),

    #[error("Pipeline execution failed at stage '{stage}': {source}")]
    PipelineError {
        stage: String,
        #[source]
        source: Box<BinaryCifError>,
    },
}

impl BinaryCifError {
    /// Wraps an error with the name of the chain step that produced it.
    pub(crate) fn at_stage(self, stage: &str) -> Self {
        match self {
            // Already attributed; keep the innermost stage.
            err @ BinaryCifError::PipelineError { .. } => err,
            err => BinaryCifError::PipelineError {
                stage: stage.to_string(),
                source: Box::new(err),
            },
        }
    }
}
