//! Defines the serialized container structures.
//!
//! This is the single source of truth for the container shape: a file holds
//! data blocks, a block holds categories, a category holds row-aligned
//! columns, and a column holds its `EncodedData` plus an optional presence
//! mask. Field names are camelCased on the wire, and the whole tree is framed
//! with MessagePack maps.

use serde::{Deserialize, Serialize};

use crate::error::BinaryCifError;
use crate::null_handling::{self, ValueKind};
use crate::pipeline::decoder;
use crate::pipeline::models::EncodedData;
use crate::types::TypedArray;

/// The container format version written by this encoder.
pub const BINARY_CIF_VERSION: &str = "0.3.0";

//==================================================================================
// I. Container Structures
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncodedFile {
    /// Identifies the producing encoder. Diagnostic only.
    pub encoder: String,
    pub version: String,
    pub data_blocks: Vec<EncodedDataBlock>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncodedDataBlock {
    pub header: String,
    pub categories: Vec<EncodedCategory>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncodedCategory {
    /// Category name with its leading underscore, e.g. `_atom_site`.
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<EncodedColumn>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncodedColumn {
    pub name: String,
    pub data: EncodedData,
    /// Absent when every row is `Present`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<EncodedData>,
}

//==================================================================================
// II. Accessors
//==================================================================================

impl EncodedFile {
    pub fn new(encoder: String, data_blocks: Vec<EncodedDataBlock>) -> Self {
        Self {
            encoder,
            version: BINARY_CIF_VERSION.to_string(),
            data_blocks,
        }
    }

    pub fn block(&self, header: &str) -> Option<&EncodedDataBlock> {
        self.data_blocks.iter().find(|b| b.header == header)
    }
}

impl EncodedDataBlock {
    pub fn new(header: String) -> Self {
        Self {
            header,
            categories: Vec::new(),
        }
    }

    /// Looks a category up by its name without the leading underscore.
    pub fn category(&self, name: &str) -> Option<&EncodedCategory> {
        self.categories
            .iter()
            .find(|c| c.name.strip_prefix('_') == Some(name))
    }
}

impl EncodedCategory {
    pub fn column(&self, name: &str) -> Option<&EncodedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl EncodedColumn {
    pub fn decode_values(&self) -> Result<TypedArray, BinaryCifError> {
        decoder::decode(&self.data)
    }

    /// Decodes the presence mask, or `None` when every row is present.
    pub fn decode_mask(&self) -> Result<Option<Vec<ValueKind>>, BinaryCifError> {
        self.mask.as_ref().map(null_handling::decode_mask).transpose()
    }
}

/// Parses finalized container bytes.
pub fn decode_file(bytes: &[u8]) -> Result<EncodedFile, BinaryCifError> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Strips all whitespace and upper-cases a block header.
pub(crate) fn sanitize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::models::EncodingStep;
    use crate::types::DataType;

    #[test]
    fn test_sanitize_header() {
        assert_eq!(sanitize_header(" Test "), "TEST");
        assert_eq!(sanitize_header("1abc\n xyz\t"), "1ABCXYZ");
        assert_eq!(sanitize_header("   "), "");
    }

    #[test]
    fn test_container_uses_wire_names() {
        let file = EncodedFile::new(
            "test".to_string(),
            vec![EncodedDataBlock {
                header: "B".to_string(),
                categories: vec![EncodedCategory {
                    name: "_c".to_string(),
                    row_count: 1,
                    columns: vec![EncodedColumn {
                        name: "x".to_string(),
                        data: EncodedData {
                            encoding: vec![EncodingStep::ByteArray {
                                data_type: DataType::UInt8,
                            }],
                            data: vec![9],
                        },
                        mask: None,
                    }],
                }],
            }],
        );

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["version"], "0.3.0");
        assert_eq!(json["dataBlocks"][0]["categories"][0]["rowCount"], 1);
        let column = &json["dataBlocks"][0]["categories"][0]["columns"][0];
        assert!(column.get("mask").is_none());
        assert_eq!(column["data"]["encoding"][0]["kind"], "ByteArray");
        assert_eq!(column["data"]["encoding"][0]["type"], 4);

        let bytes = rmp_serde::to_vec_named(&file).unwrap();
        assert_eq!(decode_file(&bytes).unwrap(), file);
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(matches!(
            decode_file(&[0xc1]),
            Err(BinaryCifError::MsgPackDecode(_))
        ));
    }
}
