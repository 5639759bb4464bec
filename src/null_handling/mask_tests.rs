use crate::null_handling::{decode_mask, encode_mask, MaskBuilder, ValueKind};
use crate::pipeline::models::EncodingStep;
use crate::types::DataType;

#[test]
fn test_all_present_produces_no_mask() {
    let mut builder = MaskBuilder::with_capacity(3);
    for _ in 0..3 {
        builder.push(ValueKind::Present);
    }
    assert!(builder.is_all_present());
    assert!(builder.finish().unwrap().is_none());
}

#[test]
fn test_sparse_mask_uses_run_length() {
    let mut mask = vec![0u8; 100];
    mask[50] = ValueKind::NotPresent as u8;
    let encoded = encode_mask(&mask).unwrap();
    assert_eq!(
        encoded.encoding,
        vec![
            EncodingStep::RunLength {
                src_type: DataType::UInt8,
                src_size: 100
            },
            EncodingStep::ByteArray {
                data_type: DataType::Int32
            },
        ]
    );
    assert_eq!(encoded.data.len(), 24);
}

#[test]
fn test_noisy_mask_falls_back_to_bytes() {
    let mask = vec![0u8, 1, 0, 2];
    let encoded = encode_mask(&mask).unwrap();
    assert_eq!(
        encoded.encoding,
        vec![EncodingStep::ByteArray {
            data_type: DataType::UInt8
        }]
    );
    assert_eq!(encoded.data, mask);
}

#[test]
fn test_builder_roundtrip() {
    let kinds = [
        ValueKind::Present,
        ValueKind::NotPresent,
        ValueKind::Present,
        ValueKind::Unknown,
    ];
    let mut builder = MaskBuilder::with_capacity(kinds.len());
    for kind in kinds {
        builder.push(kind);
    }
    assert_eq!(builder.len(), 4);
    let encoded = builder.finish().unwrap().expect("mask expected");
    assert_eq!(decode_mask(&encoded).unwrap(), kinds.to_vec());
}

#[test]
fn test_unknown_mask_byte_is_rejected() {
    assert!(ValueKind::from_u8(3).is_err());
}
