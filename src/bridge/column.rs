//! This module turns one field of a category into a flat typed array plus its
//! presence mask.
//!
//! Rows are visited shard by shard, key by key, in the order the source gives
//! them. Absent rows get a type placeholder so the array always has exactly
//! `row_count` entries. Values that disagree with the field's logical type are
//! converted where that is lossless and otherwise handled by `ValuePolicy`.

use crate::bridge::field::{Field, FieldFormat, FieldType, FieldValue, SourceShard};
use crate::config::ValuePolicy;
use crate::error::BinaryCifError;
use crate::null_handling::{MaskBuilder, ValueKind};
use crate::types::{DataType, TypedArray};

/// The extracted contents of one column.
#[derive(Debug)]
pub struct ColumnData {
    pub array: TypedArray,
    pub mask: MaskBuilder,
}

//==================================================================================
// 1. Extraction
//==================================================================================

/// Extracts `field` over every shard of `source`.
///
/// `format` is the formatter's override for this field, which takes
/// precedence over the field's own default format.
pub fn get_field_data<K, D>(
    category: &str,
    field: &Field<K, D>,
    source: &[SourceShard<K, D>],
    format: Option<&FieldFormat>,
    policy: ValuePolicy,
) -> Result<ColumnData, BinaryCifError> {
    let row_count: usize = source.iter().map(|s| s.keys.len()).sum();
    let mut cells = Cells::with_capacity(field.field_type, row_count);
    let mut mask = MaskBuilder::with_capacity(row_count);

    let mut row = 0usize;
    for shard in source {
        for key in &shard.keys {
            let mut kind = field.value_kind(key, &shard.data);
            if kind.is_present() {
                if let Err(reason) = cells.push(field.value(key, &shard.data, row)) {
                    if policy == ValuePolicy::Strict {
                        return Err(BinaryCifError::MalformedValue {
                            category: category.to_string(),
                            field: field.name.clone(),
                            row,
                            reason,
                        });
                    }
                    log::warn!(
                        "Malformed value in {}.{} at row {}: {}; stored as unknown",
                        category,
                        field.name,
                        row,
                        reason
                    );
                    cells.push_placeholder();
                    kind = ValueKind::Unknown;
                }
            } else {
                cells.push_placeholder();
            }
            mask.push(kind);
            row += 1;
        }
    }

    let requested = format
        .and_then(|f| f.typed_array)
        .or_else(|| field.default_format.as_ref().and_then(|f| f.typed_array));
    let array = cells.into_typed_array(requested, category, &field.name);

    Ok(ColumnData { array, mask })
}

//==================================================================================
// 2. Cell Buffers
//==================================================================================

enum Cells {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
}

impl Cells {
    fn with_capacity(field_type: FieldType, capacity: usize) -> Self {
        match field_type {
            FieldType::Int => Self::Int(Vec::with_capacity(capacity)),
            FieldType::Float => Self::Float(Vec::with_capacity(capacity)),
            FieldType::Str => Self::Str(Vec::with_capacity(capacity)),
        }
    }

    fn push_placeholder(&mut self) {
        match self {
            Self::Int(v) => v.push(0),
            Self::Float(v) => v.push(0.0),
            Self::Str(v) => v.push(String::new()),
        }
    }

    /// Converts `value` to this column's logical type, or explains why not.
    fn push(&mut self, value: FieldValue) -> Result<(), String> {
        match (self, value) {
            (Self::Int(v), FieldValue::Int(x)) => v.push(exact_int(x)?),
            (Self::Int(v), FieldValue::Float(x)) => {
                if !(x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64) {
                    return Err(format!("float {} is not an integer", x));
                }
                v.push(exact_int(x as i64)?);
            }
            (Self::Int(v), FieldValue::Str(s)) => match s.trim().parse::<i64>() {
                Ok(x) => v.push(exact_int(x)?),
                Err(_) => return Err(format!("'{}' is not an integer", s)),
            },
            (Self::Float(v), FieldValue::Float(x)) => v.push(x),
            (Self::Float(v), FieldValue::Int(x)) => v.push(exact_int(x)? as f64),
            (Self::Float(v), FieldValue::Str(s)) => match s.trim().parse::<f64>() {
                Ok(x) => v.push(x),
                Err(_) => return Err(format!("'{}' is not a number", s)),
            },
            (Self::Str(v), FieldValue::Str(s)) => v.push(s),
            (Self::Str(v), FieldValue::Int(x)) => v.push(x.to_string()),
            (Self::Str(v), FieldValue::Float(x)) => v.push(x.to_string()),
        }
        Ok(())
    }

    fn into_typed_array(
        self,
        requested: Option<DataType>,
        category: &str,
        field: &str,
    ) -> TypedArray {
        let converted = match (&self, requested) {
            (_, None) => None,
            (Self::Int(values), Some(dt)) if dt.is_integer() => {
                TypedArray::from_int_values(dt, values).ok()
            }
            (Self::Int(values), Some(dt)) if dt.is_float() => {
                let widened = values.iter().map(|&v| v as f64).collect();
                TypedArray::from_float_values(dt, widened).ok()
            }
            (Self::Float(values), Some(dt)) if dt.is_float() => {
                TypedArray::from_float_values(dt, values.clone()).ok()
            }
            (Self::Float(values), Some(dt)) if dt.is_integer() => float_to_int(values, dt),
            (Self::Str(values), Some(DataType::Utf8Text)) => Some(TypedArray::Str(values.clone())),
            _ => None,
        };

        if let Some(array) = converted {
            return array;
        }
        if let Some(dt) = requested {
            log::warn!(
                "{}.{} cannot be stored as {}; using the default storage type",
                category,
                field,
                dt
            );
        }
        self.default_array()
    }

    /// Int32 when every value fits, else UInt32 when non-negative and fitting,
    /// else Float64. Floats are Float64; text is text.
    fn default_array(self) -> TypedArray {
        match self {
            Self::Int(values) => {
                if let Ok(array) = TypedArray::from_int_values(DataType::Int32, &values) {
                    array
                } else if let Ok(array) = TypedArray::from_int_values(DataType::UInt32, &values) {
                    array
                } else {
                    TypedArray::Float64(values.into_iter().map(|v| v as f64).collect())
                }
            }
            Self::Float(values) => TypedArray::Float64(values),
            Self::Str(values) => TypedArray::Str(values),
        }
    }
}

/// Largest magnitude an integer can have and still survive a trip through `f64`.
const MAX_EXACT_F64_INT: i64 = 1 << 53;

/// Integer cells may end up stored as `Float64`; reject anything that would round.
fn exact_int(value: i64) -> Result<i64, String> {
    if value.unsigned_abs() > MAX_EXACT_F64_INT as u64 {
        return Err(format!(
            "integer {} cannot be stored without losing precision",
            value
        ));
    }
    Ok(value)
}

fn float_to_int(values: &[f64], dt: DataType) -> Option<TypedArray> {
    if values.iter().any(|v| !v.is_finite() || v.fract() != 0.0) {
        return None;
    }
    let ints: Vec<i64> = values.iter().map(|&v| v as i64).collect();
    TypedArray::from_int_values(dt, &ints).ok()
}
