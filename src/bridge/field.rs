//! The category/field contracts a data source implements to be encoded.
//!
//! The encoder never sees a domain object model. A source describes each
//! category as a list of `Field`s (a name, a logical type and two accessors)
//! plus an ordered list of `SourceShard`s whose keys define the row order.
//! Every field is evaluated against the same shard/key sequence, which is what
//! keeps the columns of a category row-aligned.

use crate::null_handling::ValueKind;
use crate::pipeline::models::ArrayEncoder;
use crate::types::DataType;

//==================================================================================
// I. Logical Types and Values
//==================================================================================

/// The logical type of a field. It fixes the placeholder used for absent
/// values and the default storage type of the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    Float,
    Str,
}

/// A single value returned by a field accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Optional per-field storage and encoding overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldFormat {
    /// Storage type for the flat column array.
    pub typed_array: Option<DataType>,
    /// Explicit encoding chain; bypasses the classifier.
    pub encoder: Option<ArrayEncoder>,
}

impl FieldFormat {
    pub fn typed_array(data_type: DataType) -> Self {
        Self {
            typed_array: Some(data_type),
            encoder: None,
        }
    }

    pub fn encoder(encoder: ArrayEncoder) -> Self {
        Self {
            typed_array: None,
            encoder: Some(encoder),
        }
    }
}

//==================================================================================
// II. Field Descriptor
//==================================================================================

type ValueFn<K, D> = Box<dyn Fn(&K, &D, usize) -> FieldValue>;
type ValueKindFn<K, D> = Box<dyn Fn(&K, &D) -> ValueKind>;

/// One column of a category, described by accessors over a source shard.
///
/// `value(key, data, row)` receives the row's global offset within the
/// category. `value_kind(key, data)` defaults to `Present` for every row.
pub struct Field<K, D> {
    pub name: String,
    pub field_type: FieldType,
    pub default_format: Option<FieldFormat>,
    value: ValueFn<K, D>,
    value_kind: Option<ValueKindFn<K, D>>,
}

impl<K, D> Field<K, D> {
    pub fn new<F, V>(name: impl Into<String>, field_type: FieldType, value: F) -> Self
    where
        F: Fn(&K, &D, usize) -> V + 'static,
        V: Into<FieldValue>,
    {
        Self {
            name: name.into(),
            field_type,
            default_format: None,
            value: Box::new(move |key, data, row| value(key, data, row).into()),
            value_kind: None,
        }
    }

    pub fn int<F, V>(name: impl Into<String>, value: F) -> Self
    where
        F: Fn(&K, &D, usize) -> V + 'static,
        V: Into<FieldValue>,
    {
        Self::new(name, FieldType::Int, value)
    }

    pub fn float<F, V>(name: impl Into<String>, value: F) -> Self
    where
        F: Fn(&K, &D, usize) -> V + 'static,
        V: Into<FieldValue>,
    {
        Self::new(name, FieldType::Float, value)
    }

    pub fn str<F, V>(name: impl Into<String>, value: F) -> Self
    where
        F: Fn(&K, &D, usize) -> V + 'static,
        V: Into<FieldValue>,
    {
        Self::new(name, FieldType::Str, value)
    }

    pub fn with_value_kind<F>(mut self, value_kind: F) -> Self
    where
        F: Fn(&K, &D) -> ValueKind + 'static,
    {
        self.value_kind = Some(Box::new(value_kind));
        self
    }

    pub fn with_default_format(mut self, format: FieldFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    pub fn value(&self, key: &K, data: &D, row: usize) -> FieldValue {
        (self.value)(key, data, row)
    }

    pub fn value_kind(&self, key: &K, data: &D) -> ValueKind {
        match &self.value_kind {
            Some(f) => f(key, data),
            None => ValueKind::Present,
        }
    }

    pub fn has_value_kind(&self) -> bool {
        self.value_kind.is_some()
    }
}

impl<K, D> std::fmt::Debug for Field<K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("default_format", &self.default_format)
            .field("has_value_kind", &self.value_kind.is_some())
            .finish()
    }
}

//==================================================================================
// III. Sources and Categories
//==================================================================================

/// One contiguous group of rows: shared data plus the row keys in order.
#[derive(Debug, Clone)]
pub struct SourceShard<K, D> {
    pub data: D,
    pub keys: Vec<K>,
}

impl<K, D> SourceShard<K, D> {
    pub fn new(data: D, keys: Vec<K>) -> Self {
        Self { data, keys }
    }
}

impl<D> SourceShard<usize, D> {
    /// A shard whose keys are the row indices `0..len`.
    pub fn indexed(data: D, len: usize) -> Self {
        Self {
            data,
            keys: (0..len).collect(),
        }
    }
}

/// A category resolved against a context: its fields and its row sources.
#[derive(Debug)]
pub struct CategoryInstance<K, D> {
    pub fields: Vec<Field<K, D>>,
    pub source: Vec<SourceShard<K, D>>,
}

impl<K, D> CategoryInstance<K, D> {
    pub fn new(fields: Vec<Field<K, D>>, source: Vec<SourceShard<K, D>>) -> Self {
        Self { fields, source }
    }

    /// Total number of keys across all shards.
    pub fn row_count(&self) -> usize {
        self.source.iter().map(|s| s.keys.len()).sum()
    }
}

/// A named category that can be materialized for a given context.
///
/// Use `()` as the context for categories that need none.
pub trait Category<Ctx: ?Sized = ()> {
    type Key;
    type Data;

    /// The category name without the leading underscore.
    fn name(&self) -> &str;

    fn instance(&self, ctx: &Ctx) -> CategoryInstance<Self::Key, Self::Data>;
}
