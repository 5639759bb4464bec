// In: src/bridge/encoder.rs

use std::io::Write;
use std::mem;

use crate::bridge::column::get_field_data;
use crate::bridge::field::{Category, CategoryInstance, Field, FieldFormat, FieldType};
use crate::bridge::format::{
    sanitize_header, EncodedCategory, EncodedColumn, EncodedDataBlock, EncodedFile,
};
use crate::bridge::policy::{
    CategoryFilter, CategoryFormatter, DefaultFilter, DefaultFormatter, EncodingProvider,
};
use crate::config::EncoderConfig;
use crate::error::BinaryCifError;
use crate::pipeline::classifier;
use crate::pipeline::models::{ArrayEncoder, Transform};
use crate::types::TypedArray;

enum EncoderState {
    Open { data_blocks: Vec<EncodedDataBlock> },
    Finalized { bytes: Vec<u8> },
}

/// A stateful encode session that builds one BinaryCIF container.
///
/// Blocks are opened with `start_data_block`; each `write_category` appends
/// to the most recent block. `finalize` serializes the container once and
/// caches the bytes, after which any further write fails with
/// `BinaryCifError::AlreadyEncoded`.
pub struct BinaryEncoder {
    config: EncoderConfig,
    state: EncoderState,
    filter: Box<dyn CategoryFilter>,
    formatter: Box<dyn CategoryFormatter>,
    provider: Option<Box<dyn EncodingProvider>>,
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

impl BinaryEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            state: EncoderState::Open {
                data_blocks: Vec::new(),
            },
            filter: Box::new(DefaultFilter),
            formatter: Box::new(DefaultFormatter),
            provider: None,
        }
    }

    /// Uses `provider` for explicit encoders, ahead of formats and the classifier.
    pub fn with_encoding_provider(mut self, provider: impl EncodingProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn set_filter(&mut self, filter: impl CategoryFilter + 'static) {
        self.filter = Box::new(filter);
    }

    pub fn set_formatter(&mut self, formatter: impl CategoryFormatter + 'static) {
        self.formatter = Box::new(formatter);
    }

    pub fn set_encoding_provider(&mut self, provider: impl EncodingProvider + 'static) {
        self.provider = Some(Box::new(provider));
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, EncoderState::Finalized { .. })
    }

    //==============================================================================
    // Writing
    //==============================================================================

    /// Opens a new data block. The header is stripped of whitespace and
    /// upper-cased.
    pub fn start_data_block(&mut self, header: &str) -> Result<(), BinaryCifError> {
        let EncoderState::Open { data_blocks } = &mut self.state else {
            return Err(BinaryCifError::AlreadyEncoded);
        };
        let header = sanitize_header(header);
        log::debug!("Starting data block '{}'", header);
        data_blocks.push(EncodedDataBlock::new(header));
        Ok(())
    }

    /// Encodes `category` for `ctx` into the current data block.
    ///
    /// Filtered-out categories, categories with no rows, and categories whose
    /// fields are all filtered out are skipped without error.
    pub fn write_category<C, Ctx>(&mut self, category: &C, ctx: &Ctx) -> Result<(), BinaryCifError>
    where
        C: Category<Ctx>,
        Ctx: ?Sized,
    {
        let EncoderState::Open { data_blocks } = &mut self.state else {
            return Err(BinaryCifError::AlreadyEncoded);
        };
        let block = data_blocks.last_mut().ok_or(BinaryCifError::NoDataBlock)?;

        let name = category.name();
        if !self.filter.include_category(name) {
            log_metric!("event" = "skip_category", "category" = name, "reason" = "filtered");
            return Ok(());
        }

        let instance = category.instance(ctx);
        let row_count = instance.row_count();
        if row_count == 0 {
            log_metric!("event" = "skip_category", "category" = name, "reason" = "empty");
            return Ok(());
        }

        let session = ColumnSession {
            config: &self.config,
            filter: self.filter.as_ref(),
            formatter: self.formatter.as_ref(),
            provider: self.provider.as_deref(),
        };
        let columns = session.encode_columns(name, &instance)?;
        if columns.is_empty() {
            log_metric!("event" = "skip_category", "category" = name, "reason" = "no_columns");
            return Ok(());
        }

        log_metric!(
            "event" = "write_category",
            "category" = name,
            "rows" = row_count,
            "columns" = columns.len()
        );
        block.categories.push(EncodedCategory {
            name: format!("_{}", name),
            row_count,
            columns,
        });
        Ok(())
    }

    //==============================================================================
    // Finalization
    //==============================================================================

    /// Serializes the container. Repeated calls return the cached bytes.
    pub fn finalize(&mut self) -> Result<&[u8], BinaryCifError> {
        if let EncoderState::Open { data_blocks } = &mut self.state {
            let file = EncodedFile::new(self.config.encoder_name.clone(), mem::take(data_blocks));
            match rmp_serde::to_vec_named(&file) {
                Ok(bytes) => {
                    log_metric!(
                        "event" = "finalize",
                        "blocks" = file.data_blocks.len(),
                        "bytes" = bytes.len()
                    );
                    self.state = EncoderState::Finalized { bytes };
                }
                Err(err) => {
                    *data_blocks = file.data_blocks;
                    return Err(err.into());
                }
            }
        }

        match &self.state {
            EncoderState::Finalized { bytes } => Ok(bytes.as_slice()),
            EncoderState::Open { .. } => Err(BinaryCifError::InternalError(
                "Encoder is still open after finalize".to_string(),
            )),
        }
    }

    /// Finalizes if needed and returns a copy of the container bytes.
    pub fn get_bytes(&mut self) -> Result<Vec<u8>, BinaryCifError> {
        self.finalize().map(<[u8]>::to_vec)
    }

    /// Finalizes if needed and writes the container bytes to `writer`.
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<(), BinaryCifError> {
        let bytes = self.finalize()?;
        writer.write_all(bytes)?;
        Ok(())
    }

    /// Finalizes if needed and returns the container bytes.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, BinaryCifError> {
        self.finalize()?;
        match self.state {
            EncoderState::Finalized { bytes } => Ok(bytes),
            EncoderState::Open { .. } => Err(BinaryCifError::InternalError(
                "Encoder is still open after finalize".to_string(),
            )),
        }
    }
}

//==================================================================================
// Column Encoding
//==================================================================================

/// Borrowed view of the session policies used while encoding one category.
struct ColumnSession<'a> {
    config: &'a EncoderConfig,
    filter: &'a dyn CategoryFilter,
    formatter: &'a dyn CategoryFormatter,
    provider: Option<&'a dyn EncodingProvider>,
}

impl ColumnSession<'_> {
    fn encode_columns<K, D>(
        &self,
        category: &str,
        instance: &CategoryInstance<K, D>,
    ) -> Result<Vec<EncodedColumn>, BinaryCifError> {
        let mut columns = Vec::with_capacity(instance.fields.len());
        for field in &instance.fields {
            if !self.filter.include_field(category, &field.name) {
                continue;
            }
            let format = self.formatter.get_format(category, &field.name);
            let column = get_field_data(
                category,
                field,
                &instance.source,
                format.as_ref(),
                self.config.value_policy,
            )?;

            let encoder = self.resolve_encoder(category, field, format.as_ref(), &column.array);
            let data = encoder.encode(&column.array)?;
            let mask = column.mask.finish()?;

            log_metric!(
                "event" = "write_column",
                "column" = format!("{}.{}", category, field.name),
                "chain" = data.kinds().join(">"),
                "bytes" = data.data.len(),
                "mask" = mask.is_some()
            );
            columns.push(EncodedColumn {
                name: field.name.clone(),
                data,
                mask,
            });
        }
        Ok(columns)
    }

    /// Provider, then formatter, then the field's default format, then the
    /// classifier (if enabled), then the type default.
    fn resolve_encoder<K, D>(
        &self,
        category: &str,
        field: &Field<K, D>,
        format: Option<&FieldFormat>,
        array: &TypedArray,
    ) -> ArrayEncoder {
        if let Some(encoder) = self.provider.and_then(|p| p.get(category, &field.name)) {
            return encoder;
        }
        if let Some(encoder) = format.and_then(|f| f.encoder.clone()) {
            return encoder;
        }
        if let Some(encoder) = field.default_format.as_ref().and_then(|f| f.encoder.clone()) {
            return encoder;
        }
        if self.config.auto_classify {
            return classifier::classify(array, self.config);
        }
        match field.field_type {
            FieldType::Str => ArrayEncoder::by(Transform::StringArray),
            FieldType::Int | FieldType::Float => ArrayEncoder::by(Transform::ByteArray),
        }
    }
}
