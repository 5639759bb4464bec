//! The single source of truth for encoder configuration.
//!
//! `EncoderConfig` is created once per encode session (directly, from
//! `Default`, or from JSON) and owned by the `BinaryEncoder`. The classifier
//! reads its thresholds from here; nothing else in the crate keeps settings.

use serde::{Deserialize, Serialize};

use crate::error::BinaryCifError;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// What to do when a field's value accessor disagrees with its declared type
/// (for example a non-numeric string returned for an integer field).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValuePolicy {
    /// **Default:** Substitute the type placeholder, mark the cell `Unknown`
    /// in the mask, log a warning, and keep encoding the category.
    #[default]
    Lenient,

    /// Fail the `write_category` call with `BinaryCifError::MalformedValue`.
    Strict,
}

//==================================================================================
// II. The Unified EncoderConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct EncoderConfig {
    /// Identifies the producing encoder in the container's `encoder` field.
    /// Diagnostic only.
    #[serde(default = "default_encoder_name")]
    pub encoder_name: String,

    /// If true, columns without an explicit encoder are classified. If false
    /// they fall back to `StringArray` (text) or `ByteArray` (numbers).
    #[serde(default = "default_true")]
    pub auto_classify: bool,

    #[serde(default)]
    pub value_policy: ValuePolicy,

    /// Text columns whose distinct non-empty values per row exceed this ratio
    /// are stored as a plain text `ByteArray` rather than a dictionary.
    #[serde(default = "default_dictionary_max_distinct_ratio")]
    pub dictionary_max_distinct_ratio: f64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            encoder_name: default_encoder_name(),
            auto_classify: true,
            value_policy: ValuePolicy::default(),
            dictionary_max_distinct_ratio: default_dictionary_max_distinct_ratio(),
        }
    }
}

impl EncoderConfig {
    /// Parses a config from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, BinaryCifError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_encoder_name(mut self, name: impl Into<String>) -> Self {
        self.encoder_name = name.into();
        self
    }

    pub fn with_auto_classify(mut self, auto_classify: bool) -> Self {
        self.auto_classify = auto_classify;
        self
    }

    pub fn with_value_policy(mut self, policy: ValuePolicy) -> Self {
        self.value_policy = policy;
        self
    }
}

fn default_encoder_name() -> String {
    format!("bincif-core {}", crate::VERSION)
}

fn default_true() -> bool {
    true
}

fn default_dictionary_max_distinct_ratio() -> f64 {
    0.5
}
