//! Top-level conversion entry points.
//!
//! [`convert`] is the single-call surface: CSL-JSON in (one item or an
//! array), BibTeX text out, with default configuration. [`Converter`] adds
//! builder-style configuration over the same pipeline: output dialect,
//! Unicode safe set, extension comments, and the batch failure policy.
//!
//! Failure isolation is caller-configurable, not hardcoded: in
//! [`FailureMode::Batch`] the first bad item fails the whole call, while
//! [`FailureMode::Isolate`] converts every good item and reports each failed
//! one alongside, attributed by batch index.
//!
//! # Examples
//!
//! ```ignore
//! use cslbib::convert_str;
//!
//! let bibtex = convert_str(r#"{"id": "doe1999", "type": "book", "title": "A Book"}"#)?;
//! assert!(bibtex.starts_with("@book{doe1999,"));
//! # Ok::<(), cslbib::ConvertError>(())
//! ```

use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ConvertError, Result};
use crate::escape::SafeSet;
use crate::exporter::{self, BibFormat, ExportConfig};
use crate::parser;
use crate::record::CitationRecord;
use crate::validation;

/// Convert CSL-JSON data (a single item or an array) to BibTeX text with
/// default configuration.
///
/// # Errors
///
/// Fails with the first [`ConvertError`] encountered; see [`Converter`] for
/// per-item failure isolation.
pub fn convert(input: &Value) -> Result<String> {
    Converter::new().convert(input)
}

/// Convert raw CSL-JSON text to BibTeX text with default configuration.
///
/// # Errors
///
/// As [`convert`], plus [`ConvertError::Json`] for malformed JSON text.
pub fn convert_str(input: &str) -> Result<String> {
    Converter::new().convert_str(input)
}

/// Batch failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// One bad item fails the whole batch. The default.
    #[default]
    Batch,
    /// Bad items are reported individually; good items still convert.
    Isolate,
}

/// One failed item in an isolated batch conversion.
#[derive(Debug)]
pub struct ItemFailure {
    /// Zero-based position of the item in the input batch.
    pub index: usize,
    /// What went wrong with it.
    pub error: ConvertError,
}

/// Result of an isolated batch conversion.
#[derive(Debug)]
pub struct ConvertOutcome {
    /// Serialized entries for the items that converted, in input order.
    pub bibtex: String,
    /// Per-item failures, in input order. Empty when everything converted.
    pub failures: Vec<ItemFailure>,
}

/// Configurable conversion pipeline.
///
/// # Examples
///
/// ```ignore
/// use cslbib::{BibFormat, Converter, FailureMode};
/// use serde_json::json;
///
/// let converter = Converter::new()
///     .with_format(BibFormat::BibTeX)
///     .with_failure_mode(FailureMode::Isolate);
///
/// let outcome = converter.convert_outcome(&json!([
///     {"id": "good", "type": "book", "title": "Fine"},
///     {"type": "book", "title": "No Key"}
/// ]))?;
/// assert_eq!(outcome.failures.len(), 1);
/// # Ok::<(), cslbib::ConvertError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ExportConfig,
    failure_mode: FailureMode,
}

impl Converter {
    /// Create a converter with default configuration: BibLaTeX output,
    /// ASCII safe set, extension comments on, batch failure mode.
    #[must_use]
    pub fn new() -> Self {
        Converter::default()
    }

    /// Set the output dialect.
    #[must_use]
    pub fn with_format(mut self, format: BibFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the Unicode safe-set policy.
    #[must_use]
    pub fn with_safe_set(mut self, safe_set: SafeSet) -> Self {
        self.config.safe_set = safe_set;
        self
    }

    /// Enable or disable raw-extension comments in the output.
    #[must_use]
    pub fn with_extension_comments(mut self, enabled: bool) -> Self {
        self.config.extension_comments = enabled;
        self
    }

    /// Set the batch failure policy used by [`Converter::convert_outcome`].
    #[must_use]
    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    /// Convert CSL-JSON data, failing fast on the first bad item.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConvertError`] encountered while parsing or
    /// exporting.
    pub fn convert(&self, input: &Value) -> Result<String> {
        let records = parser::parse_batch(input)?;
        exporter::export_records(&records, &self.config)
    }

    /// Convert raw CSL-JSON text, failing fast on the first bad item.
    ///
    /// # Errors
    ///
    /// As [`Converter::convert`], plus [`ConvertError::Json`] for malformed
    /// JSON text.
    pub fn convert_str(&self, input: &str) -> Result<String> {
        let value: Value = serde_json::from_str(input)?;
        self.convert(&value)
    }

    /// Convert CSL-JSON data under the configured failure policy.
    ///
    /// In [`FailureMode::Batch`] this behaves like [`Converter::convert`]
    /// with an always-empty failure list. In [`FailureMode::Isolate`] each
    /// failed item is reported in the outcome and the remaining items are
    /// converted normally; a duplicated key fails the later occurrence and
    /// keeps the first.
    ///
    /// # Errors
    ///
    /// In batch mode, the first [`ConvertError`] encountered. Isolate mode
    /// only fails on input that is not JSON-compatible data at all.
    pub fn convert_outcome(&self, input: &Value) -> Result<ConvertOutcome> {
        match self.failure_mode {
            FailureMode::Batch => Ok(ConvertOutcome {
                bibtex: self.convert(input)?,
                failures: Vec::new(),
            }),
            FailureMode::Isolate => self.convert_isolated(input),
        }
    }

    /// Convert a batch with the export stage parallelized.
    ///
    /// Purely an internal optimization: records are still emitted in input
    /// order and the output is byte-identical to [`Converter::convert`].
    ///
    /// # Errors
    ///
    /// Same failure conditions as [`Converter::convert`].
    pub fn convert_parallel(&self, input: &Value) -> Result<String> {
        let records = parser::parse_batch(input)?;
        validation::check_unique_keys(&records)?;
        let blocks: Result<Vec<String>> = records
            .par_iter()
            .map(|record| exporter::export_record(record, &self.config))
            .collect();
        Ok(blocks?.join("\n"))
    }

    fn convert_isolated(&self, input: &Value) -> Result<ConvertOutcome> {
        let items: Vec<&Value> = match input {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut records: Vec<CitationRecord> = Vec::new();
        let mut failures: Vec<ItemFailure> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, item) in items.iter().enumerate() {
            match parser::parse_item_at(item, index) {
                Ok(record) => {
                    if let Some(&first) = seen.get(&record.key) {
                        failures.push(ItemFailure {
                            index,
                            error: ConvertError::DuplicateKey {
                                key: record.key,
                                first,
                                second: index,
                            },
                        });
                    } else {
                        seen.insert(record.key.clone(), index);
                        records.push(record);
                    }
                },
                Err(error) => failures.push(ItemFailure { index, error }),
            }
        }

        let bibtex = exporter::export_records(&records, &self.config)?;
        Ok(ConvertOutcome { bibtex, failures })
    }
}
