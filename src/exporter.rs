//! Serializing citation records to BibTeX/BibLaTeX text.
//!
//! The exporter is the last stage of the pipeline. It turns one or more
//! [`CitationRecord`]s into entry blocks of the form
//!
//! ```text
//! @article{smith2020,
//!     author = {Smith, Jane},
//!     title = {A Study},
//!     journaltitle = {Journal of Studies},
//!     date = {2020-05}
//! }
//! ```
//!
//! concatenated with a blank line separator, in input order. Output depends
//! only on input: field emission order is deterministic (required fields
//! first in canonical order, then the remaining fields in model insertion
//! order), values are escaped through the [`escape`](crate::escape) policy,
//! and raw extensions are emitted as `%` comments after the block — never as
//! fields, since they are by definition non-standard.
//!
//! Two API levels are provided, following the convenience-plus-report
//! pattern: [`export_records`] returns just the text, and
//! [`export_records_with_report`] additionally returns the non-fatal
//! [`ExportWarning`]s collected for missing-but-expected fields.
//!
//! # Examples
//!
//! ```ignore
//! use cslbib::{exporter, CitationRecord, DateParts, EntryType, ExportConfig, Name};
//!
//! let record = CitationRecord::builder("smith2020", EntryType::Article)
//!     .names_field("author", vec![Name::person("Smith", "Jane")])
//!     .text_field("title", "A Study")
//!     .date_field("issued", DateParts::year(2020))
//!     .build();
//!
//! let bibtex = exporter::export_record(&record, &ExportConfig::new())?;
//! assert!(bibtex.starts_with("@article{smith2020,"));
//! # Ok::<(), cslbib::ConvertError>(())
//! ```

use std::collections::HashSet;
use std::fmt::Write;

use crate::entry_type::field_to_bibtex;
use crate::error::Result;
use crate::escape::{escape, SafeSet};
use crate::record::{CitationRecord, FieldValue, Name};
use crate::validation;

/// Output dialect.
///
/// The dialect decides the entry-type vocabulary (`@online` vs `@misc`),
/// a handful of field names (`journaltitle` vs `journal`), and whether dates
/// are emitted as a single `date` field or split into legacy `year`/`month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BibFormat {
    /// Modern BibLaTeX vocabulary with `date = {YYYY-MM-DD}` fields.
    #[default]
    BibLaTeX,
    /// Legacy BibTeX vocabulary with `year` and three-letter `month` macros.
    /// The day of a full date is dropped; legacy BibTeX cannot express it.
    BibTeX,
}

/// Export configuration.
///
/// # Examples
///
/// ```ignore
/// use cslbib::{BibFormat, ExportConfig, SafeSet};
///
/// let config = ExportConfig::new()
///     .with_format(BibFormat::BibTeX)
///     .with_safe_set(SafeSet::All);
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output dialect.
    pub format: BibFormat,
    /// Unicode safe-set policy applied to every emitted value.
    pub safe_set: SafeSet,
    /// Whether raw extensions are emitted as comments after each block.
    pub extension_comments: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            format: BibFormat::default(),
            safe_set: SafeSet::default(),
            extension_comments: true,
        }
    }
}

impl ExportConfig {
    /// Create a configuration with defaults: BibLaTeX, ASCII safe set,
    /// extension comments on.
    #[must_use]
    pub fn new() -> Self {
        ExportConfig::default()
    }

    /// Set the output dialect.
    #[must_use]
    pub fn with_format(mut self, format: BibFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the Unicode safe-set policy.
    #[must_use]
    pub fn with_safe_set(mut self, safe_set: SafeSet) -> Self {
        self.safe_set = safe_set;
        self
    }

    /// Enable or disable raw-extension comments.
    #[must_use]
    pub fn with_extension_comments(mut self, enabled: bool) -> Self {
        self.extension_comments = enabled;
        self
    }
}

/// Non-fatal warning produced while exporting one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportWarning {
    /// Citation key of the affected record.
    pub key: String,
    /// Expected fields the record does not carry.
    pub missing: Vec<&'static str>,
}

/// Result of exporting a batch with warnings attached.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// The serialized BibTeX text.
    pub bibtex: String,
    /// One warning per record with missing expected fields, in input order.
    pub warnings: Vec<ExportWarning>,
}

/// Serialize one record to a BibTeX entry block.
///
/// # Errors
///
/// Infallible for records built through the parser or builder; the `Result`
/// surface exists for the batch-level invariant checks of
/// [`export_records`]. An entry type outside the closed set cannot be
/// represented in the model, so the defensive unsupported-type failure of
/// the reader has no counterpart here.
pub fn export_record(record: &CitationRecord, config: &ExportConfig) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "@{}{{{},",
        record.entry_type.bibtex_type(config.format),
        record.key
    )
    .ok();

    let mut lines: Vec<String> = Vec::new();
    let mut emitted: HashSet<&str> = HashSet::new();

    // Required fields first, in canonical order.
    for name in record.entry_type.required_fields() {
        if let Some(value) = record.fields.get(*name) {
            push_field_lines(&mut lines, name, value, record, config);
            emitted.insert(name);
        }
    }
    // Then everything else in model insertion order.
    for (name, value) in &record.fields {
        if !emitted.contains(name.as_str()) {
            push_field_lines(&mut lines, name, value, record, config);
        }
    }

    out.push_str(&lines.join(",\n"));
    out.push_str("\n}\n");

    if config.extension_comments {
        for (name, value) in &record.raw_extensions {
            writeln!(out, "% {name}: {}", comment_value(value)).ok();
        }
    }
    Ok(out)
}

/// Serialize a batch of records, blank-line separated, in input order.
///
/// # Errors
///
/// Returns [`ConvertError::DuplicateKey`](crate::ConvertError::DuplicateKey)
/// if two records share a citation key.
pub fn export_records(records: &[CitationRecord], config: &ExportConfig) -> Result<String> {
    validation::check_unique_keys(records)?;
    let blocks: Result<Vec<String>> = records
        .iter()
        .map(|record| export_record(record, config))
        .collect();
    Ok(blocks?.join("\n"))
}

/// Serialize a batch and collect missing-field warnings.
///
/// Warnings are advisory; the text is produced regardless.
///
/// # Errors
///
/// Same failure conditions as [`export_records`].
pub fn export_records_with_report(
    records: &[CitationRecord],
    config: &ExportConfig,
) -> Result<ExportReport> {
    let bibtex = export_records(records, config)?;
    let warnings = records
        .iter()
        .filter_map(|record| {
            let missing = validation::missing_fields(record);
            if missing.is_empty() {
                None
            } else {
                Some(ExportWarning {
                    key: record.key.clone(),
                    missing,
                })
            }
        })
        .collect();
    Ok(ExportReport { bibtex, warnings })
}

/// Append the BibTeX line(s) for one model field.
///
/// Dates may expand to more than one line in legacy mode (`year` plus
/// `month`), which is why this pushes into the shared line list instead of
/// returning a single string.
fn push_field_lines(
    lines: &mut Vec<String>,
    name: &str,
    value: &FieldValue,
    record: &CitationRecord,
    config: &ExportConfig,
) {
    match value {
        FieldValue::Text(text) => {
            let bibtex_name = field_to_bibtex(name, record.entry_type, config.format)
                .map_or_else(|| name.to_ascii_lowercase(), ToString::to_string);
            lines.push(format!(
                "    {bibtex_name} = {{{}}}",
                escape(text, config.safe_set)
            ));
        },
        FieldValue::Names(names) => {
            let bibtex_name = field_to_bibtex(name, record.entry_type, config.format)
                .map_or_else(|| name.to_ascii_lowercase(), ToString::to_string);
            lines.push(format!(
                "    {bibtex_name} = {{{}}}",
                format_names(names, config.safe_set)
            ));
        },
        FieldValue::Date(date) => match name {
            "accessed" => {
                lines.push(format!("    urldate = {{{}}}", date.to_biblatex()));
            },
            _ if config.format == BibFormat::BibTeX => {
                lines.push(format!("    year = {{{}}}", date.year));
                if let Some(month) = date.month_macro() {
                    lines.push(format!("    month = {month}"));
                }
            },
            _ => {
                lines.push(format!("    date = {{{}}}", date.to_biblatex()));
            },
        },
    }
}

/// Serialize a name list: `family, given and family, given …`, with literal
/// names as single brace-protected tokens.
fn format_names(names: &[Name], safe_set: SafeSet) -> String {
    names
        .iter()
        .map(|name| match name {
            Name::Person {
                family,
                given: Some(given),
            } => format!("{}, {}", escape(family, safe_set), escape(given, safe_set)),
            Name::Person {
                family,
                given: None,
            } => escape(family, safe_set),
            Name::Literal(literal) => format!("{{{}}}", escape(literal, safe_set)),
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Render a raw-extension value for a comment line.
fn comment_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
