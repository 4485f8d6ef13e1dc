#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # cslbib: CSL-JSON to BibTeX conversion
//!
//! A pure-Rust pipeline for converting CSL-JSON citation records into
//! BibTeX/BibLaTeX text:
//!
//! ```text
//! raw CSL-JSON → validated CitationRecord(s) → serialized BibTeX text
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use cslbib::convert_str;
//!
//! let bibtex = convert_str(r#"{
//!     "id": "smith2020",
//!     "type": "article-journal",
//!     "title": "A Study",
//!     "author": [{"given": "Jane", "family": "Smith"}],
//!     "issued": {"date-parts": [[2020, 5]]}
//! }"#)?;
//!
//! assert!(bibtex.starts_with("@article{smith2020,"));
//! # Ok::<(), cslbib::ConvertError>(())
//! ```
//!
//! ## Working with the model directly
//!
//! ```ignore
//! use cslbib::{exporter, CitationRecord, DateParts, EntryType, ExportConfig, Name};
//!
//! let record = CitationRecord::builder("doe1999", EntryType::Book)
//!     .names_field("author", vec![Name::person("Doe", "John")])
//!     .text_field("title", "A Book")
//!     .date_field("issued", DateParts::year(1999))
//!     .build();
//!
//! let bibtex = exporter::export_record(&record, &ExportConfig::new())?;
//! # Ok::<(), cslbib::ConvertError>(())
//! ```
//!
//! ## Modules
//!
//! - [`convert`] — top-level conversion entry points and failure policies
//! - [`parser`] — CSL-JSON items → [`CitationRecord`]s
//! - [`record`] — the format-neutral citation record model
//! - [`entry_type`] — the closed entry-type set and vocabulary crosswalks
//! - [`date`] — structured date parts and their serialization
//! - [`exporter`] — records → BibTeX/BibLaTeX entry blocks
//! - [`escape`] — LaTeX escaping and the Unicode safe-set policy
//! - [`reader`] — best-effort BibTeX text → records (round-trip inverse)
//! - [`validation`] — completeness checks and batch invariants
//! - [`error`] — error types and result type
//!
//! ## Design Notes
//!
//! Each conversion is a pure, independent transformation: no component holds
//! state across calls, there is no I/O, and separate calls may run
//! concurrently without coordination. Within a batch, records are processed
//! and emitted in strict input order.

pub mod convert;
pub mod date;
pub mod entry_type;
pub mod error;
pub mod escape;
pub mod exporter;
pub mod parser;
pub mod reader;
/// The format-neutral citation record model (`CitationRecord`, `FieldValue`, `Name`).
pub mod record;
pub mod validation;

pub use convert::{convert, convert_str, ConvertOutcome, Converter, FailureMode, ItemFailure};
pub use date::DateParts;
pub use entry_type::{EntryType, ALL_ENTRY_TYPES};
pub use error::{ConvertError, Result};
pub use escape::SafeSet;
pub use exporter::{BibFormat, ExportConfig, ExportReport, ExportWarning};
pub use record::{CitationRecord, CitationRecordBuilder, FieldValue, Name, NameList};
