//! Citation record structures and operations.
//!
//! This module provides the format-neutral model sitting between the CSL
//! parser and the BibTeX exporter:
//! - [`CitationRecord`] — one bibliographic entry keyed by its citation key
//! - [`FieldValue`] — a plain string, an ordered name list, or a structured date
//! - [`Name`] — one entry in a name list
//!
//! Fields are stored in insertion order using `IndexMap`, preserving the
//! order in which they were parsed. This ensures round-trip fidelity when a
//! record travels through the exporter and back through the reader.
//!
//! The model never stores rendering decisions: values are held unescaped,
//! and LaTeX escaping is applied only at export time.
//!
//! # Examples
//!
//! Create a record with the builder API:
//!
//! ```ignore
//! use cslbib::{CitationRecord, DateParts, EntryType, Name};
//!
//! let record = CitationRecord::builder("smith2020", EntryType::Article)
//!     .text_field("title", "A Study")
//!     .names_field("author", vec![Name::person("Smith", "Jane")])
//!     .date_field("issued", DateParts::year(2020))
//!     .build();
//!
//! assert_eq!(record.text("title"), Some("A Study"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::date::DateParts;
use crate::entry_type::EntryType;

/// One entry in an ordered name list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Name {
    /// A personal name split into family and optional given part.
    Person {
        /// Family name.
        family: String,
        /// Given name, if supplied.
        given: Option<String>,
    },
    /// An organizational or otherwise indivisible name, serialized as a
    /// single brace-protected token.
    Literal(String),
}

impl Name {
    /// Create a personal name with family and given parts.
    #[must_use]
    pub fn person(family: &str, given: &str) -> Self {
        Name::Person {
            family: family.to_string(),
            given: Some(given.to_string()),
        }
    }

    /// Create a personal name with only a family part.
    #[must_use]
    pub fn family(family: &str) -> Self {
        Name::Person {
            family: family.to_string(),
            given: None,
        }
    }

    /// Create a literal (organizational) name.
    #[must_use]
    pub fn literal(name: &str) -> Self {
        Name::Literal(name.to_string())
    }
}

/// An ordered name list.
///
/// Stored in `SmallVec` to avoid allocation for the typical entry with four
/// or fewer names. Order is significant and never changed by the pipeline.
pub type NameList = SmallVec<[Name; 4]>;

/// A single field value in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Plain string value, held unescaped.
    Text(String),
    /// Ordered name list; order is as supplied, never reordered.
    Names(NameList),
    /// Structured date parts.
    Date(DateParts),
}

impl FieldValue {
    /// Build a text value.
    #[must_use]
    pub fn text(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }

    /// Build a name-list value from any name sequence.
    #[must_use]
    pub fn names<I: IntoIterator<Item = Name>>(names: I) -> Self {
        FieldValue::Names(names.into_iter().collect())
    }
}

/// A citation record: the internal, format-neutral representation of one
/// bibliographic entry.
///
/// Constructed fresh per input item by the parser, passed immutably to the
/// exporter, and discarded after serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Citation key; unique within a batch.
    pub key: String,
    /// Bibliographic category from the closed set.
    pub entry_type: EntryType,
    /// Canonical field name → value, insertion order preserved.
    pub fields: IndexMap<String, FieldValue>,
    /// Unrecognized CSL fields preserved verbatim, plus flags recorded by the
    /// pipeline itself (`original-type`, `<date-field>-end`).
    pub raw_extensions: IndexMap<String, Value>,
}

impl CitationRecord {
    /// Create an empty record with the given key and entry type.
    #[must_use]
    pub fn new(key: &str, entry_type: EntryType) -> Self {
        CitationRecord {
            key: key.to_string(),
            entry_type,
            fields: IndexMap::new(),
            raw_extensions: IndexMap::new(),
        }
    }

    /// Create a builder for fluently constructing records.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use cslbib::{CitationRecord, EntryType, Name};
    ///
    /// let record = CitationRecord::builder("doe1999", EntryType::Book)
    ///     .names_field("author", vec![Name::person("Doe", "John")])
    ///     .text_field("title", "A Book")
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder(key: &str, entry_type: EntryType) -> CitationRecordBuilder {
        CitationRecordBuilder {
            record: CitationRecord::new(key, entry_type),
        }
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Set a plain text field.
    pub fn set_text(&mut self, name: &str, value: &str) {
        self.set_field(name, FieldValue::text(value));
    }

    /// Record an unrecognized field verbatim.
    pub fn add_raw_extension(&mut self, name: &str, value: Value) {
        self.raw_extensions.insert(name.to_string(), value);
    }

    /// Get a text field value.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Get a name-list field.
    #[must_use]
    pub fn names(&self, name: &str) -> Option<&[Name]> {
        match self.fields.get(name) {
            Some(FieldValue::Names(names)) => Some(names.as_slice()),
            _ => None,
        }
    }

    /// Get a date field.
    #[must_use]
    pub fn date(&self, name: &str) -> Option<&DateParts> {
        match self.fields.get(name) {
            Some(FieldValue::Date(date)) => Some(date),
            _ => None,
        }
    }

    /// Whether the record has a field with the given name.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The original CSL type string, when the parser mapped an unknown type
    /// to [`EntryType::Misc`].
    #[must_use]
    pub fn original_type(&self) -> Option<&str> {
        self.raw_extensions
            .get("original-type")
            .and_then(Value::as_str)
    }
}

/// Builder for fluently constructing [`CitationRecord`]s.
#[derive(Debug)]
pub struct CitationRecordBuilder {
    record: CitationRecord,
}

impl CitationRecordBuilder {
    /// Add a plain text field.
    #[must_use]
    pub fn text_field(mut self, name: &str, value: &str) -> Self {
        self.record.set_text(name, value);
        self
    }

    /// Add a name-list field.
    #[must_use]
    pub fn names_field<I: IntoIterator<Item = Name>>(mut self, name: &str, names: I) -> Self {
        self.record.set_field(name, FieldValue::names(names));
        self
    }

    /// Add a date field.
    #[must_use]
    pub fn date_field(mut self, name: &str, date: DateParts) -> Self {
        self.record.set_field(name, FieldValue::Date(date));
        self
    }

    /// Add a raw extension entry.
    #[must_use]
    pub fn raw_extension(mut self, name: &str, value: Value) -> Self {
        self.record.add_raw_extension(name, value);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> CitationRecord {
        self.record
    }
}
