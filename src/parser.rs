//! Parsing CSL-JSON items into citation records.
//!
//! This module is the first stage of the pipeline: it validates and
//! normalizes semi-structured CSL-JSON data into [`CitationRecord`]s. Input
//! is always JSON-compatible data ([`serde_json::Value`]), never serialized
//! text; [`parse_str`] exists only as a convenience that deserializes first.
//!
//! Parsing is strict about the two required parts of an item — the citation
//! key (`id`) and the entry type (`type`) — and tolerant about everything
//! else: recognized fields with an unexpected shape, and fields the model
//! does not know at all, are preserved verbatim in the record's raw
//! extensions so a best-effort round trip stays possible.
//!
//! # Examples
//!
//! ```ignore
//! use cslbib::parser;
//! use serde_json::json;
//!
//! let item = json!({
//!     "id": "smith2020",
//!     "type": "article-journal",
//!     "title": "A Study",
//!     "author": [{"given": "Jane", "family": "Smith"}],
//!     "issued": {"date-parts": [[2020, 5]]}
//! });
//!
//! let record = parser::parse_item(&item)?;
//! assert_eq!(record.key, "smith2020");
//! # Ok::<(), cslbib::ConvertError>(())
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::date::DateParts;
use crate::entry_type::{EntryType, DATE_FIELDS, NAME_FIELDS, TEXT_FIELDS};
use crate::error::{ConvertError, Result};
use crate::record::{CitationRecord, FieldValue, Name, NameList};

lazy_static! {
    // Characters BibTeX cannot accept inside a citation key.
    static ref KEY_RE: Regex = Regex::new(r"^[^\s{},\\%#]+$").expect("valid key pattern");
}

/// Parse raw CSL-JSON text (a single item or an array) into records.
///
/// Convenience wrapper over [`parse_batch`] for callers holding serialized
/// text.
///
/// # Errors
///
/// Returns [`ConvertError::Json`] for text that is not well-formed JSON,
/// otherwise whatever [`parse_batch`] returns.
pub fn parse_str(input: &str) -> Result<Vec<CitationRecord>> {
    let value: Value = serde_json::from_str(input)?;
    parse_batch(&value)
}

/// Parse a CSL-JSON value (a single item or an array of items) into records,
/// preserving input order.
///
/// # Errors
///
/// Returns [`ConvertError::MalformedRecord`] if any item lacks a usable
/// citation key or entry type, and [`ConvertError::DuplicateKey`] if two
/// items share a key; both indices are reported.
pub fn parse_batch(input: &Value) -> Result<Vec<CitationRecord>> {
    let items: Vec<&Value> = match input {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut records = Vec::with_capacity(items.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        let record = parse_item_at(item, index)?;
        if let Some(&first) = seen.get(&record.key) {
            return Err(ConvertError::DuplicateKey {
                key: record.key,
                first,
                second: index,
            });
        }
        seen.insert(record.key.clone(), index);
        records.push(record);
    }
    Ok(records)
}

/// Parse one CSL-JSON item into a record.
///
/// # Errors
///
/// Returns [`ConvertError::MalformedRecord`] (reported at index 0) if the
/// item lacks a usable citation key or entry type, or a name or date field
/// is structurally invalid.
pub fn parse_item(item: &Value) -> Result<CitationRecord> {
    parse_item_at(item, 0)
}

/// Parse one item, attributing failures to the given batch index.
pub(crate) fn parse_item_at(item: &Value, index: usize) -> Result<CitationRecord> {
    let obj = item
        .as_object()
        .ok_or_else(|| malformed(index, "item must be a JSON object"))?;

    let key = match obj.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            return Err(malformed(
                index,
                "citation key 'id' must be a non-empty string or a number",
            ));
        },
        None => return Err(malformed(index, "missing citation key 'id'")),
    };
    if !KEY_RE.is_match(&key) {
        return Err(malformed(
            index,
            format!("citation key '{key}' contains characters BibTeX cannot accept"),
        ));
    }

    let type_str = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(index, "missing or non-string entry type 'type'"))?;

    let mut record = match EntryType::from_csl(type_str) {
        Some(entry_type) => CitationRecord::new(&key, entry_type),
        None => {
            // Unknown CSL types collapse to Misc; the original type string is
            // kept so nothing is silently lost.
            let mut record = CitationRecord::new(&key, EntryType::Misc);
            record.add_raw_extension("original-type", Value::String(type_str.to_string()));
            record
        },
    };

    for (name, value) in obj {
        if name == "id" || name == "type" {
            continue;
        }
        if NAME_FIELDS.contains(&name.as_str()) {
            let names = parse_names(name, value, index)?;
            record.set_field(name, FieldValue::Names(names));
        } else if DATE_FIELDS.contains(&name.as_str()) {
            parse_date_into(&mut record, name, value, index)?;
        } else if TEXT_FIELDS.contains(&name.as_str()) {
            match scalar_to_text(value) {
                Some(text) => record.set_text(name, &text),
                // Recognized field, unexpected shape: preserve rather than drop.
                None => record.add_raw_extension(name, value.clone()),
            }
        } else {
            record.add_raw_extension(name, value.clone());
        }
    }

    Ok(record)
}

/// Parse a CSL name array, preserving order.
fn parse_names(field: &str, value: &Value, index: usize) -> Result<NameList> {
    let array = value
        .as_array()
        .ok_or_else(|| malformed(index, format!("name field '{field}' must be an array")))?;

    let mut names = NameList::new();
    for entry in array {
        let obj = entry.as_object().ok_or_else(|| {
            malformed(index, format!("name entry in '{field}' must be an object"))
        })?;
        if let Some(literal) = obj.get("literal").and_then(Value::as_str) {
            names.push(Name::Literal(literal.to_string()));
            continue;
        }
        let family = obj.get("family").and_then(Value::as_str).ok_or_else(|| {
            malformed(
                index,
                format!("name entry in '{field}' lacks both 'family' and 'literal'"),
            )
        })?;
        let given = obj
            .get("given")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        names.push(Name::Person {
            family: family.to_string(),
            given,
        });
    }
    Ok(names)
}

/// Parse a CSL date object into the record.
///
/// Only the first `date-parts` element populates the model; a range end is
/// preserved verbatim under `<field>-end`. Literal and raw dates cannot be
/// interpreted structurally and are preserved whole.
fn parse_date_into(
    record: &mut CitationRecord,
    field: &str,
    value: &Value,
    index: usize,
) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| malformed(index, format!("date field '{field}' must be an object")))?;

    if obj.contains_key("literal") || obj.contains_key("raw") {
        record.add_raw_extension(field, value.clone());
        return Ok(());
    }

    let Some(parts_value) = obj.get("date-parts") else {
        record.add_raw_extension(field, value.clone());
        return Ok(());
    };
    let ranges = parts_value.as_array().ok_or_else(|| {
        malformed(index, format!("'date-parts' in '{field}' must be an array"))
    })?;
    let Some(first) = ranges.first() else {
        return Ok(());
    };

    let parts = date_part_integers(field, first, index)?;
    let date = DateParts::from_csl_parts(&parts)
        .map_err(|reason| malformed(index, format!("invalid date in '{field}': {reason}")))?;
    record.set_field(field, FieldValue::Date(date));

    if let Some(end) = ranges.get(1) {
        record.add_raw_extension(&format!("{field}-end"), end.clone());
    }
    Ok(())
}

/// Extract one `date-parts` element as integers.
///
/// Numeric strings are accepted alongside numbers; both shapes occur in CSL
/// data in the wild.
fn date_part_integers(field: &str, element: &Value, index: usize) -> Result<Vec<i64>> {
    let array = element.as_array().ok_or_else(|| {
        malformed(
            index,
            format!("'date-parts' element in '{field}' must be an array"),
        )
    })?;
    array
        .iter()
        .map(|part| {
            part.as_i64()
                .or_else(|| part.as_str().and_then(|s| s.parse().ok()))
                .ok_or_else(|| {
                    malformed(
                        index,
                        format!("non-numeric date part in '{field}': {part}"),
                    )
                })
        })
        .collect()
}

/// Convert a scalar JSON value to field text.
fn scalar_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn malformed(index: usize, reason: impl Into<String>) -> ConvertError {
    ConvertError::MalformedRecord {
        index,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_article() {
        let item = json!({
            "id": "smith2020",
            "type": "article-journal",
            "title": "A Study",
            "author": [{"given": "Jane", "family": "Smith"}],
            "issued": {"date-parts": [[2020, 5]]}
        });

        let record = parse_item(&item).unwrap();
        assert_eq!(record.key, "smith2020");
        assert_eq!(record.entry_type, EntryType::Article);
        assert_eq!(record.text("title"), Some("A Study"));
        assert_eq!(
            record.names("author"),
            Some(&[Name::person("Smith", "Jane")][..])
        );
        assert_eq!(
            record.date("issued"),
            Some(&DateParts::new(2020, Some(5), None).unwrap())
        );
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let item = json!({"type": "book", "title": "No Key"});
        let err = parse_item(&item).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MalformedRecord { index: 0, .. }
        ));
    }

    #[test]
    fn test_missing_type_is_malformed() {
        let item = json!({"id": "x", "title": "No Type"});
        assert!(matches!(
            parse_item(&item).unwrap_err(),
            ConvertError::MalformedRecord { .. }
        ));
    }

    #[test]
    fn test_numeric_key_accepted() {
        let item = json!({"id": 42, "type": "book"});
        let record = parse_item(&item).unwrap();
        assert_eq!(record.key, "42");
    }

    #[test]
    fn test_key_with_bibtex_hostile_characters_rejected() {
        for key in ["has space", "has,comma", "has{brace", "has%percent"] {
            let item = json!({"id": key, "type": "book"});
            assert!(
                parse_item(&item).is_err(),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_unknown_type_maps_to_misc_with_original_type() {
        let item = json!({"id": "d1", "type": "dataset", "title": "Data"});
        let record = parse_item(&item).unwrap();
        assert_eq!(record.entry_type, EntryType::Misc);
        assert_eq!(record.original_type(), Some("dataset"));
    }

    #[test]
    fn test_literal_name_becomes_single_part_entry() {
        let item = json!({
            "id": "acme",
            "type": "report",
            "author": [{"literal": "Acme Corporation"}]
        });
        let record = parse_item(&item).unwrap();
        assert_eq!(
            record.names("author"),
            Some(&[Name::literal("Acme Corporation")][..])
        );
    }

    #[test]
    fn test_name_order_preserved() {
        let item = json!({
            "id": "multi",
            "type": "article-journal",
            "author": [
                {"family": "Zimmer", "given": "Anna"},
                {"family": "Abel"},
                {"literal": "The Consortium"}
            ]
        });
        let record = parse_item(&item).unwrap();
        let names = record.names("author").unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], Name::person("Zimmer", "Anna"));
        assert_eq!(names[1], Name::family("Abel"));
        assert_eq!(names[2], Name::literal("The Consortium"));
    }

    #[test]
    fn test_name_without_family_or_literal_rejected() {
        let item = json!({
            "id": "bad",
            "type": "book",
            "author": [{"given": "Madonna"}]
        });
        assert!(matches!(
            parse_item(&item).unwrap_err(),
            ConvertError::MalformedRecord { .. }
        ));
    }

    #[test]
    fn test_date_range_end_preserved() {
        let item = json!({
            "id": "range",
            "type": "book",
            "issued": {"date-parts": [[2019], [2021]]}
        });
        let record = parse_item(&item).unwrap();
        assert_eq!(record.date("issued"), Some(&DateParts::year(2019)));
        assert_eq!(
            record.raw_extensions.get("issued-end"),
            Some(&json!([2021]))
        );
    }

    #[test]
    fn test_literal_date_preserved_as_extension() {
        let item = json!({
            "id": "han",
            "type": "book",
            "issued": {"literal": "Han Dynasty"}
        });
        let record = parse_item(&item).unwrap();
        assert!(record.date("issued").is_none());
        assert_eq!(
            record.raw_extensions.get("issued"),
            Some(&json!({"literal": "Han Dynasty"}))
        );
    }

    #[test]
    fn test_string_date_parts_accepted() {
        let item = json!({
            "id": "s",
            "type": "book",
            "issued": {"date-parts": [["2020", "5"]]}
        });
        let record = parse_item(&item).unwrap();
        assert_eq!(
            record.date("issued"),
            Some(&DateParts::new(2020, Some(5), None).unwrap())
        );
    }

    #[test]
    fn test_unrecognized_fields_preserved_verbatim() {
        let item = json!({
            "id": "x",
            "type": "book",
            "archive": "The Vault",
            "custom": {"nested": true}
        });
        let record = parse_item(&item).unwrap();
        assert_eq!(
            record.raw_extensions.get("archive"),
            Some(&json!("The Vault"))
        );
        assert_eq!(
            record.raw_extensions.get("custom"),
            Some(&json!({"nested": true}))
        );
    }

    #[test]
    fn test_numeric_volume_stringified() {
        let item = json!({"id": "x", "type": "article-journal", "volume": 12});
        let record = parse_item(&item).unwrap();
        assert_eq!(record.text("volume"), Some("12"));
    }

    #[test]
    fn test_batch_order_preserved() {
        let batch = json!([
            {"id": "c", "type": "book"},
            {"id": "a", "type": "book"},
            {"id": "b", "type": "book"}
        ]);
        let records = parse_batch(&batch).unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_single_item_batch() {
        let item = json!({"id": "solo", "type": "book"});
        let records = parse_batch(&item).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "solo");
    }

    #[test]
    fn test_duplicate_keys_report_both_indices() {
        let batch = json!([
            {"id": "x", "type": "book"},
            {"id": "y", "type": "book"},
            {"id": "x", "type": "article-journal"}
        ]);
        match parse_batch(&batch).unwrap_err() {
            ConvertError::DuplicateKey { key, first, second } => {
                assert_eq!(key, "x");
                assert_eq!(first, 0);
                assert_eq!(second, 2);
            },
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_item_reports_batch_index() {
        let batch = json!([
            {"id": "ok", "type": "book"},
            {"type": "book"}
        ]);
        match parse_batch(&batch).unwrap_err() {
            ConvertError::MalformedRecord { index, .. } => assert_eq!(index, 1),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_str_rejects_invalid_json() {
        assert!(matches!(
            parse_str("not json").unwrap_err(),
            ConvertError::Json(_)
        ));
    }

    #[test]
    fn test_deterministic_given_identical_input() {
        let item = json!({
            "id": "det",
            "type": "article-journal",
            "title": "Same",
            "custom-field": [1, 2, 3]
        });
        assert_eq!(parse_item(&item).unwrap(), parse_item(&item).unwrap());
    }
}
