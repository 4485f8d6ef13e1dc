//! Round-trip tests: export to BibTeX, parse back, compare records.
//!
//! Record comparison is order-insensitive over fields (the exporter reorders
//! required fields first), which is exactly the round-trip contract: equal
//! modulo field order and whitespace.

mod common;

use cslbib::{exporter, parser, reader, CitationRecord, EntryType, ExportConfig};

fn round_trip(record: &CitationRecord) -> CitationRecord {
    let bibtex = exporter::export_record(record, &ExportConfig::new()).expect("export failed");
    let mut records = reader::parse_bibtex(&bibtex).expect("reparse failed");
    assert_eq!(records.len(), 1, "expected one entry in:\n{bibtex}");
    records.remove(0)
}

#[test]
fn test_round_trip_every_entry_type() {
    for record in common::one_record_per_entry_type() {
        let reparsed = round_trip(&record);
        assert_eq!(reparsed, record, "round trip changed {}", record.key);
    }
}

#[test]
fn test_round_trip_batch_preserves_order_and_content() {
    let records = common::one_record_per_entry_type();
    let bibtex = exporter::export_records(&records, &ExportConfig::new()).expect("export failed");
    let reparsed = reader::parse_bibtex(&bibtex).expect("reparse failed");
    assert_eq!(reparsed, records);
}

#[test]
fn test_round_trip_from_csl_json() {
    let parsed = parser::parse_item(&common::article_csl_json()).expect("parse failed");
    assert_eq!(parsed, common::create_article_record());
    assert_eq!(round_trip(&parsed), parsed);
}

#[test]
fn test_round_trip_preserves_raw_extensions() {
    let record = CitationRecord::builder("d1", EntryType::Misc)
        .text_field("title", "Data")
        .raw_extension("original-type", serde_json::json!("dataset"))
        .raw_extension("issued-end", serde_json::json!([2021]))
        .build();

    assert_eq!(round_trip(&record), record);
}

#[test]
fn test_round_trip_escaped_values() {
    let record = CitationRecord::builder("tricky", EntryType::Misc)
        .text_field("title", "100% of {braced} text_with_underscores & #tags")
        .text_field("note", "cost: $40 \\ change")
        .build();

    assert_eq!(round_trip(&record), record);
}

#[test]
fn test_round_trip_unicode_brace_protection() {
    let record = CitationRecord::builder("uni", EntryType::Misc)
        .text_field("title", "Über Grüße from Reykjavík")
        .build();

    assert_eq!(round_trip(&record), record);
}

#[test]
fn test_round_trip_name_shapes() {
    use cslbib::Name;

    let record = CitationRecord::builder("names", EntryType::Article)
        .names_field(
            "author",
            vec![
                Name::person("García Márquez", "Gabriel"),
                Name::family("Plato"),
                Name::literal("Food and Drug Administration"),
            ],
        )
        .names_field("editor", vec![Name::person("Editor", "Ed")])
        .build();

    assert_eq!(round_trip(&record), record);
}
