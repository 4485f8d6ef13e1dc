//! Common test helpers shared across the test suite.

use cslbib::{CitationRecord, DateParts, EntryType, Name};
use serde_json::{json, Value};

/// A complete journal-article record with every expected field present.
pub fn create_article_record() -> CitationRecord {
    CitationRecord::builder("smith2020", EntryType::Article)
        .names_field("author", vec![Name::person("Smith", "Jane")])
        .text_field("title", "A Study")
        .text_field("container-title", "Journal of Studies")
        .text_field("volume", "14")
        .text_field("issue", "2")
        .text_field("page", "101-125")
        .text_field("DOI", "10.1000/182")
        .date_field("issued", DateParts::new(2020, Some(5), None).expect("valid date"))
        .build()
}

/// The same article as [`create_article_record`], as raw CSL-JSON.
#[allow(dead_code)]
pub fn article_csl_json() -> Value {
    json!({
        "id": "smith2020",
        "type": "article-journal",
        "author": [{"given": "Jane", "family": "Smith"}],
        "title": "A Study",
        "container-title": "Journal of Studies",
        "volume": "14",
        "issue": "2",
        "page": "101-125",
        "DOI": "10.1000/182",
        "issued": {"date-parts": [[2020, 5]]}
    })
}

/// A representative record for each entry type in the closed set, with the
/// fields that type expects.
#[allow(dead_code)]
pub fn one_record_per_entry_type() -> Vec<CitationRecord> {
    vec![
        create_article_record(),
        CitationRecord::builder("doe1999", EntryType::Book)
            .names_field("author", vec![Name::person("Doe", "John")])
            .text_field("title", "A Book")
            .text_field("publisher", "Books & Sons")
            .date_field("issued", DateParts::year(1999))
            .build(),
        CitationRecord::builder("lee2005", EntryType::Chapter)
            .names_field("author", vec![Name::person("Lee", "Min")])
            .text_field("title", "A Chapter")
            .text_field("container-title", "The Collected Volume")
            .text_field("publisher", "Octavo Press")
            .date_field("issued", DateParts::year(2005))
            .build(),
        CitationRecord::builder("garcia2017", EntryType::ConferencePaper)
            .names_field(
                "author",
                vec![Name::person("Garcia", "Ana"), Name::person("Chen", "Wei")],
            )
            .text_field("title", "A Paper")
            .text_field("container-title", "Proceedings of the Workshop")
            .date_field("issued", DateParts::new(2017, Some(6), Some(12)).expect("valid date"))
            .build(),
        CitationRecord::builder("novak2011", EntryType::Thesis)
            .names_field("author", vec![Name::person("Novak", "Petra")])
            .text_field("title", "A Thesis")
            .text_field("publisher", "State University")
            .date_field("issued", DateParts::year(2011))
            .build(),
        CitationRecord::builder("acme2023", EntryType::Report)
            .names_field("author", vec![Name::literal("Acme Corporation")])
            .text_field("title", "Annual Report")
            .text_field("publisher", "Acme Corporation")
            .date_field("issued", DateParts::year(2023))
            .build(),
        CitationRecord::builder("docs2024", EntryType::Webpage)
            .text_field("title", "The Documentation")
            .text_field("URL", "https://example.org/docs")
            .date_field("accessed", DateParts::new(2024, Some(1), Some(2)).expect("valid date"))
            .build(),
        CitationRecord::builder("odds2016", EntryType::Misc)
            .text_field("title", "Odds and Ends")
            .text_field("note", "unclassifiable")
            .build(),
    ]
}
