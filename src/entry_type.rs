//! Entry types and the CSL ↔ BibTeX vocabulary crosswalk.
//!
//! This module defines the closed set of bibliographic categories the model
//! supports ([`EntryType`]) and the fixed lookup tables that map between the
//! three vocabularies involved in a conversion:
//!
//! - CSL `type` strings (`article-journal`, `paper-conference`, …)
//! - model entry types (the [`EntryType`] enum)
//! - BibTeX/BibLaTeX entry names (`@article`, `@inproceedings`, …)
//!
//! The tables are round-trip consistent: exporting an entry type and reading
//! it back always yields the same [`EntryType`]. Unknown CSL types are not
//! handled here; the parser maps them to [`EntryType::Misc`] and records the
//! original type string as a raw extension.
//!
//! Field-name crosswalks live here too, because several mappings depend on
//! the entry type (`container-title` becomes `journaltitle` for articles but
//! `booktitle` for chapters and conference papers).

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::exporter::BibFormat;

/// The closed set of bibliographic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Journal, magazine, or newspaper article.
    Article,
    /// Complete monograph.
    Book,
    /// Part of a larger collected volume.
    Chapter,
    /// Paper published in conference proceedings.
    ConferencePaper,
    /// Thesis or dissertation.
    Thesis,
    /// Technical or institutional report.
    Report,
    /// Online resource.
    Webpage,
    /// Anything that fits no other category.
    Misc,
}

/// All entry types, in canonical order.
pub const ALL_ENTRY_TYPES: [EntryType; 8] = [
    EntryType::Article,
    EntryType::Book,
    EntryType::Chapter,
    EntryType::ConferencePaper,
    EntryType::Thesis,
    EntryType::Report,
    EntryType::Webpage,
    EntryType::Misc,
];

lazy_static! {
    /// CSL `type` string → model entry type.
    ///
    /// Several CSL types collapse onto one model type; the canonical CSL name
    /// used when mapping back is [`EntryType::csl_type`].
    static ref CSL_TYPE_MAP: HashMap<&'static str, EntryType> = {
        let mut m = HashMap::new();
        m.insert("article", EntryType::Article);
        m.insert("article-journal", EntryType::Article);
        m.insert("article-magazine", EntryType::Article);
        m.insert("article-newspaper", EntryType::Article);
        m.insert("book", EntryType::Book);
        m.insert("classic", EntryType::Book);
        m.insert("chapter", EntryType::Chapter);
        m.insert("entry", EntryType::Chapter);
        m.insert("entry-dictionary", EntryType::Chapter);
        m.insert("entry-encyclopedia", EntryType::Chapter);
        m.insert("paper-conference", EntryType::ConferencePaper);
        m.insert("thesis", EntryType::Thesis);
        m.insert("report", EntryType::Report);
        m.insert("webpage", EntryType::Webpage);
        m.insert("post", EntryType::Webpage);
        m.insert("post-weblog", EntryType::Webpage);
        m.insert("document", EntryType::Misc);
        m
    };
}

impl EntryType {
    /// Look up the model entry type for a CSL `type` string.
    ///
    /// Returns `None` for CSL types outside the lookup table; the parser
    /// turns those into [`EntryType::Misc`] with an `original-type` raw
    /// extension.
    #[must_use]
    pub fn from_csl(csl_type: &str) -> Option<Self> {
        CSL_TYPE_MAP.get(csl_type).copied()
    }

    /// The canonical CSL `type` string for this entry type.
    #[must_use]
    pub fn csl_type(self) -> &'static str {
        match self {
            EntryType::Article => "article-journal",
            EntryType::Book => "book",
            EntryType::Chapter => "chapter",
            EntryType::ConferencePaper => "paper-conference",
            EntryType::Thesis => "thesis",
            EntryType::Report => "report",
            EntryType::Webpage => "webpage",
            EntryType::Misc => "document",
        }
    }

    /// The BibTeX/BibLaTeX entry name emitted after `@`.
    ///
    /// Legacy BibTeX has no `@online` or generic `@thesis`/`@report`, so the
    /// legacy table falls back to the closest classic name.
    #[must_use]
    pub fn bibtex_type(self, format: BibFormat) -> &'static str {
        match format {
            BibFormat::BibLaTeX => match self {
                EntryType::Article => "article",
                EntryType::Book => "book",
                EntryType::Chapter => "incollection",
                EntryType::ConferencePaper => "inproceedings",
                EntryType::Thesis => "thesis",
                EntryType::Report => "report",
                EntryType::Webpage => "online",
                EntryType::Misc => "misc",
            },
            BibFormat::BibTeX => match self {
                EntryType::Article => "article",
                EntryType::Book => "book",
                EntryType::Chapter => "incollection",
                EntryType::ConferencePaper => "inproceedings",
                EntryType::Thesis => "phdthesis",
                EntryType::Report => "techreport",
                EntryType::Webpage | EntryType::Misc => "misc",
            },
        }
    }

    /// Look up the model entry type for a BibTeX/BibLaTeX entry name.
    ///
    /// Accepts both the BibLaTeX and the legacy vocabulary, case-insensitive.
    #[must_use]
    pub fn from_bibtex(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "article" => Some(EntryType::Article),
            "book" => Some(EntryType::Book),
            "incollection" | "inbook" => Some(EntryType::Chapter),
            "inproceedings" | "conference" => Some(EntryType::ConferencePaper),
            "thesis" | "phdthesis" | "mastersthesis" => Some(EntryType::Thesis),
            "report" | "techreport" => Some(EntryType::Report),
            "online" | "electronic" | "www" => Some(EntryType::Webpage),
            "misc" => Some(EntryType::Misc),
            _ => None,
        }
    }

    /// Fields expected for this entry type, in canonical emission order.
    ///
    /// Missing expected fields are never an error; BibTeX tolerates
    /// incomplete entries. The exporter uses this list to order required
    /// fields first and to produce non-fatal warnings.
    #[must_use]
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            EntryType::Article => &["author", "title", "container-title", "issued"],
            EntryType::Book => &["author", "title", "publisher", "issued"],
            EntryType::Chapter => &[
                "author",
                "title",
                "container-title",
                "publisher",
                "issued",
            ],
            EntryType::ConferencePaper => &["author", "title", "container-title", "issued"],
            EntryType::Thesis | EntryType::Report => {
                &["author", "title", "publisher", "issued"]
            },
            EntryType::Webpage => &["title", "URL"],
            EntryType::Misc => &["title"],
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.csl_type())
    }
}

/// CSL fields holding ordered name lists.
pub const NAME_FIELDS: &[&str] = &["author", "editor", "translator"];

/// CSL fields holding structured dates.
pub const DATE_FIELDS: &[&str] = &["issued", "accessed"];

/// CSL fields holding plain text values recognized by the model.
///
/// Anything not listed here (and not a name or date field) is preserved
/// verbatim in the record's raw extensions.
pub const TEXT_FIELDS: &[&str] = &[
    "title",
    "container-title",
    "collection-title",
    "volume",
    "issue",
    "page",
    "publisher",
    "publisher-place",
    "edition",
    "DOI",
    "URL",
    "ISBN",
    "ISSN",
    "abstract",
    "note",
    "language",
    "genre",
    "keyword",
    "version",
];

/// Canonical field order used when emitting required fields first.
pub const CANONICAL_FIELD_ORDER: &[&str] = &[
    "author",
    "editor",
    "translator",
    "title",
    "container-title",
    "collection-title",
    "edition",
    "volume",
    "issue",
    "page",
    "publisher",
    "publisher-place",
    "issued",
    "accessed",
    "DOI",
    "ISBN",
    "ISSN",
    "URL",
];

/// Map a canonical model field name to its BibTeX field name.
///
/// Date fields (`issued`, `accessed`) are not in this table; their
/// serialization depends on the output format and is handled by the date
/// module. Returns `None` for field names with no crosswalk entry; the
/// exporter then emits the canonical name as-is.
#[must_use]
pub fn field_to_bibtex(
    name: &str,
    entry_type: EntryType,
    format: BibFormat,
) -> Option<&'static str> {
    let biblatex = format == BibFormat::BibLaTeX;
    match name {
        "title" => Some("title"),
        "author" => Some("author"),
        "editor" => Some("editor"),
        "translator" => Some("translator"),
        "container-title" => match entry_type {
            EntryType::Article => Some(if biblatex { "journaltitle" } else { "journal" }),
            _ => Some("booktitle"),
        },
        "collection-title" => Some("series"),
        "volume" => Some("volume"),
        "issue" => Some("number"),
        "page" => Some("pages"),
        "publisher" => match entry_type {
            EntryType::Thesis => Some(if biblatex { "institution" } else { "school" }),
            EntryType::Report => Some("institution"),
            _ => Some("publisher"),
        },
        "publisher-place" => Some(if biblatex { "location" } else { "address" }),
        "edition" => Some("edition"),
        "DOI" => Some("doi"),
        "URL" => Some("url"),
        "ISBN" => Some("isbn"),
        "ISSN" => Some("issn"),
        "abstract" => Some("abstract"),
        "note" => Some("note"),
        "language" => Some("language"),
        "genre" => Some("type"),
        "keyword" => Some("keywords"),
        "version" => Some("version"),
        _ => None,
    }
}

/// Map a BibTeX field name back to its canonical model field name.
///
/// Inverse of [`field_to_bibtex`] over both output vocabularies. Date-bearing
/// fields (`date`, `year`, `month`, `urldate`) are handled by the reader
/// directly and are absent here.
#[must_use]
pub fn field_from_bibtex(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "title" => Some("title"),
        "author" => Some("author"),
        "editor" => Some("editor"),
        "translator" => Some("translator"),
        "journaltitle" | "journal" | "booktitle" => Some("container-title"),
        "series" => Some("collection-title"),
        "volume" => Some("volume"),
        "number" => Some("issue"),
        "pages" => Some("page"),
        "publisher" | "school" | "institution" => Some("publisher"),
        "location" | "address" => Some("publisher-place"),
        "edition" => Some("edition"),
        "doi" => Some("DOI"),
        "url" => Some("URL"),
        "isbn" => Some("ISBN"),
        "issn" => Some("ISSN"),
        "abstract" => Some("abstract"),
        "note" => Some("note"),
        "language" => Some("language"),
        "type" => Some("genre"),
        "keywords" => Some("keyword"),
        "version" => Some("version"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csl_lookup_known_types() {
        assert_eq!(
            EntryType::from_csl("article-journal"),
            Some(EntryType::Article)
        );
        assert_eq!(
            EntryType::from_csl("paper-conference"),
            Some(EntryType::ConferencePaper)
        );
        assert_eq!(EntryType::from_csl("webpage"), Some(EntryType::Webpage));
    }

    #[test]
    fn test_csl_lookup_unknown_type() {
        assert_eq!(EntryType::from_csl("dataset"), None);
        assert_eq!(EntryType::from_csl(""), None);
    }

    #[test]
    fn test_csl_canonical_name_maps_back() {
        for entry_type in ALL_ENTRY_TYPES {
            assert_eq!(
                EntryType::from_csl(entry_type.csl_type()),
                Some(entry_type),
                "canonical CSL name for {entry_type:?} must map back"
            );
        }
    }

    #[test]
    fn test_biblatex_names_round_trip() {
        for entry_type in ALL_ENTRY_TYPES {
            let name = entry_type.bibtex_type(BibFormat::BibLaTeX);
            assert_eq!(
                EntryType::from_bibtex(name),
                Some(entry_type),
                "BibLaTeX name '{name}' must map back to {entry_type:?}"
            );
        }
    }

    #[test]
    fn test_from_bibtex_case_insensitive() {
        assert_eq!(EntryType::from_bibtex("ARTICLE"), Some(EntryType::Article));
        assert_eq!(
            EntryType::from_bibtex("InProceedings"),
            Some(EntryType::ConferencePaper)
        );
    }

    #[test]
    fn test_required_fields_in_canonical_order() {
        for entry_type in ALL_ENTRY_TYPES {
            let required = entry_type.required_fields();
            let positions: Vec<usize> = required
                .iter()
                .map(|f| {
                    CANONICAL_FIELD_ORDER
                        .iter()
                        .position(|c| c == f)
                        .unwrap_or_else(|| panic!("{f} missing from canonical order"))
                })
                .collect();
            let mut sorted = positions.clone();
            sorted.sort_unstable();
            assert_eq!(positions, sorted, "{entry_type:?} required fields unordered");
        }
    }

    #[test]
    fn test_container_title_depends_on_entry_type() {
        assert_eq!(
            field_to_bibtex("container-title", EntryType::Article, BibFormat::BibLaTeX),
            Some("journaltitle")
        );
        assert_eq!(
            field_to_bibtex("container-title", EntryType::Article, BibFormat::BibTeX),
            Some("journal")
        );
        assert_eq!(
            field_to_bibtex("container-title", EntryType::Chapter, BibFormat::BibLaTeX),
            Some("booktitle")
        );
    }

    #[test]
    fn test_field_crosswalk_round_trips() {
        for entry_type in ALL_ENTRY_TYPES {
            for name in TEXT_FIELDS.iter().chain(NAME_FIELDS) {
                let Some(bibtex) = field_to_bibtex(name, entry_type, BibFormat::BibLaTeX) else {
                    continue;
                };
                assert_eq!(
                    field_from_bibtex(bibtex),
                    Some(*name),
                    "{name} → {bibtex} must map back"
                );
            }
        }
    }

    #[test]
    fn test_thesis_publisher_maps_to_school() {
        assert_eq!(
            field_to_bibtex("publisher", EntryType::Thesis, BibFormat::BibTeX),
            Some("school")
        );
        assert_eq!(
            field_to_bibtex("publisher", EntryType::Report, BibFormat::BibLaTeX),
            Some("institution")
        );
    }
}
