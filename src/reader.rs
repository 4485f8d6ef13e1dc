//! Reading BibTeX text back into citation records.
//!
//! This module is the best-effort inverse of the
//! [`exporter`](crate::exporter): it parses `@entrytype{key, field = {value},
//! …}` blocks into [`CitationRecord`]s, resolving the field-name crosswalk,
//! name lists, dates (both `date = {YYYY-MM-DD}` and legacy `year`/`month`),
//! value unescaping, and the `%` extension comments the exporter emits after
//! each block.
//!
//! It is not a general-purpose BibTeX parser — `@string` macros, crossrefs
//! and concatenation are out of scope — but it round-trips everything the
//! exporter produces, which is what the conversion pipeline needs for
//! verification.
//!
//! # Examples
//!
//! ```ignore
//! use cslbib::reader;
//!
//! let records = reader::parse_bibtex("@book{doe1999,\n    title = {A Book}\n}\n")?;
//! assert_eq!(records[0].key, "doe1999");
//! # Ok::<(), cslbib::ConvertError>(())
//! ```

use serde_json::Value;

use crate::date::{month_from_macro, DateParts};
use crate::entry_type::{field_from_bibtex, EntryType, NAME_FIELDS};
use crate::error::{ConvertError, Result};
use crate::escape::unescape;
use crate::record::{CitationRecord, FieldValue, Name, NameList};
use crate::validation;

/// Parse BibTeX source text into records, in source order.
///
/// # Errors
///
/// Returns [`ConvertError::Syntax`] for text that does not follow the
/// exporter's output shape, and
/// [`ConvertError::UnsupportedEntryType`] for an `@` name outside both the
/// BibLaTeX and legacy vocabularies. Duplicate citation keys are rejected
/// with [`ConvertError::DuplicateKey`].
pub fn parse_bibtex(input: &str) -> Result<Vec<CitationRecord>> {
    let mut scanner = Scanner::new(input);
    let mut records: Vec<CitationRecord> = Vec::new();

    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            None => break,
            Some('%') => {
                let line = scanner.read_line();
                attach_comment(records.last_mut(), line);
            },
            Some('@') => records.push(parse_entry(&mut scanner)?),
            Some(c) => {
                return Err(ConvertError::Syntax(format!(
                    "unexpected character '{c}' at top level"
                )));
            },
        }
    }

    validation::check_unique_keys(&records)?;
    Ok(records)
}

/// Character scanner over the input text.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(ConvertError::Syntax(format!(
                "expected '{expected}', found '{c}'"
            ))),
            None => Err(ConvertError::Syntax(format!(
                "expected '{expected}', found end of input"
            ))),
        }
    }

    fn read_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn read_line(&mut self) -> &'a str {
        let line = self.read_while(|c| c != '\n');
        self.bump();
        line
    }

    /// Read a `{…}`-balanced value, returning the content between the
    /// outermost braces. Escaped braces (`\{`, `\}`) do not affect nesting.
    fn read_braced(&mut self) -> Result<String> {
        self.expect('{')?;
        let mut out = String::new();
        let mut depth = 1usize;
        loop {
            match self.bump() {
                None => return Err(ConvertError::Syntax("unterminated braced value".to_string())),
                Some('\\') => {
                    out.push('\\');
                    if let Some(escaped) = self.bump() {
                        out.push(escaped);
                    }
                },
                Some('{') => {
                    depth += 1;
                    out.push('{');
                },
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push('}');
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// Read a `"…"`-quoted value.
    fn read_quoted(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ConvertError::Syntax("unterminated quoted value".to_string())),
                Some('\\') => {
                    out.push('\\');
                    if let Some(escaped) = self.bump() {
                        out.push(escaped);
                    }
                },
                Some('"') => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }
}

/// Parse one `@entrytype{key, …}` block.
fn parse_entry(scanner: &mut Scanner<'_>) -> Result<CitationRecord> {
    scanner.expect('@')?;
    let type_name = scanner.read_while(|c| c.is_ascii_alphanumeric());
    let entry_type = EntryType::from_bibtex(type_name).ok_or_else(|| {
        ConvertError::UnsupportedEntryType {
            name: type_name.to_string(),
        }
    })?;

    scanner.skip_whitespace();
    scanner.expect('{')?;
    scanner.skip_whitespace();
    let key = scanner.read_while(|c| c != ',' && c != '}' && !c.is_whitespace());
    if key.is_empty() {
        return Err(ConvertError::Syntax("entry without citation key".to_string()));
    }
    let key = key.to_string();

    let mut raw_fields: Vec<(String, String)> = Vec::new();
    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            Some('}') => {
                scanner.bump();
                break;
            },
            Some(',') => {
                scanner.bump();
            },
            None => {
                return Err(ConvertError::Syntax(format!(
                    "unterminated entry '{key}'"
                )));
            },
            Some(_) => {
                let name = scanner
                    .read_while(|c| c != '=' && c != ',' && c != '}' && !c.is_whitespace())
                    .to_ascii_lowercase();
                scanner.skip_whitespace();
                scanner.expect('=')?;
                scanner.skip_whitespace();
                let value = match scanner.peek() {
                    Some('{') => scanner.read_braced()?,
                    Some('"') => scanner.read_quoted()?,
                    _ => scanner
                        .read_while(|c| c != ',' && c != '}' && c != '\n')
                        .trim()
                        .to_string(),
                };
                raw_fields.push((name, value));
            },
        }
    }

    build_record(&key, entry_type, raw_fields)
}

/// Assemble a record from the tokenized fields of one entry.
fn build_record(
    key: &str,
    entry_type: EntryType,
    raw_fields: Vec<(String, String)>,
) -> Result<CitationRecord> {
    let mut record = CitationRecord::new(key, entry_type);
    let mut legacy_year: Option<i32> = None;
    let mut legacy_month: Option<u8> = None;

    for (name, value) in raw_fields {
        match name.as_str() {
            "date" => {
                let date = DateParts::from_biblatex(&value).ok_or_else(|| {
                    ConvertError::Syntax(format!("invalid date value '{value}' in '{key}'"))
                })?;
                record.set_field("issued", FieldValue::Date(date));
            },
            "urldate" => {
                let date = DateParts::from_biblatex(&value).ok_or_else(|| {
                    ConvertError::Syntax(format!("invalid urldate value '{value}' in '{key}'"))
                })?;
                record.set_field("accessed", FieldValue::Date(date));
            },
            "year" => {
                legacy_year = Some(value.trim().parse().map_err(|_| {
                    ConvertError::Syntax(format!("invalid year value '{value}' in '{key}'"))
                })?);
            },
            "month" => {
                legacy_month = month_from_macro(value.trim())
                    .or_else(|| value.trim().parse().ok());
                if legacy_month.is_none() {
                    return Err(ConvertError::Syntax(format!(
                        "invalid month value '{value}' in '{key}'"
                    )));
                }
            },
            _ if NAME_FIELDS.contains(&name.as_str()) => {
                let names = parse_name_list(&value);
                record.set_field(&name, FieldValue::Names(names));
            },
            _ => {
                let canonical = field_from_bibtex(&name).unwrap_or(name.as_str());
                record.set_text(canonical, &unescape(&value));
            },
        }
    }

    if !record.has_field("issued") {
        if let Some(year) = legacy_year {
            let date = DateParts::new(year, legacy_month, None)
                .map_err(|reason| ConvertError::Syntax(format!("in '{key}': {reason}")))?;
            record.set_field("issued", FieldValue::Date(date));
        }
    }
    Ok(record)
}

/// Split a serialized name list on top-level ` and ` separators and build
/// the model names.
fn parse_name_list(value: &str) -> NameList {
    split_top_level(value, " and ")
        .into_iter()
        .map(|part| parse_name(part.trim()))
        .collect()
}

/// Parse one serialized name: `{Literal}`, `family, given`, or `family`.
fn parse_name(part: &str) -> Name {
    if let Some(inner) = braced_whole(part) {
        return Name::Literal(unescape(inner));
    }
    match split_top_level(part, ", ").as_slice() {
        [family] => Name::Person {
            family: unescape(family),
            given: None,
        },
        [family, rest @ ..] => Name::Person {
            family: unescape(family),
            given: Some(unescape(&rest.join(", "))),
        },
        [] => Name::Literal(String::new()),
    }
}

/// If the whole token is a single brace group, return its content.
fn braced_whole(part: &str) -> Option<&str> {
    let inner = part.strip_prefix('{')?.strip_suffix('}')?;
    // Reject `{a}, {b}`-style tokens where the braces are not one group.
    let mut depth = 0i32;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            },
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            },
            _ => {},
        }
    }
    (depth == 0).then_some(inner)
}

/// Split on a separator, ignoring occurrences inside brace groups or after
/// a backslash escape.
fn split_top_level<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    let sep_first = separator.as_bytes()[0];
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    let bytes = value.as_bytes();
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b if depth == 0 && b == sep_first && value[i..].starts_with(separator) => {
                parts.push(&value[start..i]);
                i += separator.len();
                start = i;
                continue;
            },
            _ => {},
        }
        i += 1;
    }
    parts.push(&value[start..]);
    parts
}

/// Attach an exporter-style `% name: value` comment line to the preceding
/// record's raw extensions. Other comment lines are ignored.
fn attach_comment(record: Option<&mut CitationRecord>, line: &str) {
    let Some(record) = record else { return };
    let Some(body) = line.strip_prefix('%') else { return };
    let Some((name, value)) = body.trim_start().split_once(": ") else {
        return;
    };
    let value = serde_json::from_str::<Value>(value)
        .unwrap_or_else(|_| Value::String(value.to_string()));
    record.add_raw_extension(name, value);
}
