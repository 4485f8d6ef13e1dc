//! Structured date parts and their serialization.
//!
//! CSL carries dates as nested `date-parts` integer sequences; BibLaTeX wants
//! `date = {YYYY-MM-DD}` (possibly partial), legacy BibTeX wants a `year`
//! field plus a three-letter `month` macro. [`DateParts`] is the
//! format-neutral middle: a year with optional month and day, validated so
//! the parts are internally consistent (a day never appears without a month).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-letter month macros in the order BibTeX defines them.
pub const MONTH_MACROS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A structured date: year with optional month and day.
///
/// The month is only meaningful when a year is present (guaranteed
/// structurally) and the day only when a month is present (validated at
/// construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    /// Calendar year; negative values denote BCE.
    pub year: i32,
    /// Month of year, 1–12.
    pub month: Option<u8>,
    /// Day of month, 1–31.
    pub day: Option<u8>,
}

impl DateParts {
    /// Create a year-only date.
    #[must_use]
    pub fn year(year: i32) -> Self {
        DateParts {
            year,
            month: None,
            day: None,
        }
    }

    /// Create a date from explicit parts, enforcing internal consistency.
    ///
    /// # Errors
    ///
    /// Returns a description of the inconsistency if the month is outside
    /// 1–12, the day is outside 1–31, or a day is supplied without a month.
    pub fn new(year: i32, month: Option<u8>, day: Option<u8>) -> Result<Self, String> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(format!("month {m} out of range 1-12"));
            }
        }
        if let Some(d) = day {
            if month.is_none() {
                return Err("day supplied without month".to_string());
            }
            if !(1..=31).contains(&d) {
                return Err(format!("day {d} out of range 1-31"));
            }
        }
        Ok(DateParts { year, month, day })
    }

    /// Build a date from one CSL `date-parts` element (`[year]`,
    /// `[year, month]` or `[year, month, day]`).
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the sequence is empty, longer
    /// than three elements, or holds out-of-range values.
    pub fn from_csl_parts(parts: &[i64]) -> Result<Self, String> {
        match *parts {
            [] => Err("empty date-parts sequence".to_string()),
            [year] => Ok(DateParts::year(int_to_year(year)?)),
            [year, month] => DateParts::new(int_to_year(year)?, Some(int_to_unit(month)?), None),
            [year, month, day] => DateParts::new(
                int_to_year(year)?,
                Some(int_to_unit(month)?),
                Some(int_to_unit(day)?),
            ),
            _ => Err(format!("date-parts sequence has {} elements", parts.len())),
        }
    }

    /// Serialize to the BibLaTeX `date` value: `YYYY`, `YYYY-MM` or
    /// `YYYY-MM-DD`.
    #[must_use]
    pub fn to_biblatex(&self) -> String {
        match (self.month, self.day) {
            (Some(m), Some(d)) => format!("{:04}-{m:02}-{d:02}", self.year),
            (Some(m), None) => format!("{:04}-{m:02}", self.year),
            _ => format!("{:04}", self.year),
        }
    }

    /// The BibTeX month macro for this date, if a month is present.
    #[must_use]
    pub fn month_macro(&self) -> Option<&'static str> {
        self.month.map(|m| MONTH_MACROS[usize::from(m) - 1])
    }

    /// Parse a BibLaTeX `date` value back into parts.
    ///
    /// Accepts `YYYY`, `YYYY-MM` and `YYYY-MM-DD`, with an optional leading
    /// `-` for BCE years. Returns `None` for anything else.
    #[must_use]
    pub fn from_biblatex(value: &str) -> Option<Self> {
        let value = value.trim();
        let (negative, rest) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let mut parts = rest.split('-');
        let year: i32 = parts.next()?.parse().ok()?;
        let year = if negative { -year } else { year };
        let month: Option<u8> = match parts.next() {
            Some(m) => Some(m.parse().ok()?),
            None => None,
        };
        let day: Option<u8> = match parts.next() {
            Some(d) => Some(d.parse().ok()?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }
        DateParts::new(year, month, day).ok()
    }
}

impl fmt::Display for DateParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_biblatex())
    }
}

/// Resolve a month macro name back to its number.
#[must_use]
pub fn month_from_macro(name: &str) -> Option<u8> {
    let lower = name.to_ascii_lowercase();
    MONTH_MACROS
        .iter()
        .position(|m| *m == lower)
        .and_then(|i| u8::try_from(i + 1).ok())
}

fn int_to_year(value: i64) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("year {value} out of range"))
}

fn int_to_unit(value: i64) -> Result<u8, String> {
    u8::try_from(value).map_err(|_| format!("date part {value} out of range"))
}
