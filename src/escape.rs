//! LaTeX escaping and the Unicode safe-set policy.
//!
//! Escaping is applied only at export time; the model always holds unescaped
//! values. Two rules apply to every emitted string value:
//!
//! 1. The LaTeX metacharacters `{ } \ % & _ # $` are escaped per LaTeX
//!    convention (`\{`, `\%`, …, with `\` itself becoming
//!    `\textbackslash{}`).
//! 2. Characters outside the configured [`SafeSet`] are wrapped in
//!    protective braces (`{é}`) rather than transliterated, preserving
//!    fidelity without silent data loss.
//!
//! Values are NFC-normalized before the scan so that the safe-set decision
//! and the emitted bytes are stable across equivalent Unicode spellings.
//!
//! [`unescape`] inverts the transformation for the BibTeX reader.

use unicode_normalization::UnicodeNormalization;

/// The set of characters a value may contain unprotected.
///
/// Anything outside the set is wrapped in protective braces on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafeSet {
    /// ASCII only; everything else is brace-protected. The default, safe for
    /// any downstream BibTeX consumer.
    #[default]
    Ascii,
    /// ASCII plus Latin-1 supplement characters pass through.
    Latin1,
    /// Every character passes through unprotected; for UTF-8-native
    /// consumers such as BibLaTeX with biber.
    All,
}

impl SafeSet {
    /// Whether a character may be emitted without protective braces.
    #[must_use]
    pub fn is_safe(self, c: char) -> bool {
        match self {
            SafeSet::Ascii => c.is_ascii(),
            SafeSet::Latin1 => (c as u32) < 0x100,
            SafeSet::All => true,
        }
    }
}

/// Escape a field value for emission inside a braced BibTeX value.
#[must_use]
pub fn escape(value: &str, safe_set: SafeSet) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.nfc() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '%' => out.push_str("\\%"),
            '&' => out.push_str("\\&"),
            '_' => out.push_str("\\_"),
            '#' => out.push_str("\\#"),
            '$' => out.push_str("\\$"),
            c if safe_set.is_safe(c) => out.push(c),
            c => {
                out.push('{');
                out.push(c);
                out.push('}');
            },
        }
    }
    out
}

/// Invert [`escape`]: recover the original value from escaped BibTeX text.
///
/// Backslash escapes are resolved, `\textbackslash{}` becomes `\`, and bare
/// (structural or protective) braces are dropped. Unknown LaTeX commands are
/// kept verbatim so foreign input is not corrupted.
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix("\\textbackslash{}") {
            out.push('\\');
            rest = stripped;
            continue;
        }
        if let Some(stripped) = rest.strip_prefix("\\textbackslash") {
            out.push('\\');
            rest = stripped;
            continue;
        }
        if let Some(stripped) = rest.strip_prefix('\\') {
            match stripped.chars().next() {
                Some(c) if "{}%&_#$".contains(c) => {
                    out.push(c);
                    rest = &stripped[c.len_utf8()..];
                },
                Some(c) => {
                    // Unknown command; keep the backslash and move on.
                    out.push('\\');
                    out.push(c);
                    rest = &stripped[c.len_utf8()..];
                },
                None => {
                    out.push('\\');
                    rest = stripped;
                },
            }
            continue;
        }
        let c = rest.chars().next().expect("rest is non-empty");
        if c != '{' && c != '}' {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}
