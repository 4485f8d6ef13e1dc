//! Record completeness and batch invariant checking.
//!
//! Completeness is advisory: BibTeX tolerates incomplete entries, so a
//! missing-but-expected field is a warning, never an error. Key uniqueness
//! is a hard model invariant and is enforced wherever a batch is formed.

use std::collections::HashMap;

use crate::error::{ConvertError, Result};
use crate::record::CitationRecord;

/// Expected fields the record does not carry, in canonical order.
///
/// The expectation comes from the record's entry type (see
/// [`EntryType::required_fields`](crate::EntryType::required_fields)).
#[must_use]
pub fn missing_fields(record: &CitationRecord) -> Vec<&'static str> {
    record
        .entry_type
        .required_fields()
        .iter()
        .filter(|name| !record.has_field(name))
        .copied()
        .collect()
}

/// Verify that citation keys are unique within a batch.
///
/// # Errors
///
/// Returns [`ConvertError::DuplicateKey`] naming the colliding key and both
/// batch positions.
pub fn check_unique_keys(records: &[CitationRecord]) -> Result<()> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        if let Some(&first) = seen.get(record.key.as_str()) {
            return Err(ConvertError::DuplicateKey {
                key: record.key.clone(),
                first,
                second: index,
            });
        }
        seen.insert(&record.key, index);
    }
    Ok(())
}
