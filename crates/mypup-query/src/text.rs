//! Free-text search stage.

use crate::traits::Queryable;
use crate::value::Value;

/// Returns `true` if `term` occurs, case-insensitively, in any of `fields`.
///
/// An empty or whitespace-only term matches everything. Absent and
/// non-text fields are treated as the empty string; list fields match if any
/// element contains the term.
///
/// ```
/// use mypup_query::{text_matches, Record};
///
/// let dog = Record::new().with("dog_name", "Biscuit").with("breed", "Beagle");
/// assert!(text_matches(&dog, "beag", &["dog_name", "breed"]));
/// assert!(!text_matches(&dog, "poodle", &["dog_name", "breed"]));
/// assert!(text_matches(&dog, "   ", &["dog_name"]));
/// ```
pub fn text_matches<T, S>(record: &T, term: &str, fields: &[S]) -> bool
where
    T: Queryable + ?Sized,
    S: AsRef<str>,
{
    match normalize_term(term) {
        Some(needle) => contains_term(record, &needle, fields),
        None => true,
    }
}

/// Lower-cases a search term, or returns `None` when it filters nothing.
pub fn normalize_term(term: &str) -> Option<String> {
    if term.trim().is_empty() {
        None
    } else {
        Some(term.to_lowercase())
    }
}

/// Matches an already-normalized, non-empty needle against `fields`.
pub(crate) fn contains_term<T, S>(record: &T, needle: &str, fields: &[S]) -> bool
where
    T: Queryable + ?Sized,
    S: AsRef<str>,
{
    fields
        .iter()
        .any(|field| match record.field_value(field.as_ref()) {
            Value::String(s) => s.to_lowercase().contains(needle),
            Value::List(items) => items.iter().any(|s| s.to_lowercase().contains(needle)),
            _ => false,
        })
}
