//! Dynamic, JSON-shaped records.
//!
//! A [`Record`] is what the record source hands over when no typed domain
//! struct exists: a flat map of field names to scalar values (or tag lists).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::Queryable;
use crate::value::{Number, Value};

/// Owned field value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit `null`.
    Null,
    /// Boolean flag such as `verified`.
    Bool(bool),
    /// Any JSON number.
    Number(f64),
    /// Free text, including ISO timestamps.
    Text(String),
    /// List of strings, such as `tags`.
    List(Vec<String>),
}

impl FieldValue {
    /// Borrows this value as a [`Value`].
    pub fn as_value(&self) -> Value<'_> {
        match self {
            FieldValue::Null => Value::None,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(Number::F64(*n)),
            FieldValue::Text(s) => Value::String(s),
            FieldValue::List(items) => Value::List(items),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// An immutable listing or resource record.
///
/// ```
/// use mypup_query::{Record, Queryable, Value};
///
/// let record = Record::new()
///     .with("breed", "Beagle")
///     .with("price", 300);
///
/// assert_eq!(record.field_value("breed"), Value::String("Beagle"));
/// assert!(record.field_value("color").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Record::default()
    }

    /// Returns the record with `field` set to `value`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns the stored value of a field.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decodes a JSON array of records.
    pub fn list_from_json(json: &str) -> Result<Vec<Record>> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Queryable for Record {
    fn field_value(&self, field: &str) -> Value<'_> {
        self.fields
            .get(field)
            .map(FieldValue::as_value)
            .unwrap_or(Value::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mixed_json() {
        let records = Record::list_from_json(
            r#"[
                {"id": 1, "breed": "Beagle", "price": 300, "verified": true,
                 "tags": ["family", "small"], "color": null}
            ]"#,
        )
        .unwrap();

        let record = &records[0];
        assert_eq!(record.get("id"), Some(&FieldValue::Number(1.0)));
        assert_eq!(record.field_value("breed"), Value::String("Beagle"));
        assert_eq!(record.field_value("verified"), Value::Bool(true));
        assert_eq!(record.get("color"), Some(&FieldValue::Null));
        assert!(record.field_value("color").is_none());
        assert!(record.field_value("missing").is_none());
        assert_eq!(
            record.get("tags"),
            Some(&FieldValue::List(vec!["family".into(), "small".into()]))
        );
    }

    #[test]
    fn rejects_non_array_input() {
        assert!(Record::list_from_json(r#"{"breed": "Beagle"}"#).is_err());
    }

    #[test]
    fn builder_and_iteration() {
        let record = Record::new().with("b", 2).with("a", "x");
        let names: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(record.len(), 2);
        assert!(!record.is_empty());
    }

    #[test]
    fn round_trips_through_json() {
        let record = Record::new().with("breed", "Poodle").with("price", 900);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"breed":"Poodle","price":900.0}"#);
    }
}
