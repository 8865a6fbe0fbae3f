//! Compiled filter clauses.
//!
//! A [`Clause`] is one non-wildcard filter entry after it has been resolved
//! against a profile: the record field to read and the test to apply.

use crate::traits::Queryable;
use crate::value::Value;

/// Test applied to a single record field.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseTest {
    /// Field equals the text (or, for list fields, contains it).
    EqualsText(String),
    /// Field equals the number.
    EqualsNumber(f64),
    /// Field equals the boolean.
    EqualsBool(bool),
    /// Field equals any of the given texts.
    OneOf(Vec<String>),
    /// Field is truthy.
    Truthy,
    /// Field is a number within `[min, max]` inclusive.
    Within { min: f64, max: f64 },
    /// Never matches. Malformed filter values compile into this.
    Reject,
}

/// A single compiled filter predicate.
///
/// ```
/// use mypup_query::{Clause, ClauseTest, Record};
///
/// let clause = Clause::new("priceRange", "price", ClauseTest::Within { min: 0.0, max: 1000.0 });
/// assert!(clause.matches(&Record::new().with("price", 500)));
/// assert!(!clause.matches(&Record::new()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The filter key this clause came from.
    pub key: String,
    /// The record field to test.
    pub field: String,
    /// The test to apply.
    pub test: ClauseTest,
}

impl Clause {
    /// Creates a new clause.
    pub fn new(key: impl Into<String>, field: impl Into<String>, test: ClauseTest) -> Self {
        Clause {
            key: key.into(),
            field: field.into(),
            test,
        }
    }

    /// Evaluates this clause against a record.
    pub fn matches<T: Queryable + ?Sized>(&self, record: &T) -> bool {
        self.matches_value(&record.field_value(&self.field))
    }

    /// Evaluates this clause against an already extracted field value.
    ///
    /// Absent fields and type mismatches never match.
    pub fn matches_value(&self, value: &Value<'_>) -> bool {
        match (&self.test, value) {
            (ClauseTest::Reject, _) => false,
            (ClauseTest::Truthy, v) => v.is_truthy(),
            (_, Value::None) => false,

            (ClauseTest::EqualsText(expected), Value::String(s)) => s == expected,
            (ClauseTest::EqualsText(expected), Value::List(items)) => {
                items.iter().any(|item| item == expected)
            }
            (ClauseTest::OneOf(options), Value::String(s)) => options.iter().any(|o| o == s),
            (ClauseTest::OneOf(options), Value::List(items)) => {
                items.iter().any(|item| options.contains(item))
            }
            (ClauseTest::EqualsNumber(expected), Value::Number(n)) => n.to_f64() == *expected,
            (ClauseTest::EqualsBool(expected), Value::Bool(b)) => b == expected,

            (ClauseTest::Within { min, max }, v) => match v.to_f64() {
                Some(n) => *min <= n && n <= *max,
                None => false,
            },

            _ => false,
        }
    }
}
