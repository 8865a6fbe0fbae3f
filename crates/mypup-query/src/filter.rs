//! Structured filters and the predicate builder.
//!
//! A [`FilterSpec`] is the UI's filter state: a map from filter key to the
//! selected [`FilterValue`]. [`build_predicate`] resolves each entry against
//! a [`QueryProfile`] and compiles the non-wildcard entries into a
//! [`Predicate`], the conjunction of their [`Clause`]s.
//!
//! Wildcards (and therefore omitted from the predicate):
//!
//! | Rule | Wildcard values |
//! |------|-----------------|
//! | exact | `null`, `""`, `"Any"`, `"All"`, one-word `"All <X>"`, empty list |
//! | flag | `null`, `false` |
//! | range | `null`, `[null, null]`, the rule's configured default |
//! | min / max | `null` |
//!
//! Values of the wrong shape for their rule compile into a rejecting clause,
//! so a half-initialized filter panel hides records instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clause::{Clause, ClauseTest};
use crate::error::{QueryError, Result};
use crate::profile::{FilterRule, QueryProfile};
use crate::traits::Queryable;

/// A single filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// No selection.
    Null,
    /// Toggle state.
    Bool(bool),
    /// Numeric selection, used by min/max rules.
    Number(f64),
    /// Text selection, used by exact and text rules.
    Text(String),
    /// `[min, max]` range; either bound may be absent.
    Range(Option<f64>, Option<f64>),
    /// Multi-select list.
    List(Vec<String>),
    /// Anything else the UI sent.
    Other(serde_json::Value),
}

impl FilterValue {
    /// Creates a closed range value.
    pub fn range(min: f64, max: f64) -> Self {
        FilterValue::Range(Some(min), Some(max))
    }

    /// Parses the value half of a `key=value` expression.
    ///
    /// ```
    /// use mypup_query::FilterValue;
    ///
    /// assert_eq!(FilterValue::parse_value("true"), FilterValue::Bool(true));
    /// assert_eq!(FilterValue::parse_value("3"), FilterValue::Number(3.0));
    /// assert_eq!(FilterValue::parse_value("300..900"), FilterValue::range(300.0, 900.0));
    /// assert_eq!(FilterValue::parse_value("..900"), FilterValue::Range(None, Some(900.0)));
    /// assert_eq!(
    ///     FilterValue::parse_value("Beagle,Poodle"),
    ///     FilterValue::List(vec!["Beagle".into(), "Poodle".into()])
    /// );
    /// assert_eq!(FilterValue::parse_value("Golden Retriever"), FilterValue::Text("Golden Retriever".into()));
    /// ```
    pub fn parse_value(raw: &str) -> FilterValue {
        let raw = raw.trim();
        match raw {
            "" => return FilterValue::Null,
            "true" => return FilterValue::Bool(true),
            "false" => return FilterValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return FilterValue::Number(n);
            }
        }
        if let Some((lo, hi)) = raw.split_once("..") {
            let bound = |s: &str| -> std::result::Result<Option<f64>, ()> {
                let s = s.trim();
                if s.is_empty() {
                    Ok(None)
                } else {
                    s.parse::<f64>().map(Some).map_err(|_| ())
                }
            };
            if let (Ok(lo), Ok(hi)) = (bound(lo), bound(hi)) {
                return FilterValue::Range(lo, hi);
            }
        }
        if raw.contains(',') {
            return FilterValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        FilterValue::Text(raw.to_string())
    }

    /// Renders the value as search text, or `None` when it selects nothing.
    ///
    /// ```
    /// use mypup_query::FilterValue;
    ///
    /// assert_eq!(FilterValue::Number(2024.0).to_term().as_deref(), Some("2024"));
    /// assert_eq!(FilterValue::parse_value("lab,retriever").to_term().as_deref(), Some("lab,retriever"));
    /// assert_eq!(FilterValue::Text("  ".into()).to_term(), None);
    /// ```
    pub fn to_term(&self) -> Option<String> {
        let bound = |b: &Option<f64>| b.map(|n| n.to_string()).unwrap_or_default();
        let term = match self {
            FilterValue::Null => return None,
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Text(s) => s.clone(),
            FilterValue::Range(lo, hi) => format!("{}..{}", bound(lo), bound(hi)),
            FilterValue::List(items) => items.join(","),
            FilterValue::Other(value) => value.to_string(),
        };
        (!term.trim().is_empty()).then_some(term)
    }

    /// Parses a `key=value` expression.
    pub fn parse_expr(expr: &str) -> Result<(String, FilterValue)> {
        let (key, value) = expr
            .split_once('=')
            .ok_or_else(|| QueryError::FilterExpression(expr.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(QueryError::FilterExpression(expr.to_string()));
        }
        Ok((key.to_string(), FilterValue::parse_value(value)))
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n as f64)
    }
}

impl From<(f64, f64)> for FilterValue {
    fn from((min, max): (f64, f64)) -> Self {
        FilterValue::range(min, max)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue::List(items)
    }
}

/// Filter state: filter key to selected value.
///
/// An empty spec matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    values: BTreeMap<String, FilterValue>,
}

impl FilterSpec {
    pub fn new() -> Self {
        FilterSpec::default()
    }

    /// Returns the spec with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FilterValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the free-text terms carried by text-rule keys.
    ///
    /// A term typed as `2024` or `lab,retriever` is parsed into a number or
    /// a list by [`FilterValue::parse_value`]; it is turned back into text
    /// here so the search still applies.
    pub fn search_terms(&self, profile: &QueryProfile) -> Vec<String> {
        self.values
            .iter()
            .filter(|(key, _)| profile.rule_for(key) == FilterRule::Text)
            .filter_map(|(_, value)| value.to_term())
            .collect()
    }

    /// Parses a list of `key=value` expressions into a spec.
    pub fn from_exprs<I, S>(exprs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spec = FilterSpec::new();
        for expr in exprs {
            let (key, value) = FilterValue::parse_expr(expr.as_ref())?;
            spec.set(key, value);
        }
        Ok(spec)
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut spec = FilterSpec::new();
        for (k, v) in iter {
            spec.set(k, v);
        }
        spec
    }
}

/// Conjunction of compiled filter clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// A predicate that matches every record.
    pub fn always() -> Self {
        Predicate::default()
    }

    /// Returns `true` if every clause matches.
    pub fn matches<T: Queryable + ?Sized>(&self, record: &T) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }

    /// Borrows the predicate as a plain closure.
    pub fn as_fn<T: Queryable>(&self) -> impl Fn(&T) -> bool + '_ {
        move |record: &T| self.matches(record)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns `true` if the predicate has no clauses (matches everything).
    pub fn is_always(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Compiles a filter spec into a predicate.
///
/// ```
/// use mypup_query::{build_predicate, FilterSpec, QueryProfile, Record};
///
/// let profile = QueryProfile::listings();
/// let spec = FilterSpec::new()
///     .with("breed", "Beagle")
///     .with("gender", "All Genders")
///     .with("priceRange", (0.0, 1000.0));
/// let predicate = build_predicate(&spec, &profile);
///
/// // The gender wildcard is omitted.
/// assert_eq!(predicate.clauses().len(), 2);
/// assert!(predicate.matches(&Record::new().with("breed", "Beagle").with("price", 500)));
/// assert!(!predicate.matches(&Record::new().with("breed", "Beagle").with("price", 1500)));
/// ```
pub fn build_predicate(spec: &FilterSpec, profile: &QueryProfile) -> Predicate {
    let mut clauses = Vec::new();
    for (key, value) in spec.iter() {
        let rule = profile.rule_for(key);
        match compile(&rule, value) {
            Compiled::Wildcard => {
                tracing::trace!(key, "filter is a wildcard, skipping");
            }
            Compiled::Skip => {}
            Compiled::Test(field, test) => {
                if test == ClauseTest::Reject {
                    tracing::warn!(key, ?value, "malformed filter value, excluding all records");
                }
                clauses.push(Clause::new(key, field, test));
            }
        }
    }
    Predicate { clauses }
}

enum Compiled {
    Wildcard,
    /// Not handled by the predicate (free-text keys).
    Skip,
    Test(String, ClauseTest),
}

fn compile(rule: &FilterRule, value: &FilterValue) -> Compiled {
    use FilterValue as V;

    match rule {
        FilterRule::Text => Compiled::Skip,

        FilterRule::Exact { field } => match value {
            V::Null => Compiled::Wildcard,
            V::Text(s) if is_wildcard_text(s) => Compiled::Wildcard,
            V::List(items) if items.is_empty() => Compiled::Wildcard,
            V::Text(s) => Compiled::Test(field.clone(), ClauseTest::EqualsText(s.clone())),
            V::List(items) => Compiled::Test(field.clone(), ClauseTest::OneOf(items.clone())),
            V::Number(n) => Compiled::Test(field.clone(), ClauseTest::EqualsNumber(*n)),
            V::Bool(b) => Compiled::Test(field.clone(), ClauseTest::EqualsBool(*b)),
            V::Range(..) | V::Other(_) => Compiled::Test(field.clone(), ClauseTest::Reject),
        },

        FilterRule::Flag { field } => match value {
            V::Null | V::Bool(false) => Compiled::Wildcard,
            V::Bool(true) => Compiled::Test(field.clone(), ClauseTest::Truthy),
            _ => Compiled::Test(field.clone(), ClauseTest::Reject),
        },

        FilterRule::Range { field, default } => match value {
            V::Null | V::Range(None, None) => Compiled::Wildcard,
            V::Range(min, max) => {
                if let (Some((dmin, dmax)), Some(min), Some(max)) = (default, min, max) {
                    if dmin == min && dmax == max {
                        return Compiled::Wildcard;
                    }
                }
                Compiled::Test(
                    field.clone(),
                    ClauseTest::Within {
                        min: min.unwrap_or(f64::NEG_INFINITY),
                        max: max.unwrap_or(f64::INFINITY),
                    },
                )
            }
            _ => Compiled::Test(field.clone(), ClauseTest::Reject),
        },

        FilterRule::Min { field } => match value {
            V::Null => Compiled::Wildcard,
            V::Number(n) if !n.is_nan() => Compiled::Test(
                field.clone(),
                ClauseTest::Within {
                    min: *n,
                    max: f64::INFINITY,
                },
            ),
            _ => Compiled::Test(field.clone(), ClauseTest::Reject),
        },

        FilterRule::Max { field } => match value {
            V::Null => Compiled::Wildcard,
            V::Number(n) if !n.is_nan() => Compiled::Test(
                field.clone(),
                ClauseTest::Within {
                    min: f64::NEG_INFINITY,
                    max: *n,
                },
            ),
            _ => Compiled::Test(field.clone(), ClauseTest::Reject),
        },
    }
}

/// `""`, `"Any"`, `"All"` and one-word panel labels such as `"All Breeds"`
/// select nothing. Longer values like `"All American Bulldog"` are real
/// selections.
fn is_wildcard_text(s: &str) -> bool {
    let s = s.trim();
    match s.strip_prefix("All ") {
        Some(label) => !label.trim().contains(char::is_whitespace),
        None => s.is_empty() || s == "Any" || s == "All",
    }
}
