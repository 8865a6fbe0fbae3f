//! Borrowed field values read by every query stage.
//!
//! The [`Value`] enum is the borrowed view of a single record field at query
//! time. Every stage of the engine reads records exclusively through it, so a
//! domain struct and a JSON-shaped [`Record`](crate::Record) behave the same.

use chrono::{DateTime, NaiveDate};

/// One record field, borrowed from the record it was read from.
///
/// # Example
///
/// ```
/// use mypup_query::{Value, Number};
///
/// struct Puppy {
///     breed: String,
///     price: u32,
/// }
///
/// fn field<'a>(puppy: &'a Puppy, name: &str) -> Value<'a> {
///     match name {
///         "breed" => Value::String(&puppy.breed),
///         "price" => Value::Number(Number::U64(puppy.price as u64)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    String(&'a str),
    Number(Number),
    Timestamp(Timestamp),
    Bool(bool),
    /// String lists such as `tags`.
    List(&'a [String]),
    /// Missing, null, or of a type no stage understands.
    None,
}

impl<'a> Value<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The borrowed text, for string fields.
    pub fn as_str(&self) -> Option<&'a str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Coerces the value to a finite number.
    ///
    /// Numeric strings are accepted because listing prices and ages are
    /// frequently stored as text by the record source.
    pub fn to_f64(&self) -> Option<f64> {
        let n = match self {
            Value::Number(n) => n.to_f64(),
            Value::Timestamp(t) => t.as_millis() as f64,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Coerces the value to a timestamp.
    ///
    /// Numbers are read as milliseconds since the epoch. Strings are parsed as
    /// RFC 3339 datetimes or plain `YYYY-MM-DD` dates (midnight UTC).
    pub fn to_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            Value::Number(n) => {
                let millis = n.to_f64();
                millis.is_finite().then(|| Timestamp(millis as i64))
            }
            Value::String(s) => Timestamp::parse(s),
            _ => None,
        }
    }

    /// JavaScript-style truthiness, used by boolean filters.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => {
                let n = n.to_f64();
                n != 0.0 && !n.is_nan()
            }
            Value::Timestamp(_) => true,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::None => false,
        }
    }
}

/// A numeric field, keeping integers exact until they are compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Widens to `f64`; very large integers lose precision.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

/// Milliseconds since 1970-01-01T00:00:00Z.
///
/// ```
/// use mypup_query::Timestamp;
///
/// let listed = Timestamp::parse("2024-03-01T12:00:00Z").unwrap();
/// assert!(Timestamp::EPOCH < listed);
/// assert_eq!(Timestamp::parse("1970-01-02"), Some(Timestamp::from_secs(86_400)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creation time assumed for records that carry none.
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn from_millis(ms: i64) -> Self {
        Timestamp(ms)
    }

    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC 3339 datetime or a `YYYY-MM-DD` date.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Timestamp(dt.timestamp_millis()));
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(Timestamp(midnight.and_utc().timestamp_millis()))
    }
}
