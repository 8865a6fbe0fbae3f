//! The [`Queryable`] trait: how the engine reads fields from a record.

use crate::value::Value;

/// Trait for types that can be searched, filtered, sorted and paged.
///
/// The engine never mutates records; it only asks for field values by name.
/// [`Record`](crate::Record) implements this for JSON-shaped data, and domain
/// structs can implement it by hand.
///
/// ```
/// use mypup_query::{Queryable, Value, Number};
///
/// struct Puppy {
///     breed: String,
///     price: u32,
///     verified: bool,
/// }
///
/// impl Queryable for Puppy {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "breed" => Value::String(&self.breed),
///             "price" => Value::Number(Number::U64(self.price as u64)),
///             "verified" => Value::Bool(self.verified),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Queryable {
    /// Returns the value of a field, or [`Value::None`] if the field is
    /// absent or not queryable.
    fn field_value(&self, field: &str) -> Value<'_>;
}

impl<T: Queryable + ?Sized> Queryable for &T {
    fn field_value(&self, field: &str) -> Value<'_> {
        (**self).field_value(field)
    }
}
