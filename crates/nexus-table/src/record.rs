//! The record abstraction the table engine is generic over.

use crate::value::Value;

/// A row the table engine can search, filter, sort and export.
///
/// The engine only needs two things from a row: a stable identifier (used
/// for selection and deletion) and field access by name.
///
/// # Example
///
/// ```
/// use nexus_table::{Record, Value};
///
/// struct Invoice {
///     id: String,
///     customer: String,
///     paid_on: Option<String>,
/// }
///
/// impl Record for Invoice {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn field_value(&self, field: &str) -> Option<Value<'_>> {
///         match field {
///             "customer" => Some(Value::String(&self.customer)),
///             "paidOn" => Some(self.paid_on.as_deref().map_or(Value::Null, Value::String)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the unique identifier of this record.
    fn id(&self) -> &str;

    /// Returns the value of a field.
    ///
    /// Return `None` when the record shape has no such field, and
    /// `Some(Value::Null)` for a known field that currently holds no value.
    /// Filters treat the two differently: an unknown field never matches,
    /// while a null field still satisfies `is_null`.
    fn field_value(&self, field: &str) -> Option<Value<'_>>;
}
