//! Filter predicates.
//!
//! A [`Filter`] is a single predicate: a field name, an operator and a value.
//! Filters never fail. An unknown field, a null field or a value of the wrong
//! shape simply does not match.

use std::cmp::Ordering;
use std::fmt;

use crate::op::FilterOp;
use crate::value::{Number, Timestamp, Value};

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use nexus_table::{Filter, FilterOp, Value};
///
/// let filter = Filter::new("role", FilterOp::Equals, "admin");
/// assert!(filter.matches(Some(&Value::Enum("admin"))));
/// assert!(!filter.matches(Some(&Value::Enum("guest"))));
/// // Unknown field
/// assert!(!filter.matches(None));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl Filter {
    /// Creates a new filter.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Filter {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluates this filter against a field value.
    ///
    /// `None` means the record has no such field, which never matches.
    pub fn matches(&self, field_value: Option<&Value<'_>>) -> bool {
        let Some(field_value) = field_value else {
            return false;
        };

        match self.op {
            FilterOp::IsNull => field_value.is_null(),
            FilterOp::IsNotNull => !field_value.is_null(),
            // A missing value never satisfies a positive or negated assertion
            _ if field_value.is_null() => false,
            FilterOp::Equals => self.value.raw_eq(field_value),
            FilterOp::NotEquals => !self.value.raw_eq(field_value),
            FilterOp::Contains => self.match_text(field_value, |f, p| f.contains(p)),
            FilterOp::NotContains => !self.match_text(field_value, |f, p| f.contains(p)),
            FilterOp::StartsWith => self.match_text(field_value, |f, p| f.starts_with(p)),
            FilterOp::EndsWith => self.match_text(field_value, |f, p| f.ends_with(p)),
            FilterOp::GreaterThan
            | FilterOp::LessThan
            | FilterOp::GreaterEqual
            | FilterOp::LessEqual => match self.value.compare_field(field_value) {
                Some(ordering) => self.op.eval_ordering(ordering),
                None => false,
            },
            FilterOp::In => self.value.members().any(|v| v.raw_eq(field_value)),
            FilterOp::NotIn => !self.value.members().any(|v| v.raw_eq(field_value)),
        }
    }

    fn match_text(&self, field_value: &Value<'_>, test: impl Fn(&str, &str) -> bool) -> bool {
        let haystack = field_value.render().to_lowercase();
        let needle = self.value.render().to_lowercase();
        test(&haystack, &needle)
    }
}

impl fmt::Display for Filter {
    /// Chip label shown in the active-filter bar: `role equals admin`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value.render())
    }
}

/// Owned value stored in a filter.
///
/// Unlike [`Value`], which borrows from the record, `FilterValue` owns its
/// data so it can live in the table's filter list.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// List of values (for `In` / `NotIn`).
    List(Vec<FilterValue>),
    /// No value (for presence operators).
    Null,
}

impl FilterValue {
    /// Renders the value as text for substring operators and chip labels.
    pub fn render(&self) -> String {
        match self {
            FilterValue::String(s) => s.clone(),
            FilterValue::Number(n) => n.render(),
            FilterValue::Timestamp(t) => t.to_iso_string(),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::List(items) => items
                .iter()
                .map(FilterValue::render)
                .collect::<Vec<_>>()
                .join(","),
            FilterValue::Null => "null".to_string(),
        }
    }

    /// Exact comparison against a record value.
    ///
    /// Timestamp fields compare against strings through their ISO-8601 form,
    /// which is how records carry them.
    pub fn raw_eq(&self, field: &Value<'_>) -> bool {
        match (self, field) {
            (FilterValue::String(s), Value::String(f) | Value::Enum(f)) => s.as_str() == *f,
            (FilterValue::String(s), Value::Timestamp(t)) => t.to_iso_string() == *s,
            (FilterValue::Number(a), Value::Number(b)) => b.compare(*a) == Some(Ordering::Equal),
            (FilterValue::Timestamp(a), Value::Timestamp(b)) => a == b,
            (FilterValue::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }

    /// Orders a record value against this value (`field.cmp(self)`).
    ///
    /// Returns `None` when the two cannot be compared.
    pub fn compare_field(&self, field: &Value<'_>) -> Option<Ordering> {
        match (field, self) {
            (Value::Number(f), FilterValue::Number(v)) => f.compare(*v),
            (Value::Timestamp(f), FilterValue::Timestamp(v)) => Some(f.cmp(v)),
            (Value::Timestamp(f), FilterValue::String(s)) => {
                Timestamp::parse_iso(s).map(|v| f.cmp(&v))
            }
            (Value::String(f) | Value::Enum(f), FilterValue::String(s)) => Some((*f).cmp(s.as_str())),
            (Value::Bool(f), FilterValue::Bool(v)) => Some(f.cmp(v)),
            _ => None,
        }
    }

    /// Iterates the members of a list, or the value itself when scalar.
    fn members(&self) -> Box<dyn Iterator<Item = &FilterValue> + '_> {
        match self {
            FilterValue::List(items) => Box::new(items.iter()),
            other => Box::new(std::iter::once(other)),
        }
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<Number> for FilterValue {
    fn from(n: Number) -> Self {
        FilterValue::Number(n)
    }
}

impl From<Timestamp> for FilterValue {
    fn from(t: Timestamp) -> Self {
        FilterValue::Timestamp(t)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Number(Number::from(n))
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(Number::from(n))
    }
}

impl From<u32> for FilterValue {
    fn from(n: u32) -> Self {
        FilterValue::Number(Number::from(n))
    }
}

impl From<u64> for FilterValue {
    fn from(n: u64) -> Self {
        FilterValue::Number(Number::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(Number::from(n))
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        FilterValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_is_exact() {
        let filter = Filter::new("name", FilterOp::Equals, "User 1");
        assert!(filter.matches(Some(&Value::String("User 1"))));
        assert!(!filter.matches(Some(&Value::String("user 1")))); // case sensitive
        assert!(!filter.matches(Some(&Value::String("User 10"))));
    }

    #[test]
    fn equals_matches_enum_labels() {
        let filter = Filter::new("role", FilterOp::Equals, "admin");
        assert!(filter.matches(Some(&Value::Enum("admin"))));
        assert!(!filter.matches(Some(&Value::Enum("manager"))));
    }

    #[test]
    fn equals_on_timestamp_uses_iso_form() {
        let ts = Timestamp::parse_iso("2024-01-05T00:00:00.000Z").unwrap();
        let filter = Filter::new("createdAt", FilterOp::Equals, "2024-01-05T00:00:00.000Z");
        assert!(filter.matches(Some(&Value::Timestamp(ts))));

        let typed = Filter::new("createdAt", FilterOp::Equals, ts);
        assert!(typed.matches(Some(&Value::Timestamp(ts))));
    }

    #[test]
    fn equals_type_mismatch_never_matches() {
        let filter = Filter::new("count", FilterOp::Equals, "5");
        assert!(!filter.matches(Some(&Value::Number(Number::I64(5)))));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let filter = Filter::new("email", FilterOp::Contains, "EXAMPLE");
        assert!(filter.matches(Some(&Value::String("user1@example.com"))));
        assert!(!filter.matches(Some(&Value::String("user1@test.com"))));
    }

    #[test]
    fn contains_uses_rendered_value() {
        let filter = Filter::new("count", FilterOp::Contains, 4);
        assert!(filter.matches(Some(&Value::Number(Number::I64(142)))));

        let ts = Timestamp::parse_iso("2024-12-01T00:00:00Z").unwrap();
        let filter = Filter::new("lastLoginAt", FilterOp::Contains, "2024-12");
        assert!(filter.matches(Some(&Value::Timestamp(ts))));
    }

    #[test]
    fn text_prefix_and_suffix() {
        let starts = Filter::new("name", FilterOp::StartsWith, "user");
        assert!(starts.matches(Some(&Value::String("User 7"))));
        let ends = Filter::new("email", FilterOp::EndsWith, ".COM");
        assert!(ends.matches(Some(&Value::String("a@b.com"))));
        let not = Filter::new("email", FilterOp::NotContains, "example");
        assert!(!not.matches(Some(&Value::String("a@example.com"))));
    }

    #[test]
    fn unknown_field_never_matches() {
        for op in FilterOp::ALL {
            let filter = Filter::new("nope", op, "x");
            assert!(!filter.matches(None), "{op} matched an unknown field");
        }
    }

    #[test]
    fn null_matches_only_presence_checks() {
        assert!(Filter::new("lastLoginAt", FilterOp::IsNull, FilterValue::Null)
            .matches(Some(&Value::Null)));
        assert!(!Filter::new("lastLoginAt", FilterOp::IsNotNull, FilterValue::Null)
            .matches(Some(&Value::Null)));
        assert!(!Filter::new("lastLoginAt", FilterOp::Contains, "nu").matches(Some(&Value::Null)));
        assert!(!Filter::new("lastLoginAt", FilterOp::NotEquals, "x").matches(Some(&Value::Null)));
    }

    #[test]
    fn ordering_ops() {
        let gt = Filter::new("count", FilterOp::GreaterThan, 10);
        assert!(gt.matches(Some(&Value::Number(Number::U64(11)))));
        assert!(!gt.matches(Some(&Value::Number(Number::U64(10)))));

        let before = Filter::new("createdAt", FilterOp::LessThan, "2024-02-01T00:00:00Z");
        let jan = Timestamp::parse_iso("2024-01-15T00:00:00Z").unwrap();
        let mar = Timestamp::parse_iso("2024-03-15T00:00:00Z").unwrap();
        assert!(before.matches(Some(&Value::Timestamp(jan))));
        assert!(!before.matches(Some(&Value::Timestamp(mar))));

        // Unparseable bound degrades to no match
        let bad = Filter::new("createdAt", FilterOp::LessThan, "yesterday");
        assert!(!bad.matches(Some(&Value::Timestamp(jan))));
    }

    #[test]
    fn set_membership() {
        let roles = Filter::new("role", FilterOp::In, vec!["admin", "manager"]);
        assert!(roles.matches(Some(&Value::Enum("manager"))));
        assert!(!roles.matches(Some(&Value::Enum("guest"))));

        let not_roles = Filter::new("role", FilterOp::NotIn, vec!["admin"]);
        assert!(not_roles.matches(Some(&Value::Enum("guest"))));
        assert!(!not_roles.matches(Some(&Value::Enum("admin"))));
    }

    #[test]
    fn display_reads_like_a_chip() {
        let filter = Filter::new("role", FilterOp::Equals, "admin");
        assert_eq!(filter.to_string(), "role equals admin");
        let list = Filter::new("status", FilterOp::In, vec!["active", "pending"]);
        assert_eq!(list.to_string(), "status in active,pending");
    }
}
