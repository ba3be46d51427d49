//! Filter operators.
//!
//! [`FilterOp`] names how a filter compares a record field against its value.
//! Operator names are the snake_case strings the table toolbar sends
//! (`"equals"`, `"contains"`, ...).

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Comparison operator for a table filter.
///
/// Grouped by the values they make sense for:
/// - **Exact**: `Equals`, `NotEquals` - raw value identity
/// - **Text**: `Contains`, `NotContains`, `StartsWith`, `EndsWith` - case-insensitive
/// - **Ordered**: `GreaterThan`, `LessThan`, `GreaterEqual`, `LessEqual`
/// - **Set**: `In`, `NotIn`
/// - **Presence**: `IsNull`, `IsNotNull`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact match on the raw value.
    Equals,
    /// Negation of `Equals`.
    NotEquals,
    /// Case-insensitive substring match on the rendered value.
    Contains,
    /// Negation of `Contains`.
    NotContains,
    /// Case-insensitive prefix match.
    StartsWith,
    /// Case-insensitive suffix match.
    EndsWith,
    /// Strictly greater than.
    GreaterThan,
    /// Strictly less than.
    LessThan,
    /// Greater than or equal.
    GreaterEqual,
    /// Less than or equal.
    LessEqual,
    /// Raw value equals one of a list.
    In,
    /// Raw value equals none of a list.
    NotIn,
    /// Field is null.
    IsNull,
    /// Field has a value.
    IsNotNull,
}

impl FilterOp {
    /// Every operator, in toolbar order.
    pub const ALL: [FilterOp; 14] = [
        FilterOp::Equals,
        FilterOp::NotEquals,
        FilterOp::Contains,
        FilterOp::NotContains,
        FilterOp::StartsWith,
        FilterOp::EndsWith,
        FilterOp::GreaterThan,
        FilterOp::LessThan,
        FilterOp::GreaterEqual,
        FilterOp::LessEqual,
        FilterOp::In,
        FilterOp::NotIn,
        FilterOp::IsNull,
        FilterOp::IsNotNull,
    ];

    /// Returns `true` for the ordered comparison operators.
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self,
            FilterOp::GreaterThan | FilterOp::LessThan | FilterOp::GreaterEqual | FilterOp::LessEqual
        )
    }

    /// Returns `true` for the operators that only inspect presence.
    pub fn is_presence_op(self) -> bool {
        matches!(self, FilterOp::IsNull | FilterOp::IsNotNull)
    }

    /// Evaluates an ordered comparison given `field.cmp(value)`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            FilterOp::GreaterThan => ordering == Ordering::Greater,
            FilterOp::LessThan => ordering == Ordering::Less,
            FilterOp::GreaterEqual => ordering != Ordering::Less,
            FilterOp::LessEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the wire name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::NotEquals => "not_equals",
            FilterOp::Contains => "contains",
            FilterOp::NotContains => "not_contains",
            FilterOp::StartsWith => "starts_with",
            FilterOp::EndsWith => "ends_with",
            FilterOp::GreaterThan => "greater_than",
            FilterOp::LessThan => "less_than",
            FilterOp::GreaterEqual => "greater_equal",
            FilterOp::LessEqual => "less_equal",
            FilterOp::In => "in",
            FilterOp::NotIn => "not_in",
            FilterOp::IsNull => "is_null",
            FilterOp::IsNotNull => "is_not_null",
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}
