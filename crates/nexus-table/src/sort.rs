//! Sort key, direction and the record comparator.
//!
//! The table keeps at most one active [`SortSpec`]. Sorting is stable and
//! puts null or absent values after every defined value in both directions.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::record::Record;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(Error::UnknownDirection(other.to_string())),
        }
    }
}

/// The active sort: one field and a direction.
///
/// Serializes as `{"field": "name", "direction": "asc"}`, which is also the
/// persisted preference layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: Direction,
}

impl SortSpec {
    /// Creates a new sort spec.
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        SortSpec {
            field: field.into(),
            direction,
        }
    }

    /// Creates an ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    /// Creates a descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    /// Column-header click semantics.
    ///
    /// Clicking the active column flips its direction; clicking any other
    /// column sorts it ascending.
    ///
    /// ```
    /// use nexus_table::{Direction, SortSpec};
    ///
    /// let first = SortSpec::toggle(None, "name");
    /// assert_eq!(first, SortSpec::asc("name"));
    /// let second = SortSpec::toggle(Some(&first), "name");
    /// assert_eq!(second.direction, Direction::Desc);
    /// let other = SortSpec::toggle(Some(&second), "email");
    /// assert_eq!(other, SortSpec::asc("email"));
    /// ```
    pub fn toggle(current: Option<&SortSpec>, field: &str) -> SortSpec {
        match current {
            Some(spec) if spec.field == field => SortSpec::new(field, spec.direction.flip()),
            _ => SortSpec::asc(field),
        }
    }

    /// Compares two records by this spec.
    ///
    /// Nulls and unknown fields go last regardless of direction; the
    /// direction only applies between two defined values.
    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        let va = a.field_value(&self.field).unwrap_or(Value::Null);
        let vb = b.field_value(&self.field).unwrap_or(Value::Null);

        match (va.is_null(), vb.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.direction.apply(compare_values(&va, &vb)),
        }
    }
}

/// Total order over two defined values.
///
/// Text compares by code point, numbers numerically, timestamps
/// chronologically, booleans `false < true`. Values of different kinds order
/// by kind so the comparator stays total.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a) | Value::Enum(a), Value::String(b) | Value::Enum(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .compare(*b)
            .unwrap_or_else(|| a.to_f64().total_cmp(&b.to_f64())),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::String(_) | Value::Enum(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::Bool(_) => 3,
        Value::Null => 4,
    }
}

/// Sorts rows in place by `spec`, keeping equal rows in their prior order.
pub fn sort_records<R: Record>(rows: &mut [&R], spec: &SortSpec) {
    rows.sort_by(|a, b| spec.compare(*a, *b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Timestamp};

    #[derive(Debug)]
    struct Item {
        id: &'static str,
        name: &'static str,
        score: Option<i64>,
    }

    impl Record for Item {
        fn id(&self) -> &str {
            self.id
        }

        fn field_value(&self, field: &str) -> Option<Value<'_>> {
            match field {
                "name" => Some(Value::String(self.name)),
                "score" => Some(self.score.map_or(Value::Null, |s| Value::Number(Number::I64(s)))),
                _ => None,
            }
        }
    }

    fn item(id: &'static str, name: &'static str, score: Option<i64>) -> Item {
        Item { id, name, score }
    }

    fn ids(rows: &[&Item]) -> Vec<&'static str> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn direction_flip_and_apply() {
        assert_eq!(Direction::Asc.flip(), Direction::Desc);
        assert_eq!(Direction::Desc.flip(), Direction::Asc);
        assert_eq!(Direction::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Direction::Asc.apply(Ordering::Less), Ordering::Less);
    }

    #[test]
    fn direction_parse_and_display() {
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Desc);
        assert!("down".parse::<Direction>().is_err());
        assert_eq!(Direction::Asc.to_string(), "asc");
    }

    #[test]
    fn toggle_flips_both_ways() {
        let desc = SortSpec::desc("name");
        assert_eq!(SortSpec::toggle(Some(&desc), "name"), SortSpec::asc("name"));
    }

    #[test]
    fn sort_spec_json_layout() {
        let json = serde_json::to_string(&SortSpec::desc("createdAt")).unwrap();
        assert_eq!(json, r#"{"field":"createdAt","direction":"desc"}"#);
        let back: SortSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SortSpec::desc("createdAt"));
    }

    #[test]
    fn strings_compare_lexically() {
        let items = [item("a", "User 2", None), item("b", "User 10", None)];
        let mut rows: Vec<&Item> = items.iter().collect();
        sort_records(&mut rows, &SortSpec::asc("name"));
        assert_eq!(ids(&rows), vec!["b", "a"]);
    }

    #[test]
    fn nulls_last_in_both_directions() {
        let items = [
            item("none-1", "a", None),
            item("low", "b", Some(1)),
            item("none-2", "c", None),
            item("high", "d", Some(9)),
        ];

        let mut asc: Vec<&Item> = items.iter().collect();
        sort_records(&mut asc, &SortSpec::asc("score"));
        assert_eq!(ids(&asc), vec!["low", "high", "none-1", "none-2"]);

        let mut desc: Vec<&Item> = items.iter().collect();
        sort_records(&mut desc, &SortSpec::desc("score"));
        assert_eq!(ids(&desc), vec!["high", "low", "none-1", "none-2"]);
    }

    #[test]
    fn equal_keys_keep_prior_order() {
        let items = [
            item("first", "same", Some(1)),
            item("second", "same", Some(0)),
            item("third", "same", Some(1)),
        ];
        let mut rows: Vec<&Item> = items.iter().collect();
        sort_records(&mut rows, &SortSpec::desc("name"));
        assert_eq!(ids(&rows), vec!["first", "second", "third"]);
    }

    #[test]
    fn unknown_field_leaves_order_unchanged() {
        let items = [item("x", "b", None), item("y", "a", None)];
        let mut rows: Vec<&Item> = items.iter().collect();
        sort_records(&mut rows, &SortSpec::asc("missing"));
        assert_eq!(ids(&rows), vec!["x", "y"]);
    }

    #[test]
    fn compare_values_by_kind() {
        assert_eq!(
            compare_values(&Value::Timestamp(Timestamp(1)), &Value::Timestamp(Timestamp(2))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Enum("admin"), &Value::Enum("guest")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Bool(false), &Value::Bool(true)),
            Ordering::Less
        );
        // Mixed kinds still produce a consistent answer
        let s = Value::String("x");
        let n = Value::Number(Number::I64(1));
        assert_eq!(compare_values(&s, &n), compare_values(&n, &s).reverse());
    }
}
