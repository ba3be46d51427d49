//! Runtime value types for field comparison.
//!
//! The [`Value`] enum represents the runtime value of a record field. It covers
//! the primitive shapes a table row carries: free text, enumerated labels,
//! numbers, ISO-8601 timestamps, booleans and null.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

/// Runtime value for comparison, borrowed from the source record.
///
/// # Example
///
/// ```
/// use nexus_table::{Value, Number};
///
/// struct Row {
///     name: String,
///     visits: u32,
///     nickname: Option<String>,
/// }
///
/// fn field<'a>(row: &'a Row, field: &str) -> Option<Value<'a>> {
///     match field {
///         "name" => Some(Value::String(&row.name)),
///         "visits" => Some(Value::Number(Number::U64(row.visits as u64))),
///         "nickname" => Some(row.nickname.as_deref().map_or(Value::Null, Value::String)),
///         _ => None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Free-form string value (borrowed).
    String(&'a str),
    /// Enumerated string label, e.g. a role or status.
    Enum(&'a str),
    /// Numeric value.
    Number(Number),
    /// Point in time.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Known field without a value.
    Null,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the text of a `String` or `Enum` value.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(*s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Renders the value as text.
    ///
    /// This is the representation `contains`-style filters and the search box
    /// match against. Timestamps render as ISO-8601 with millisecond precision
    /// and null renders as `null`.
    pub fn render(&self) -> Cow<'a, str> {
        match self {
            Value::String(s) | Value::Enum(s) => Cow::Borrowed(*s),
            Value::Number(n) => Cow::Owned(n.render()),
            Value::Timestamp(t) => Cow::Owned(t.to_iso_string()),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Null => Cow::Borrowed("null"),
        }
    }
}

/// Numeric value.
///
/// Numbers are stored in one of three variants to preserve precision.
/// Integers compare exactly across variants, including against floats, so
/// large values never collapse onto the same `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::I64(a), Number::F64(b)) => cmp_int_float(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => cmp_int_float(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => {
                cmp_int_float(i128::from(b), a).map(Ordering::reverse)
            }
            (Number::F64(a), Number::U64(b)) => {
                cmp_int_float(i128::from(b), a).map(Ordering::reverse)
            }
        }
    }

    /// Renders the number in its shortest textual form (`5.0` renders as `5`).
    pub fn render(self) -> String {
        match self {
            Number::I64(n) => n.to_string(),
            Number::U64(n) => n.to_string(),
            Number::F64(n) => n.to_string(),
        }
    }
}

/// Exact `int.cmp(float)`.
///
/// Rounding to `f64` is monotonic, so it decides every case except a tie,
/// and a tie means `float` is integral and fits in `i128`.
fn cmp_int_float(int: i128, float: f64) -> Option<Ordering> {
    match (int as f64).partial_cmp(&float)? {
        Ordering::Equal => Some(int.cmp(&(float as i128))),
        ordering => Some(ordering),
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

/// Timestamp value represented as milliseconds since Unix epoch (UTC).
///
/// Records usually carry ISO-8601 strings; [`Timestamp::parse_iso`] and
/// [`Timestamp::to_iso_string`] convert in both directions.
///
/// ```
/// use nexus_table::Timestamp;
///
/// let ts = Timestamp::parse_iso("2024-01-02T00:00:00.000Z").unwrap();
/// assert_eq!(ts.to_iso_string(), "2024-01-02T00:00:00.000Z");
/// assert_eq!(ts.format_date("%-m/%-d/%Y"), "1/2/2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC 3339 / ISO-8601 string with offset.
    ///
    /// Returns `None` for anything chrono cannot read.
    pub fn parse_iso(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Timestamp(dt.timestamp_millis()))
    }

    /// Converts to a chrono UTC datetime, if within chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// Renders as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub fn to_iso_string(self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => self.0.to_string(),
        }
    }

    /// Renders the date with a chrono `strftime` pattern, in UTC.
    ///
    /// A pattern chrono cannot render falls back to the ISO-8601 form.
    pub fn format_date(self, pattern: &str) -> String {
        let Some(dt) = self.to_datetime() else {
            return self.0.to_string();
        };
        let mut out = String::new();
        match write!(out, "{}", dt.format(pattern)) {
            Ok(()) => out,
            Err(_) => {
                tracing::warn!(pattern, "invalid date format, writing ISO-8601");
                self.to_iso_string()
            }
        }
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.timestamp_millis())
    }
}
