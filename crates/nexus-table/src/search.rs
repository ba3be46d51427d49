//! Free-text search over a configured set of fields.

use crate::record::Record;
use crate::value::Value;

/// Case-insensitive substring search across several text fields.
///
/// An empty term matches every record. Fields that are unknown, null or not
/// textual are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    fields: Vec<String>,
}

impl Search {
    /// Creates a search over `fields`.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Search {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The fields this search inspects.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns `true` if any search field of `record` contains `term`.
    pub fn matches<R: Record>(&self, record: &R, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.matches_lowered(record, &needle)
    }

    /// Like [`Search::matches`] with an already lower-cased, non-empty needle.
    pub(crate) fn matches_lowered<R: Record>(&self, record: &R, needle: &str) -> bool {
        self.fields.iter().any(|field| match record.field_value(field) {
            Some(Value::String(text)) | Some(Value::Enum(text)) => {
                text.to_lowercase().contains(needle)
            }
            _ => false,
        })
    }
}
