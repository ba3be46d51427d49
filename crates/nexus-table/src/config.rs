//! Table configuration.
//!
//! Every field has a default matching the user management table, so an
//! empty JSON object (or [`TableConfig::default`]) is a complete config.

use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::DEFAULT_SORT_KEY;

/// Runtime configuration for a [`TableQuery`](crate::TableQuery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows per page when a session starts.
    pub page_size: usize,

    /// Page sizes offered by the pagination control.
    pub page_size_options: Vec<usize>,

    /// Fields the search box matches against.
    pub search_fields: Vec<String>,

    /// Quiet period before the search term is applied, in milliseconds.
    pub debounce_ms: u64,

    /// Preference key the sort is persisted under.
    pub sort_storage_key: String,

    /// CSV export settings.
    pub csv: CsvConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_size_options: vec![5, 10, 25, 50],
            search_fields: vec!["name".to_string(), "email".to_string()],
            debounce_ms: 300,
            sort_storage_key: DEFAULT_SORT_KEY.to_string(),
            csv: CsvConfig::default(),
        }
    }
}

impl TableConfig {
    /// Parses and validates a JSON config. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: TableConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than zero"));
        }
        if self.page_size_options.contains(&0) {
            return Err(Error::config("page_size_options must not contain zero"));
        }
        if self.search_fields.is_empty() {
            return Err(Error::config("search_fields must name at least one field"));
        }
        if self.sort_storage_key.is_empty() {
            return Err(Error::config("sort_storage_key must not be empty"));
        }
        if StrftimeItems::new(&self.csv.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::config(format!(
                "csv.date_format is not a valid strftime pattern: {:?}",
                self.csv.date_format
            )));
        }
        Ok(())
    }

    /// The debounce delay as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// How CSV cells are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvStyle {
    /// Cells joined with `,` and rows with `\n`, no quoting or escaping.
    ///
    /// A cell containing a comma, quote or newline corrupts the row. This is
    /// the established export format and is kept byte-for-byte.
    #[default]
    Plain,
    /// RFC 4180 quoting where needed.
    Rfc4180,
}

/// CSV export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Cell quoting style.
    pub style: CsvStyle,

    /// chrono `strftime` pattern for date columns (rendered in UTC).
    pub date_format: String,

    /// Text written for a date column with no value.
    pub never_label: String,

    /// Suggested download file name.
    pub filename: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            style: CsvStyle::Plain,
            date_format: "%-m/%-d/%Y".to_string(),
            never_label: "Never".to_string(),
            filename: "users.csv".to_string(),
        }
    }
}
