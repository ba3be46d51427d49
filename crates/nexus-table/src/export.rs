//! CSV export of table rows.
//!
//! Columns are described by [`CsvColumn`]: a header label plus a cell
//! renderer. [`write_csv`] writes a header line followed by one line per row
//! in the style chosen by [`CsvConfig::style`].

use std::fmt;
use std::io;

use crate::config::{CsvConfig, CsvStyle};
use crate::error::{Error, Result};
use crate::record::Record;
use crate::value::{Timestamp, Value};

type CellFn<R> = Box<dyn Fn(&R, &CsvConfig) -> String + Send + Sync>;

/// One exported column.
pub struct CsvColumn<R> {
    label: String,
    cell: CellFn<R>,
}

impl<R: Record + 'static> CsvColumn<R> {
    /// A column with a custom cell renderer.
    pub fn new(
        label: impl Into<String>,
        cell: impl Fn(&R, &CsvConfig) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            cell: Box::new(cell),
        }
    }

    /// A column that writes the field's text representation.
    ///
    /// Null and unknown fields write an empty cell.
    pub fn field(label: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(label, move |row: &R, _: &CsvConfig| match row.field_value(&field) {
            Some(Value::Null) | None => String::new(),
            Some(value) => value.render().into_owned(),
        })
    }

    /// A column that writes a timestamp field as a date.
    ///
    /// Dates use [`CsvConfig::date_format`]; a null or unknown field writes
    /// [`CsvConfig::never_label`]. String fields holding ISO-8601 text are
    /// parsed first.
    pub fn date(label: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(label, move |row: &R, config: &CsvConfig| {
            match row.field_value(&field) {
                Some(Value::Timestamp(ts)) => ts.format_date(&config.date_format),
                Some(Value::String(text)) => match Timestamp::parse_iso(text) {
                    Some(ts) => ts.format_date(&config.date_format),
                    None => text.to_string(),
                },
                Some(Value::Null) | None => config.never_label.clone(),
                Some(other) => other.render().into_owned(),
            }
        })
    }
}

impl<R> CsvColumn<R> {
    /// Header label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Renders this column's cell for `row`.
    pub fn cell(&self, row: &R, config: &CsvConfig) -> String {
        (self.cell)(row, config)
    }
}

impl<R> fmt::Debug for CsvColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvColumn").field("label", &self.label).finish()
    }
}

/// Writes `rows` as CSV: header line first, then one line per row.
///
/// With [`CsvStyle::Plain`] cells are joined by `,` and lines by `\n` with no
/// trailing newline and no escaping, so an empty `rows` yields only the
/// header. [`CsvStyle::Rfc4180`] quotes cells where needed and ends every
/// line with `\n`.
pub fn write_csv<R>(rows: &[&R], columns: &[CsvColumn<R>], config: &CsvConfig) -> Result<String> {
    match config.style {
        CsvStyle::Plain => Ok(write_plain(rows, columns, config)),
        CsvStyle::Rfc4180 => write_quoted(rows, columns, config),
    }
}

pub(crate) fn write_plain<R>(rows: &[&R], columns: &[CsvColumn<R>], config: &CsvConfig) -> String {
    let header = columns
        .iter()
        .map(CsvColumn::label)
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    for row in rows {
        let cells: Vec<String> = columns.iter().map(|c| c.cell(row, config)).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

fn write_quoted<R>(rows: &[&R], columns: &[CsvColumn<R>], config: &CsvConfig) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(CsvColumn::label))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| c.cell(row, config)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
