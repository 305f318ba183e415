//! Tabular input and output
//!
//! Input tables carry at least `Date` and `Price` columns. Output tables carry
//! `Date, Price, EMA, Price_Change`. Dates use the fixed
//! `YYYY-MM-DD HH:MM:SS UTC` pattern in both directions.

pub mod csv_table;
pub mod xlsx_table;

pub use csv_table::CsvFormat;
pub use xlsx_table::XlsxFormat;

use crate::data::{CombinedSeries, PriceHistory, PricePoint, SeriesRow};
use crate::error::{ForecastError, Result};
use crate::utils::date_parser;
use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use std::fs::{self, Permissions};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const DATE_COLUMN: &str = "Date";
pub const PRICE_COLUMN: &str = "Price";
pub const EMA_COLUMN: &str = "EMA";
pub const PRICE_CHANGE_COLUMN: &str = "Price_Change";

/// Output column order
pub const SERIES_COLUMNS: [&str; 4] = [DATE_COLUMN, PRICE_COLUMN, EMA_COLUMN, PRICE_CHANGE_COLUMN];

/// A tabular file format that can hold price tables
pub trait TabularFormat {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Read `Date` and `Price` columns from an input table
    fn read_prices(&self, path: &Path) -> Result<Vec<PricePoint>>;

    /// Read a previously written output table
    fn read_series(&self, path: &Path) -> Result<Vec<SeriesRow>>;

    /// Render an output table to bytes
    fn encode_series(&self, series: &CombinedSeries) -> Result<Vec<u8>>;
}

/// Pick the format from the file extension
pub fn format_for_path(path: &Path) -> Result<Box<dyn TabularFormat>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvFormat)),
        Some("xlsx") => Ok(Box::new(XlsxFormat)),
        _ => Err(ForecastError::InvalidParameter(format!(
            "Unsupported table format for '{}', expected .csv or .xlsx",
            path.display()
        ))),
    }
}

/// Load and validate the historical prices at `path`
pub fn load_prices(path: &Path) -> Result<PriceHistory> {
    let format = format_for_path(path)?;
    let points = format.read_prices(path)?;
    info!(
        path = %path.display(),
        format = format.name(),
        rows = points.len(),
        "loaded price history"
    );
    PriceHistory::new(points)
}

/// Read an output table written by [`write_series`]
pub fn read_series(path: &Path) -> Result<Vec<SeriesRow>> {
    format_for_path(path)?.read_series(path)
}

/// Write the combined series to `path`
///
/// The table is rendered in memory, written to a temporary file next to the
/// destination and renamed over it, so a failed run leaves no partial output.
pub fn write_series(path: &Path, series: &CombinedSeries) -> Result<()> {
    let format = format_for_path(path)?;
    let bytes = format.encode_series(series)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&bytes)?;
    if let Some(permissions) = output_permissions(path) {
        file.as_file().set_permissions(permissions)?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| ForecastError::IoError(e.error))?;

    info!(
        path = %path.display(),
        format = format.name(),
        rows = series.len(),
        bytes = bytes.len(),
        "wrote combined series"
    );
    Ok(())
}

/// Mode for the replacement file: the existing output's, else `0644` on unix
///
/// Temporary files are created owner-only, which the rename would otherwise
/// carry over to the output.
fn output_permissions(path: &Path) -> Option<Permissions> {
    match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

/// A cell value as read from either table format
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Cell<'a> {
    Empty,
    Text(&'a str),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl<'a> Cell<'a> {
    /// Text cells, with blank text treated as empty
    pub(crate) fn from_text(text: &'a str) -> Self {
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text)
        }
    }
}

/// Positions of the named columns in a header row
#[derive(Debug, Clone)]
pub(crate) struct ColumnLayout {
    indices: Vec<usize>,
}

impl ColumnLayout {
    /// Locate each `required` column, matching names case-insensitively
    pub(crate) fn resolve<'h, I>(headers: I, required: &[&str]) -> Result<Self>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let indices = required
            .iter()
            .map(|name| {
                let wanted = name.to_lowercase();
                headers.iter().position(|h| *h == wanted).ok_or_else(|| {
                    ForecastError::DataError(format!("Missing '{}' column", name))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        debug!(?required, ?indices, "resolved table columns");
        Ok(Self { indices })
    }

    /// Index of the `n`th required column
    pub(crate) fn index(&self, n: usize) -> usize {
        self.indices[n]
    }
}

/// Parse a `Date` cell
pub(crate) fn cell_timestamp(cell: Cell<'_>, row: usize) -> Result<DateTime<Utc>> {
    match cell {
        Cell::Text(text) => date_parser::parse_utc(text).map_err(|_| {
            ForecastError::ParseError(format!(
                "Row {}: '{}' is not a 'YYYY-MM-DD HH:MM:SS UTC' timestamp",
                row, text
            ))
        }),
        // Excel serial times are floats; round off the representation error
        Cell::DateTime(naive) => Ok(Utc.from_utc_datetime(&naive).round_subsecs(0)),
        Cell::Empty => Err(ForecastError::DataError(format!(
            "Row {}: missing {}",
            row, DATE_COLUMN
        ))),
        Cell::Number(value) => Err(ForecastError::ParseError(format!(
            "Row {}: expected a date, found number {}",
            row, value
        ))),
    }
}

/// Parse a required finite numeric cell
pub(crate) fn cell_number(cell: Cell<'_>, row: usize, column: &str) -> Result<f64> {
    cell_optional_number(cell, row, column)?.ok_or_else(|| {
        ForecastError::DataError(format!("Row {}: missing {}", row, column))
    })
}

/// Parse a numeric cell that may be blank
pub(crate) fn cell_optional_number(cell: Cell<'_>, row: usize, column: &str) -> Result<Option<f64>> {
    let value = match cell {
        Cell::Empty => return Ok(None),
        Cell::Number(value) => value,
        Cell::Text(text) => text.trim().parse::<f64>().map_err(|e| {
            ForecastError::ParseError(format!(
                "Row {}: {} '{}' is not a number: {}",
                row, column, text, e
            ))
        })?,
        Cell::DateTime(_) => {
            return Err(ForecastError::ParseError(format!(
                "Row {}: {} holds a date, expected a number",
                row, column
            )))
        }
    };

    if !value.is_finite() {
        return Err(ForecastError::DataError(format!(
            "Row {}: {} must be finite, got {}",
            row, column, value
        )));
    }
    Ok(Some(value))
}

/// Parse a `Price` cell of an input table; must be positive
pub(crate) fn cell_price(cell: Cell<'_>, row: usize) -> Result<f64> {
    let price = cell_number(cell, row, PRICE_COLUMN)?;
    if price <= 0.0 {
        return Err(ForecastError::DataError(format!(
            "Row {}: {} must be positive, got {}",
            row, PRICE_COLUMN, price
        )));
    }
    Ok(price)
}

/// Build an output row from the four series cells
pub(crate) fn series_row(cells: [Cell<'_>; 4], row: usize) -> Result<SeriesRow> {
    let [date, price, ema, change] = cells;
    Ok(SeriesRow {
        timestamp: cell_timestamp(date, row)?,
        price: cell_number(price, row, PRICE_COLUMN)?,
        ema: cell_number(ema, row, EMA_COLUMN)?,
        price_change: cell_optional_number(change, row, PRICE_CHANGE_COLUMN)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(hour: u32, min: u32, sec: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(hour, min, sec, milli)
            .unwrap()
    }

    #[test]
    fn test_native_dates_drop_subseconds() {
        let parsed = cell_timestamp(Cell::DateTime(naive(9, 30, 15, 250)), 2).unwrap();
        assert_eq!(date_parser::format_utc(&parsed), "2024-03-01 09:30:15 UTC");
        assert_eq!(parsed.timestamp_subsec_nanos(), 0);

        // 11:59:59.999 is how a float serial often encodes noon
        let parsed = cell_timestamp(Cell::DateTime(naive(11, 59, 59, 999)), 2).unwrap();
        assert_eq!(date_parser::format_utc(&parsed), "2024-03-01 12:00:00 UTC");
    }

    #[test]
    fn test_text_dates_need_fixed_pattern() {
        let parsed = cell_timestamp(Cell::Text("2024-03-01 09:30:15 UTC"), 2).unwrap();
        assert_eq!(parsed.timestamp_subsec_nanos(), 0);

        let err = cell_timestamp(Cell::Text("2024-03-01"), 7).unwrap_err();
        assert!(err.to_string().contains("Row 7"));
    }
}
