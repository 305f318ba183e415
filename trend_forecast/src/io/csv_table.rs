//! CSV tables

use super::{
    cell_price, cell_timestamp, series_row, Cell, ColumnLayout, TabularFormat, DATE_COLUMN,
    PRICE_COLUMN, SERIES_COLUMNS,
};
use crate::data::{CombinedSeries, PricePoint, SeriesRow};
use crate::error::{ForecastError, Result};
use crate::utils::date_parser;
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use std::path::Path;

/// Comma-separated tables with a header row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormat;

impl CsvFormat {
    fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
        let file = std::fs::File::open(path)?;
        Ok(ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file))
    }

    /// Records with their spreadsheet row number (header is row 1)
    fn rows(
        reader: &mut csv::Reader<std::fs::File>,
        required: &[&str],
    ) -> Result<(ColumnLayout, Vec<(usize, StringRecord)>)> {
        let layout = ColumnLayout::resolve(reader.headers()?.iter(), required)?;
        let records = reader
            .records()
            .enumerate()
            .map(|(i, record)| {
                record
                    .map(|record| (i + 2, record))
                    .map_err(ForecastError::from)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((layout, records))
    }
}

fn field(record: &StringRecord, index: usize) -> Cell<'_> {
    record.get(index).map(Cell::from_text).unwrap_or(Cell::Empty)
}

fn number(value: f64) -> String {
    value.to_string()
}

impl TabularFormat for CsvFormat {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn read_prices(&self, path: &Path) -> Result<Vec<PricePoint>> {
        let mut reader = Self::open(path)?;
        let (layout, records) = Self::rows(&mut reader, &[DATE_COLUMN, PRICE_COLUMN])?;

        records
            .iter()
            .map(|(row, record)| {
                Ok(PricePoint {
                    timestamp: cell_timestamp(field(record, layout.index(0)), *row)?,
                    price: cell_price(field(record, layout.index(1)), *row)?,
                })
            })
            .collect()
    }

    fn read_series(&self, path: &Path) -> Result<Vec<SeriesRow>> {
        let mut reader = Self::open(path)?;
        let (layout, records) = Self::rows(&mut reader, &SERIES_COLUMNS)?;

        records
            .iter()
            .map(|(row, record)| {
                let cells = [0, 1, 2, 3].map(|n| field(record, layout.index(n)));
                series_row(cells, *row)
            })
            .collect()
    }

    fn encode_series(&self, series: &CombinedSeries) -> Result<Vec<u8>> {
        let mut writer = Writer::from_writer(Vec::new());
        writer.write_record(SERIES_COLUMNS)?;

        for row in series.rows() {
            writer.write_record([
                date_parser::format_utc(&row.timestamp),
                number(row.price),
                number(row.ema),
                row.price_change.map(number).unwrap_or_default(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| ForecastError::IoError(e.into_error()))
    }
}
