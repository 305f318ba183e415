//! Excel workbooks
//!
//! Reads the first worksheet of a workbook with `calamine` and writes a single
//! styled worksheet with `rust_xlsxwriter`. Dates are stored as text in the
//! fixed UTC pattern; the number formats only change how cells display.

use super::{
    cell_price, cell_timestamp, series_row, Cell, ColumnLayout, TabularFormat, DATE_COLUMN,
    PRICE_COLUMN, SERIES_COLUMNS,
};
use crate::data::{CombinedSeries, PricePoint, SeriesRow};
use crate::error::{ForecastError, Result};
use crate::utils::date_parser;
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Display format for the `Date` column
pub const DATE_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss \"UTC\"";

/// Display format for the `Price` and `EMA` columns
pub const CURRENCY_NUM_FORMAT: &str = "$#,##0.00";

/// `.xlsx` workbooks
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxFormat;

impl XlsxFormat {
    fn first_sheet(path: &Path) -> Result<Range<Data>> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or_else(|| {
            ForecastError::DataError(format!("'{}' has no worksheets", path.display()))
        })??;
        Ok(range)
    }

    /// Header layout plus data rows with their spreadsheet row number
    fn rows<'r>(
        range: &'r Range<Data>,
        required: &[&str],
    ) -> Result<(ColumnLayout, Vec<(usize, &'r [Data])>)> {
        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| ForecastError::DataError("Worksheet is empty".to_string()))?;
        let names: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
        let layout = ColumnLayout::resolve(names.iter().map(String::as_str), required)?;

        // calamine ranges start at the first used cell
        let header_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let data = rows
            .enumerate()
            .map(|(i, cells)| (header_row + i + 2, cells))
            .collect();

        Ok((layout, data))
    }
}

fn cell(value: Option<&Data>) -> Cell<'_> {
    let Some(value) = value else {
        return Cell::Empty;
    };

    match value {
        Data::String(text) => Cell::from_text(text),
        Data::Float(number) => Cell::Number(*number),
        Data::Int(number) => Cell::Number(*number as f64),
        Data::DateTime(_) | Data::DateTimeIso(_) => value
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or(Cell::Empty),
        _ => Cell::Empty,
    }
}

impl TabularFormat for XlsxFormat {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn read_prices(&self, path: &Path) -> Result<Vec<PricePoint>> {
        let range = Self::first_sheet(path)?;
        let (layout, rows) = Self::rows(&range, &[DATE_COLUMN, PRICE_COLUMN])?;

        rows.iter()
            .filter(|(_, cells)| !cells.iter().all(|c| c.is_empty()))
            .map(|(row, cells)| {
                Ok(PricePoint {
                    timestamp: cell_timestamp(cell(cells.get(layout.index(0))), *row)?,
                    price: cell_price(cell(cells.get(layout.index(1))), *row)?,
                })
            })
            .collect()
    }

    fn read_series(&self, path: &Path) -> Result<Vec<SeriesRow>> {
        let range = Self::first_sheet(path)?;
        let (layout, rows) = Self::rows(&range, &SERIES_COLUMNS)?;

        rows.iter()
            .filter(|(_, cells)| !cells.iter().all(|c| c.is_empty()))
            .map(|(row, cells)| {
                let values = [0, 1, 2, 3].map(|n| cell(cells.get(layout.index(n))));
                series_row(values, *row)
            })
            .collect()
    }

    fn encode_series(&self, series: &CombinedSeries) -> Result<Vec<u8>> {
        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);
        let currency_format = Format::new().set_num_format(CURRENCY_NUM_FORMAT);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in SERIES_COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
        }

        for (i, row) in series.rows().iter().enumerate() {
            let line = u32::try_from(i + 1).map_err(|_| {
                ForecastError::SpreadsheetError("Too many rows for a worksheet".to_string())
            })?;

            worksheet.write_string_with_format(
                line,
                0,
                date_parser::format_utc(&row.timestamp),
                &date_format,
            )?;
            worksheet.write_number_with_format(line, 1, row.price, &currency_format)?;
            worksheet.write_number_with_format(line, 2, row.ema, &currency_format)?;
            if let Some(change) = row.price_change {
                worksheet.write_number(line, 3, change)?;
            }
        }

        worksheet.set_column_width(0, 26)?;
        worksheet.set_column_width(1, 16)?;
        worksheet.set_column_width(2, 16)?;
        worksheet.set_column_width(3, 14)?;
        worksheet.set_freeze_panes(1, 0)?;

        Ok(workbook.save_to_buffer()?)
    }
}
