use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tempfile::{tempdir, Builder, NamedTempFile};
use trend_forecast::data::{CombinedSeries, SeriesRow};
use trend_forecast::io::{self, format_for_path, CsvFormat, TabularFormat, XlsxFormat};
use trend_forecast::ForecastError;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn sample_series() -> CombinedSeries {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let row = |i: i64, price: f64, ema: f64, change: Option<f64>| SeriesRow {
        timestamp: start + Duration::days(i),
        price,
        ema,
        price_change: change,
    };

    CombinedSeries::new(
        vec![
            row(0, 61234.5, 61234.5, None),
            row(1, 62000.125, 61283.88, Some(0.012_503_827_9)),
        ],
        vec![
            row(2, 61900.0, 61283.88, Some(-0.001_614_113)),
            row(3, 1.0 / 3.0, 61283.88, Some(-0.999_994_6)),
        ],
    )
    .unwrap()
}

#[test]
fn test_read_prices_from_csv() {
    let file = csv_file(&[
        "Date,Price,Volume",
        "2024-01-02 00:00:00 UTC,101.5,10",
        "2024-01-01 00:00:00 UTC,100.0,12",
        "2024-01-03 00:00:00 UTC, 99.25 ,9",
    ]);

    let history = io::load_prices(file.path()).unwrap();

    assert_eq!(history.len(), 3);
    assert_eq!(history.prices(), vec![100.0, 101.5, 99.25]);
    assert_eq!(
        history.last().timestamp,
        Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_headers_are_case_insensitive() {
    let file = csv_file(&["price,date", "5.0,2024-01-01 00:00:00 UTC"]);
    let points = CsvFormat.read_prices(file.path()).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].price, 5.0);
}

#[rstest]
#[case::bad_date(&["Date,Price", "2024-01-01,100.0"])]
#[case::bad_price(&["Date,Price", "2024-01-01 00:00:00 UTC,abc"])]
fn test_malformed_rows_fail_with_parse_error(#[case] lines: &[&str]) {
    let file = csv_file(lines);
    let error = io::load_prices(file.path()).unwrap_err();

    assert!(matches!(error, ForecastError::ParseError(_)), "{}", error);
    assert!(error.to_string().contains("Row 2"));
}

#[rstest]
#[case::missing_price(&["Date,Price", "2024-01-01 00:00:00 UTC,"])]
#[case::negative_price(&["Date,Price", "2024-01-01 00:00:00 UTC,-3"])]
#[case::missing_column(&["Date,Close", "2024-01-01 00:00:00 UTC,3"])]
fn test_invalid_rows_fail_with_data_error(#[case] lines: &[&str]) {
    let file = csv_file(lines);
    let error = io::load_prices(file.path()).unwrap_err();

    assert!(matches!(error, ForecastError::DataError(_)), "{}", error);
}

#[test]
fn test_missing_file_is_io_error() {
    let error = io::load_prices(Path::new("/nonexistent/prices.csv")).unwrap_err();
    assert!(matches!(error, ForecastError::IoError(_)));
}

#[rstest]
#[case("prices.csv", "csv")]
#[case("PRICES.XLSX", "xlsx")]
fn test_format_detection(#[case] path: &str, #[case] name: &str) {
    assert_eq!(format_for_path(Path::new(path)).unwrap().name(), name);
}

#[rstest]
#[case("prices.json")]
#[case("prices")]
fn test_unsupported_format(#[case] path: &str) {
    assert!(matches!(
        format_for_path(Path::new(path)),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_csv_layout() {
    let bytes = CsvFormat.encode_series(&sample_series()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.lines();

    assert_eq!(lines.next(), Some("Date,Price,EMA,Price_Change"));
    assert_eq!(lines.next(), Some("2024-05-01 00:00:00 UTC,61234.5,61234.5,"));
    assert_eq!(text.lines().count(), 5);
}

fn assert_same_rows(read: &[SeriesRow], written: &CombinedSeries) {
    assert_eq!(read.len(), written.len());
    for (read, written) in read.iter().zip(written.rows()) {
        assert_eq!(read.timestamp, written.timestamp);
        assert_relative_eq!(read.price, written.price, max_relative = 1e-12);
        assert_relative_eq!(read.ema, written.ema, max_relative = 1e-12);
        match (read.price_change, written.price_change) {
            (Some(a), Some(b)) => assert_relative_eq!(a, b, max_relative = 1e-12),
            (a, b) => assert_eq!(a, b),
        }
    }
}

#[rstest]
#[case("forecast.csv")]
#[case("forecast.xlsx")]
fn test_write_then_read_round_trip(#[case] name: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    let series = sample_series();

    io::write_series(&path, &series).unwrap();
    let read = io::read_series(&path).unwrap();

    assert_same_rows(&read, &series);
    // Only the destination is left behind, no temporary files
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_output_can_be_read_as_prices() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.xlsx");
    let series = sample_series();
    io::write_series(&path, &series).unwrap();

    let points = XlsxFormat.read_prices(&path).unwrap();
    assert_eq!(points.len(), series.len());
    assert_eq!(points[0].price, 61234.5);
}

#[test]
fn test_write_replaces_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("forecast.csv");
    std::fs::write(&path, "stale").unwrap();

    io::write_series(&path, &sample_series()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Date,Price,EMA,Price_Change"));
}

#[test]
fn test_failed_write_leaves_no_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("forecast.csv");

    let result = io::write_series(&path, &sample_series());

    assert!(matches!(result, Err(ForecastError::IoError(_))));
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn test_write_keeps_existing_permissions() {
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");
    fs::write(&path, "old").unwrap();
    fs::set_permissions(&path, Permissions::from_mode(0o640)).unwrap();

    io::write_series(&path, &sample_series()).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}

#[cfg(unix)]
#[test]
fn test_new_output_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = dir.path().join("out.xlsx");

    io::write_series(&path, &sample_series()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

fn workbook_part(bytes: Vec<u8>, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut part)
        .unwrap();
    part
}

#[test]
fn test_xlsx_output_is_styled() {
    let bytes = XlsxFormat.encode_series(&sample_series()).unwrap();

    let styles = workbook_part(bytes.clone(), "xl/styles.xml");
    assert!(styles.contains("formatCode=\"$#,##0.00\""));
    assert!(styles.contains("yyyy-mm-dd hh:mm:ss"));
    assert!(styles.contains("<b/>"));

    let sheet = workbook_part(bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("state=\"frozen\""));
}

#[test]
fn test_csv_output_is_plain() {
    let bytes = CsvFormat.encode_series(&sample_series()).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    assert!(!text.contains('$'));
    assert!(text.contains("61234.5"));
}
