use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use trend_forecast::config::{default_end_date, ConfigFile, ConfigOverrides, ForecastConfig};
use trend_forecast::forecast::NegativePricePolicy;
use trend_forecast::{ForecastError, DEFAULT_SPAN};

fn config_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", json).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = ForecastConfig::new("in.xlsx", "out.xlsx");

    assert_eq!(config.span, DEFAULT_SPAN);
    assert_eq!(config.seed, None);
    assert_eq!(config.negative_prices, NegativePricePolicy::Allow);
    assert_eq!(
        config.end_date,
        Utc.with_ymd_and_hms(2025, 9, 6, 0, 0, 0).unwrap()
    );
    assert_eq!(default_end_date(), config.end_date);
    assert!(config.validate().is_ok());
}

#[test]
fn test_resolve_from_overrides_only() {
    let overrides = ConfigOverrides {
        input: Some(PathBuf::from("prices.csv")),
        output: Some(PathBuf::from("forecast.csv")),
        span: Some(10),
        ..Default::default()
    };

    let config = ForecastConfig::resolve(None, overrides).unwrap();

    assert_eq!(config.input, PathBuf::from("prices.csv"));
    assert_eq!(config.span, 10);
    assert_eq!(config.end_date, default_end_date());
}

#[test]
fn test_overrides_take_precedence_over_file() {
    let file = config_file(
        r#"{
            "input": "file_prices.xlsx",
            "output": "file_forecast.xlsx",
            "end_date": "2026-01-15",
            "span": 20,
            "seed": 99,
            "negative_prices": "floor"
        }"#,
    );
    let overrides = ConfigOverrides {
        output: Some(PathBuf::from("cli_forecast.csv")),
        span: Some(45),
        ..Default::default()
    };

    let config = ForecastConfig::resolve(Some(file.path()), overrides).unwrap();

    assert_eq!(config.input, PathBuf::from("file_prices.xlsx"));
    assert_eq!(config.output, PathBuf::from("cli_forecast.csv"));
    assert_eq!(config.span, 45);
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.negative_prices, NegativePricePolicy::Floor);
    assert_eq!(
        config.end_date,
        Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_missing_paths_are_config_errors() {
    let result = ForecastConfig::resolve(None, ConfigOverrides::default());
    assert!(matches!(result, Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_invalid_settings() {
    let zero_span = ForecastConfig::new("a.csv", "b.csv").with_span(0);
    assert!(matches!(zero_span.validate(), Err(ForecastError::ConfigError(_))));

    let same_path = ForecastConfig::new("a.csv", "a.csv");
    assert!(matches!(same_path.validate(), Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_config_file_parsing() {
    let parsed = ConfigFile::from_json(r#"{"end_date": "2025-12-31 18:30:00 UTC"}"#).unwrap();
    assert_eq!(
        parsed.end_date,
        Some(Utc.with_ymd_and_hms(2025, 12, 31, 18, 30, 0).unwrap())
    );
    assert_eq!(parsed.input, None);

    assert!(ConfigFile::from_json(r#"{"horizon": 3}"#).is_err());
    assert!(ConfigFile::from_json(r#"{"end_date": "soon"}"#).is_err());
    assert!(ConfigFile::from_json(r#"{"negative_prices": "maybe"}"#).is_err());
}

#[test]
fn test_unreadable_config_file() {
    let result = ForecastConfig::resolve(
        Some(std::path::Path::new("/nonexistent/forecast.json")),
        ConfigOverrides::default(),
    );
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_config_serializes_with_fixed_date_pattern() {
    let config = ForecastConfig::new("in.csv", "out.csv")
        .with_seed(5)
        .with_negative_prices(NegativePricePolicy::Reject);
    let json = serde_json::to_string(&config).unwrap();

    assert!(json.contains("\"end_date\":\"2025-09-06 00:00:00 UTC\""));
    assert!(json.contains("\"negative_prices\":\"reject\""));

    let parsed: ForecastConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_bad_config_file_names_path_once() {
    let file = config_file(r#"{"span": "thirty"}"#);

    let err = ConfigFile::load(file.path()).unwrap_err();
    let message = err.to_string();

    assert!(matches!(err, ForecastError::ConfigError(_)));
    assert_eq!(message.matches("Configuration error").count(), 1);
    assert!(message.contains(&file.path().display().to_string()));
}
