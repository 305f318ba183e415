use chrono::{Duration, TimeZone, Utc};
use trend_forecast::utils::date_parser;
use trend_forecast::{
    CombinedSeries, ForecastGenerator, NegativePricePolicy, PriceHistory, PricePoint,
    RngNormalSource, TrendEstimator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Trend Forecast: Basic Example");
    println!("=============================\n");

    let history = create_sample_history()?;
    println!("Sample history: {} daily prices\n", history.len());

    let estimator = TrendEstimator::new(10)?;
    let estimate = estimator.estimate(&history)?;
    println!(
        "EMA span {} (alpha {:.4}), last EMA {:.2}, daily volatility {:.4}\n",
        estimator.span(),
        estimator.alpha(),
        estimate.last_row().ema,
        estimate.volatility()
    );

    let anchor = estimate.anchor()?;
    let end_date = anchor.last_date() + Duration::days(14);
    let generator = ForecastGenerator::new(NegativePricePolicy::Floor);
    let forecast = generator.generate(&anchor, end_date, &mut RngNormalSource::seeded(42))?;

    let series = CombinedSeries::new(estimate.into_rows(), forecast)?;

    println!("{:<25} {:>10} {:>10} {:>10}", "Date", "Price", "EMA", "Change");
    for row in series.rows().iter().skip(series.historical().len() - 5) {
        let change = row
            .price_change
            .map(|c| format!("{:+.2}%", c * 100.0))
            .unwrap_or_default();
        println!(
            "{:<25} {:>10.2} {:>10.2} {:>10}",
            date_parser::format_utc(&row.timestamp),
            row.price,
            row.ema,
            change
        );
    }

    println!(
        "\n{} historical rows, {} forecast rows",
        series.historical().len(),
        series.forecast().len()
    );

    Ok(())
}

fn create_sample_history() -> Result<PriceHistory, Box<dyn std::error::Error>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let points = (0..60)
        .map(|day| {
            let drift = 100.0 + day as f64 * 0.4;
            let wiggle = ((day as f64) * 0.7).sin() * 3.0;
            PricePoint::new(start + Duration::days(day), drift + wiggle)
        })
        .collect();

    Ok(PriceHistory::new(points)?)
}
