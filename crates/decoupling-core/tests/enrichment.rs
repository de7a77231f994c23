mod common;

use common::{panel_frame, SEASONAL_HDD};
use decoupling_core::enrichment::{enrich_panel, EnrichmentError};
use decoupling_core::io::write_csv;
use decoupling_core::schema::{ENRICHED_COLUMNS, PANEL_COLUMNS};
use polars::prelude::*;

#[test]
fn enrichment_appends_ten_columns_in_order() {
    let panel = panel_frame(312);
    let enriched = enrich_panel(&panel).unwrap();

    assert_eq!(enriched.height(), 312);
    assert_eq!(enriched.width(), 15);
    let names: Vec<String> = enriched
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let expected: Vec<&str> = PANEL_COLUMNS.iter().chain(ENRICHED_COLUMNS.iter()).copied().collect();
    assert_eq!(names, expected);

    // Input is untouched.
    assert_eq!(panel.width(), 5);
}

#[test]
fn calendar_columns_follow_period_key() -> PolarsResult<()> {
    let enriched = enrich_panel(&panel_frame(24)).unwrap();

    assert_eq!(enriched.column("Date")?.dtype(), &DataType::Date);
    let year = enriched.column("Year")?.i32()?;
    let month = enriched.column("Month")?.i32()?;
    let quarter = enriched.column("Quarter")?.i32()?;
    assert_eq!(year.get(13), Some(2001));
    assert_eq!(month.get(13), Some(2));
    assert_eq!(quarter.get(13), Some(1));
    assert_eq!(quarter.get(11), Some(4));

    let days = enriched.column("Date")?.cast(&DataType::Int32)?;
    // 2000-01-01 is day 10957 after the epoch.
    assert_eq!(days.i32()?.get(0), Some(10_957));
    assert_eq!(days.i32()?.get(1), Some(10_988));
    Ok(())
}

#[test]
fn price_features_start_null_and_track_real_price() -> PolarsResult<()> {
    let panel = panel_frame(12);
    let enriched = enrich_panel(&panel).unwrap();
    let real = panel.column("Real_Heating_Oil_Price")?.f64()?;

    let change = enriched.column("Price_Change")?.f64()?;
    let pct = enriched.column("Price_PctChange")?.f64()?;
    let ma3 = enriched.column("Price_MA3")?.f64()?;

    assert_eq!(change.get(0), None);
    assert_eq!(pct.get(0), None);
    assert_eq!(ma3.get(0), None);
    assert_eq!(ma3.get(1), None);

    let (r0, r1, r2) = (real.get(0).unwrap(), real.get(1).unwrap(), real.get(2).unwrap());
    assert!((change.get(1).unwrap() - (r1 - r0)).abs() < 1e-15);
    assert!((pct.get(1).unwrap() - (r1 - r0) / r0).abs() < 1e-12);
    assert!((ma3.get(2).unwrap() - (r0 + r1 + r2) / 3.0).abs() < 1e-15);
    Ok(())
}

#[test]
fn hdd_lags_and_categories() -> PolarsResult<()> {
    let enriched = enrich_panel(&panel_frame(24)).unwrap();

    let lag1 = enriched.column("HDD_Lag1")?.f64()?;
    let lag3 = enriched.column("HDD_Lag3")?.f64()?;
    assert_eq!(lag1.get(0), None);
    assert_eq!(lag1.get(1), Some(SEASONAL_HDD[0]));
    assert_eq!(lag3.get(2), None);
    assert_eq!(lag3.get(3), Some(SEASONAL_HDD[0]));
    assert_eq!(lag3.get(15), Some(SEASONAL_HDD[0]));

    let category = enriched.column("HDD_Category")?.str()?;
    // 1100, 950, 800, 500, 200, 30, 0
    assert_eq!(category.get(0), Some("very-high"));
    assert_eq!(category.get(2), Some("high"));
    assert_eq!(category.get(4), Some("low"));
    assert_eq!(category.get(5), Some("very-low"));
    assert_eq!(category.get(6), Some("very-low"));
    Ok(())
}

#[test]
fn zero_previous_price_gives_null_pct_change() -> PolarsResult<()> {
    let panel = df!(
        "YearMonth" => &["2000-01", "2000-02", "2000-03"],
        "Heating_Oil_Price" => &[0.0f64, 1.0, 1.1],
        "CPI" => &[70.0f64, 70.0, 70.0],
        "Real_Heating_Oil_Price" => &[0.0f64, 1.0 / 70.0, 1.1 / 70.0],
        "Heating_Degree_Days" => &[Some(800.0f64), None, Some(10.0)],
    )?;

    let enriched = enrich_panel(&panel).unwrap();

    let pct = enriched.column("Price_PctChange")?.f64()?;
    assert_eq!(pct.get(1), None);
    assert!(pct.get(2).is_some());
    let category = enriched.column("HDD_Category")?.str()?;
    assert_eq!(category.get(1), None);
    let lag1 = enriched.column("HDD_Lag1")?.f64()?;
    assert_eq!(lag1.get(2), None);
    Ok(())
}

#[test]
fn unparsable_period_leaves_calendar_null() -> PolarsResult<()> {
    let panel = df!(
        "YearMonth" => &["2000-01", "2000/02"],
        "Real_Heating_Oil_Price" => &[0.01f64, 0.02],
        "Heating_Degree_Days" => &[800.0f64, 700.0],
    )?;

    let enriched = enrich_panel(&panel).unwrap();

    assert_eq!(enriched.column("Year")?.i32()?.get(1), None);
    assert_eq!(enriched.column("Date")?.null_count(), 1);
    Ok(())
}

#[test]
fn missing_required_column_is_rejected() -> PolarsResult<()> {
    let panel = panel_frame(12).drop("Heating_Degree_Days")?;

    let err = enrich_panel(&panel).unwrap_err();
    assert!(matches!(err, EnrichmentError::MissingColumn("Heating_Degree_Days")));
    Ok(())
}

fn csv_bytes(df: &DataFrame) -> Vec<u8> {
    let mut buffer = Vec::new();
    write_csv(df, &mut buffer).unwrap();
    buffer
}

#[test]
fn enrichment_is_deterministic() {
    let panel = panel_frame(312);
    let first = csv_bytes(&enrich_panel(&panel).unwrap());
    let second = csv_bytes(&enrich_panel(&panel).unwrap());
    assert_eq!(first, second);
}
