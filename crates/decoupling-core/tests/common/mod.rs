#![allow(dead_code)]

use polars::prelude::*;

/// Seasonal heating-degree-days, January first.
pub const SEASONAL_HDD: [f64; 12] = [
    1100.0, 950.0, 800.0, 500.0, 200.0, 30.0, 0.0, 0.0, 90.0, 400.0, 650.0, 950.0,
];

/// Monthly keys starting at 2000-01.
pub fn periods(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("{:04}-{:02}", 2000 + i / 12, i % 12 + 1))
        .collect()
}

pub fn nominal(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.9 + 0.015 * i as f64).collect()
}

pub fn cpi(n: usize) -> Vec<f64> {
    (0..n).map(|i| 70.0 + 0.8 * i as f64).collect()
}

pub fn hdd(n: usize) -> Vec<f64> {
    (0..n).map(|i| SEASONAL_HDD[i % 12]).collect()
}

pub fn price_frame(n: usize) -> DataFrame {
    let nominal = nominal(n);
    let cpi = cpi(n);
    let real: Vec<f64> = nominal.iter().zip(&cpi).map(|(p, c)| p / c).collect();
    df!(
        "YearMonth" => periods(n),
        "Heating_Oil_Price" => nominal,
        "CPI" => cpi,
        "Real_Heating_Oil_Price" => real,
    )
    .expect("price frame")
}

pub fn climate_frame(n: usize) -> DataFrame {
    df!(
        "YearMonth" => periods(n),
        "Heating_Degree_Days" => hdd(n),
    )
    .expect("climate frame")
}

/// Clean 2000-01.. panel; 312 rows spans 2000-01 to 2025-12.
pub fn panel_frame(n: usize) -> DataFrame {
    let mut panel = price_frame(n);
    panel
        .with_column(Series::new("Heating_Degree_Days".into(), hdd(n)))
        .expect("panel frame");
    panel
}
