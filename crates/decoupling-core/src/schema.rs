// crates/decoupling-core/src/schema.rs

pub const PERIOD: &str = "YearMonth";
pub const NOMINAL_PRICE: &str = "Heating_Oil_Price";
pub const PRICE_INDEX: &str = "CPI";
pub const REAL_PRICE: &str = "Real_Heating_Oil_Price";
pub const HEATING_DEGREE_DAYS: &str = "Heating_Degree_Days";

/// Exact column set of the merged panel.
pub const PANEL_COLUMNS: [&str; 5] = [
    PERIOD,
    NOMINAL_PRICE,
    PRICE_INDEX,
    REAL_PRICE,
    HEATING_DEGREE_DAYS,
];

/// Panel columns that must hold numbers.
pub const MEASURE_COLUMNS: [&str; 4] = [
    NOMINAL_PRICE,
    PRICE_INDEX,
    REAL_PRICE,
    HEATING_DEGREE_DAYS,
];

pub const DATE: &str = "Date";
pub const YEAR: &str = "Year";
pub const MONTH: &str = "Month";
pub const QUARTER: &str = "Quarter";
pub const PRICE_CHANGE: &str = "Price_Change";
pub const PRICE_PCT_CHANGE: &str = "Price_PctChange";
pub const PRICE_MA3: &str = "Price_MA3";
pub const HDD_CATEGORY: &str = "HDD_Category";
pub const HDD_LAG1: &str = "HDD_Lag1";
pub const HDD_LAG3: &str = "HDD_Lag3";

/// Columns appended by the enrichment transform, in output order.
pub const ENRICHED_COLUMNS: [&str; 10] = [
    DATE,
    YEAR,
    MONTH,
    QUARTER,
    PRICE_CHANGE,
    PRICE_PCT_CHANGE,
    PRICE_MA3,
    HDD_CATEGORY,
    HDD_LAG1,
    HDD_LAG3,
];

/// Which source a raw series comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// FRED-style nominal price, CPI and deflated price.
    Price,
    /// NOAA-style monthly heating-degree-days.
    Climate,
}

impl SeriesKind {
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::Price => "price",
            SeriesKind::Climate => "climate",
        }
    }

    /// Columns every series of this kind must carry, period key first.
    pub fn declared_columns(&self) -> &'static [&'static str] {
        match self {
            SeriesKind::Price => &[PERIOD, NOMINAL_PRICE, PRICE_INDEX, REAL_PRICE],
            SeriesKind::Climate => &[PERIOD, HEATING_DEGREE_DAYS],
        }
    }
}
