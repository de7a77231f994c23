// crates/decoupling-core/src/frame.rs

// Numeric reads always go through a Float64 cast: CSV inference may type a
// measure as integer, or as text when a cell holds a marker such as `.`.
// NaN and unparsable cells read as missing, the same as nulls.

use polars::prelude::*;

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect())
}

/// Like [`float_values`] but `None` when the column is absent.
pub fn optional_float_values(df: &DataFrame, name: &str) -> PolarsResult<Option<Vec<Option<f64>>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    float_values(df, name).map(Some)
}

pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

pub fn optional_string_values(df: &DataFrame, name: &str) -> PolarsResult<Option<Vec<Option<String>>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    string_values(df, name).map(Some)
}

/// Missing and non-numeric cells of a measure column, counted separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasureGaps {
    /// Null or NaN in the source.
    pub missing: usize,
    /// Present in the source but not parsable as a number.
    pub non_numeric: usize,
}

impl MeasureGaps {
    pub fn total(&self) -> usize {
        self.missing + self.non_numeric
    }
}

/// Gaps in a column that must hold numbers, whatever dtype it was read as.
pub fn measure_gaps(df: &DataFrame, name: &str) -> PolarsResult<MeasureGaps> {
    let source_nulls = df.column(name)?.null_count();
    let unreadable = float_values(df, name)?
        .iter()
        .filter(|v| v.is_none())
        .count();
    let non_numeric = if df.column(name)?.dtype().is_float() {
        0
    } else {
        unreadable.saturating_sub(source_nulls)
    };
    Ok(MeasureGaps {
        missing: unreadable - non_numeric,
        non_numeric,
    })
}

/// Number of missing cells (null, or NaN for float columns).
pub fn missing_count(df: &DataFrame, name: &str) -> PolarsResult<usize> {
    let column = df.column(name)?;
    if column.dtype().is_float() {
        let values = float_values(df, name)?;
        Ok(values.iter().filter(|v| v.is_none()).count())
    } else {
        Ok(column.null_count())
    }
}

/// Earliest and latest non-null period key, compared as canonical strings.
pub fn period_range(periods: &[Option<String>]) -> Option<(String, String)> {
    let mut present = periods.iter().flatten();
    let first = present.next()?;
    let (min, max) = present.fold((first, first), |(min, max), value| {
        (
            if value < min { value } else { min },
            if value > max { value } else { max },
        )
    });
    Some((min.clone(), max.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_gaps_split_missing_from_unparsable() {
        let df = df!(
            "text" => &[Some("1.5"), Some("."), None, Some("2")],
            "float" => &[Some(1.0f64), Some(f64::NAN), None, Some(2.0)],
        )
        .unwrap();

        let text = measure_gaps(&df, "text").unwrap();
        assert_eq!(text, MeasureGaps { missing: 1, non_numeric: 1 });
        let float = measure_gaps(&df, "float").unwrap();
        assert_eq!(float, MeasureGaps { missing: 2, non_numeric: 0 });
        assert_eq!(missing_count(&df, "text").unwrap(), 1);
    }
}
