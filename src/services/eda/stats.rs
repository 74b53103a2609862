use indexmap::IndexMap;

use super::profile::column_values;
use super::types::{CategoricalStats, DataRow, EdaError, NumericStats};

/// Coercible values of a column, sorted ascending. Shared between the
/// numeric summarizer and the outlier detector so both see the same set.
pub fn sorted_numeric_values(rows: &[DataRow], column: &str) -> Vec<f64> {
    let mut values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.get(column).and_then(|v| v.as_f64()))
        .collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Nearest-rank quantile: index `floor(len * p)` into the sorted slice, no
/// interpolation. The last index is used when p lands past the end.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Descriptive statistics for one numeric column. Errs on a column with no
/// coercible values instead of emitting NaN.
pub fn summarize_numeric(rows: &[DataRow], column: &str) -> Result<NumericStats, EdaError> {
    let values = sorted_numeric_values(rows, column);
    let count = values.len();
    if count == 0 {
        return Err(EdaError::DegenerateColumn(column.to_string()));
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    // population variance, divide by count
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Ok(NumericStats {
        column: column.to_string(),
        count,
        mean: round2(mean),
        std: round2(variance.sqrt()),
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Frequency distribution for one categorical column. Missing cells are
/// dropped before stringification; the mode is the first key to reach the
/// highest count, which the insertion-ordered map makes deterministic.
pub fn summarize_categorical(rows: &[DataRow], column: &str) -> CategoricalStats {
    let values: Vec<String> = column_values(rows, column)
        .iter()
        .filter(|v| !v.is_missing())
        .map(|v| v.lexical())
        .collect();

    let mut distribution: IndexMap<String, usize> = IndexMap::new();
    for value in &values {
        *distribution.entry(value.clone()).or_insert(0) += 1;
    }

    let (top, freq) = distribution
        .iter()
        .fold((String::new(), 0), |(top, freq), (value, count)| {
            if *count > freq {
                (value.clone(), *count)
            } else {
                (top, freq)
            }
        });

    CategoricalStats {
        column: column.to_string(),
        count: values.len(),
        unique: distribution.len(),
        top,
        freq,
        distribution,
    }
}
