use indexmap::IndexMap;

use super::types::{CorrelationMatrix, DataRow};

/// Pearson correlation for every ordered pair of numeric columns, the
/// diagonal included. Each cell is computed independently rather than
/// mirrored, so symmetry falls out of the formula instead of a copy.
pub fn correlation_matrix(rows: &[DataRow], numeric_columns: &[String]) -> CorrelationMatrix {
    let mut correlations = CorrelationMatrix::new();

    for col1 in numeric_columns {
        let mut row_entry = IndexMap::new();
        for col2 in numeric_columns {
            row_entry.insert(col2.clone(), pearson(rows, col1, col2));
        }
        correlations.insert(col1.clone(), row_entry);
    }

    correlations
}

/// Coefficient over the rows where both columns coerce to a number, rounded
/// to three decimals. Constant columns produce a zero denominator and map
/// to 0 rather than dividing.
fn pearson(rows: &[DataRow], col1: &str, col2: &str) -> f64 {
    let mut values1 = Vec::new();
    let mut values2 = Vec::new();
    for row in rows {
        let a = row.get(col1).and_then(|v| v.as_f64());
        let b = row.get(col2).and_then(|v| v.as_f64());
        if let (Some(a), Some(b)) = (a, b) {
            values1.push(a);
            values2.push(b);
        }
    }

    if values1.len() != values2.len() || values1.is_empty() {
        return 0.0;
    }

    let n = values1.len() as f64;
    let mean1 = values1.iter().sum::<f64>() / n;
    let mean2 = values2.iter().sum::<f64>() / n;

    let numerator: f64 = values1
        .iter()
        .zip(&values2)
        .map(|(a, b)| (a - mean1) * (b - mean2))
        .sum();
    let ss1: f64 = values1.iter().map(|v| (v - mean1).powi(2)).sum();
    let ss2: f64 = values2.iter().map(|v| (v - mean2).powi(2)).sum();
    let denominator = (ss1 * ss2).sqrt();

    if denominator == 0.0 {
        return 0.0;
    }

    round3(numerator / denominator)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::eda::types::CellValue;
    use indexmap::indexmap;

    fn rows2(a: &[f64], b: &[f64]) -> Vec<DataRow> {
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                indexmap! {
                    "a".to_string() => CellValue::Number(*x),
                    "b".to_string() => CellValue::Number(*y),
                }
            })
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn perfectly_anti_correlated_columns() {
        let rows = rows2(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        let m = correlation_matrix(&rows, &cols(&["a", "b"]));
        assert_eq!(m["a"]["b"], -1.0);
        assert_eq!(m["b"]["a"], -1.0);
    }

    #[test]
    fn diagonal_is_one() {
        let rows = rows2(&[1.0, 5.0, 2.0, 8.0], &[0.5, 0.1, 0.9, 0.2]);
        let m = correlation_matrix(&rows, &cols(&["a", "b"]));
        assert_eq!(m["a"]["a"], 1.0);
        assert_eq!(m["b"]["b"], 1.0);
    }

    #[test]
    fn matrix_is_symmetric() {
        let rows = rows2(&[1.0, 4.0, 2.0, 9.0, 3.0], &[2.0, 3.0, 7.0, 1.0, 5.0]);
        let m = correlation_matrix(&rows, &cols(&["a", "b"]));
        assert_eq!(m["a"]["b"], m["b"]["a"]);
        assert!(m["a"]["b"].abs() <= 1.0);
    }

    #[test]
    fn constant_column_correlates_to_zero() {
        let rows = rows2(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]);
        let m = correlation_matrix(&rows, &cols(&["a", "b"]));
        assert_eq!(m["a"]["b"], 0.0);
    }

    #[test]
    fn rows_missing_either_value_are_skipped() {
        let rows = vec![
            indexmap! { "a".to_string() => CellValue::Number(1.0), "b".to_string() => CellValue::Number(3.0) },
            indexmap! { "a".to_string() => CellValue::Number(2.0), "b".to_string() => CellValue::Null },
            indexmap! { "a".to_string() => CellValue::Number(2.0), "b".to_string() => CellValue::Number(2.0) },
            indexmap! { "a".to_string() => CellValue::Number(3.0), "b".to_string() => CellValue::Number(1.0) },
        ];
        let m = correlation_matrix(&rows, &cols(&["a", "b"]));
        assert_eq!(m["a"]["b"], -1.0);
    }

    #[test]
    fn keys_match_numeric_columns_exactly() {
        let rows = rows2(&[1.0, 2.0], &[2.0, 4.0]);
        let m = correlation_matrix(&rows, &cols(&["a", "b"]));
        assert_eq!(m.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(m["a"].keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn rounded_to_three_decimals() {
        let rows = rows2(&[1.0, 2.0, 3.0, 4.0, 6.0], &[1.0, 3.0, 2.0, 5.0, 4.0]);
        let m = correlation_matrix(&rows, &cols(&["a", "b"]));
        let c = m["a"]["b"];
        assert_eq!(c, (c * 1000.0).round() / 1000.0);
    }
}
