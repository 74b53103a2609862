use super::stats::quantile;
use super::types::{DataRow, OutlierReport};

/// IQR-fence outlier detection for one numeric column. Coercion matches the
/// numeric summarizer exactly, so the fences are computed on the same value
/// set the statistics describe. Returns None when nothing falls outside the
/// fences, keeping the report list sparse.
pub fn detect_outliers(rows: &[DataRow], column: &str) -> Option<OutlierReport> {
    let indexed: Vec<(usize, f64)> = rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row.get(column).and_then(|v| v.as_f64()).map(|v| (idx, v)))
        .collect();

    if indexed.is_empty() {
        return None;
    }

    let mut sorted: Vec<f64> = indexed.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;

    let outlier_indices: Vec<usize> = indexed
        .iter()
        .filter(|(_, v)| *v < lower || *v > upper)
        .map(|(idx, _)| *idx)
        .collect();

    if outlier_indices.is_empty() {
        return None;
    }

    Some(OutlierReport {
        column: column.to_string(),
        outlier_count: outlier_indices.len(),
        outlier_indices,
    })
}
