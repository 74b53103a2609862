use indexmap::IndexSet;
use smallvec::SmallVec;

use super::infer::infer_column_type;
use super::types::{
    CellValue, ColumnInfo, DataRow, DatasetInfo, EdaError, SAMPLE_ROWS, SAMPLE_VALUES,
};

/// Builds the dataset metadata: one pass per column over every row, counting
/// nulls and uniques and collecting sample values.
///
/// Column order follows the first row; rows missing a key contribute a null
/// for that column.
pub fn analyze_dataset(rows: &[DataRow], file_name: &str) -> Result<DatasetInfo, EdaError> {
    if rows.is_empty() {
        return Err(EdaError::EmptyDataset);
    }

    let column_names: Vec<String> = rows[0].keys().cloned().collect();

    let columns = column_names
        .iter()
        .map(|name| profile_column(rows, name))
        .collect::<Vec<_>>();

    Ok(DatasetInfo {
        total_rows: rows.len(),
        total_columns: column_names.len(),
        columns,
        sample_data: rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        file_name: file_name.to_string(),
    })
}

/// All values of one column, in row order. Absent keys become nulls so every
/// column sees exactly `rows.len()` values.
pub fn column_values(rows: &[DataRow], name: &str) -> Vec<CellValue> {
    rows.iter()
        .map(|row| row.get(name).cloned().unwrap_or(CellValue::Null))
        .collect()
}

fn profile_column(rows: &[DataRow], name: &str) -> ColumnInfo {
    let values = column_values(rows, name);

    let mut null_count = 0;
    let mut seen = IndexSet::new();
    let mut sample_values: SmallVec<[CellValue; SAMPLE_VALUES]> = SmallVec::new();

    for value in &values {
        if value.is_missing() {
            null_count += 1;
        } else if seen.insert(value.lexical()) && sample_values.len() < SAMPLE_VALUES {
            sample_values.push(value.clone());
        }
    }

    ColumnInfo {
        name: name.to_string(),
        column_type: infer_column_type(&values),
        null_count,
        // stored unrounded, rounded only at the response edge
        null_percentage: null_count as f64 / rows.len() as f64 * 100.0,
        unique_count: seen.len(),
        sample_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::eda::types::ColumnType;
    use indexmap::indexmap;

    fn row(pairs: &[(&str, CellValue)]) -> DataRow {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = analyze_dataset(&[], "empty.csv").unwrap_err();
        assert!(matches!(err, EdaError::EmptyDataset));
    }

    #[test]
    fn null_count_plus_non_null_equals_total_rows() {
        let rows = vec![
            row(&[("city", text("Lisbon"))]),
            row(&[("city", CellValue::Null)]),
            row(&[("city", text(""))]),
            row(&[("city", text("Porto"))]),
        ];
        let info = analyze_dataset(&rows, "cities.csv").unwrap();
        let col = &info.columns[0];
        assert_eq!(col.null_count, 2);
        assert_eq!(col.unique_count, 2);
        assert_eq!(col.null_count + col.unique_count, info.total_rows);
        assert!((col.null_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_keys_count_as_nulls() {
        let rows = vec![
            row(&[("a", text("x")), ("b", text("y"))]),
            row(&[("a", text("z"))]),
        ];
        let info = analyze_dataset(&rows, "f.csv").unwrap();
        assert_eq!(info.total_columns, 2);
        assert_eq!(info.columns[1].null_count, 1);
    }

    #[test]
    fn sample_values_capped_to_first_five_uniques() {
        let rows: Vec<DataRow> = (0..8)
            .map(|i| indexmap! { "n".to_string() => text(&format!("v{}", i)) })
            .collect();
        let info = analyze_dataset(&rows, "f.csv").unwrap();
        let col = &info.columns[0];
        assert_eq!(col.unique_count, 8);
        assert_eq!(col.sample_values.len(), 5);
        assert_eq!(col.sample_values[0], text("v0"));
        assert_eq!(col.sample_values[4], text("v4"));
    }

    #[test]
    fn duplicate_values_keep_first_seen_order() {
        let rows = vec![
            row(&[("c", text("b"))]),
            row(&[("c", text("a"))]),
            row(&[("c", text("b"))]),
        ];
        let info = analyze_dataset(&rows, "f.csv").unwrap();
        let col = &info.columns[0];
        assert_eq!(col.unique_count, 2);
        assert_eq!(col.sample_values.as_slice(), &[text("b"), text("a")]);
    }

    #[test]
    fn column_types_come_from_inference() {
        let rows = vec![
            row(&[("amount", text("10")), ("label", text("alpha"))]),
            row(&[("amount", text("20")), ("label", text("beta"))]),
            row(&[("amount", text("30")), ("label", text("gamma"))]),
        ];
        let info = analyze_dataset(&rows, "f.csv").unwrap();
        assert_eq!(info.columns[0].column_type, ColumnType::Numeric);
        assert_eq!(info.columns[1].column_type, ColumnType::Categorical);
    }

    #[test]
    fn sample_data_is_first_ten_rows() {
        let rows: Vec<DataRow> = (0..25)
            .map(|i| indexmap! { "n".to_string() => CellValue::Number(i as f64) })
            .collect();
        let info = analyze_dataset(&rows, "f.csv").unwrap();
        assert_eq!(info.sample_data.len(), 10);
        assert_eq!(info.total_rows, 25);
    }
}
