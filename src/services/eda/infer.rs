use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use super::types::{CellValue, ColumnType};

const BOOLEAN_TOKENS: [&str; 6] = ["true", "false", "1", "0", "yes", "no"];

/// Fraction of non-missing values that must parse for a column to be typed
/// numeric or datetime.
const TYPE_THRESHOLD: f64 = 0.8;

/// Classifies a column from its raw values. Pure function of the values, so
/// re-running it always yields the same type.
///
/// The checks run in a fixed priority order: boolean, numeric, datetime,
/// categorical. Boolean runs before numeric on purpose, so a column holding
/// only "0"/"1" is typed boolean.
pub fn infer_column_type(values: &[CellValue]) -> ColumnType {
    let non_null: Vec<&CellValue> = values.iter().filter(|v| !v.is_missing()).collect();

    if non_null.is_empty() {
        return ColumnType::Categorical;
    }

    let distinct: HashSet<String> = non_null.iter().map(|v| v.lexical().to_lowercase()).collect();
    if distinct.len() <= 2 && distinct.iter().all(|v| BOOLEAN_TOKENS.contains(&v.as_str())) {
        return ColumnType::Boolean;
    }

    let total = non_null.len() as f64;

    let numeric_count = non_null.iter().filter(|v| v.as_f64().is_some()).count();
    if numeric_count as f64 / total > TYPE_THRESHOLD {
        return ColumnType::Numeric;
    }

    let date_count = non_null.iter().filter(|v| is_date_value(v)).count();
    if date_count as f64 / total > TYPE_THRESHOLD {
        return ColumnType::Datetime;
    }

    ColumnType::Categorical
}

fn is_date_value(value: &CellValue) -> bool {
    match value {
        CellValue::Text(s) => is_date_string(s),
        _ => false,
    }
}

pub fn is_date_string(s: &str) -> bool {
    let patterns = [
        r"^\d{4}-\d{2}-\d{2}$",
        r"^\d{2}/\d{2}/\d{4}$",
        r"^\d{4}/\d{2}/\d{2}$",
        r"^\d{2}-\d{2}-\d{4}$",
    ];
    if patterns
        .iter()
        .any(|pattern| Regex::new(pattern).map_or(false, |re| re.is_match(s)))
    {
        return true;
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    datetime_formats
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(s, format).is_ok())
        || NaiveDate::parse_from_str(s, "%B %d, %Y").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|s| CellValue::Text(s.to_string())).collect()
    }

    #[test]
    fn zero_one_column_is_boolean_not_numeric() {
        let values = texts(&["1", "0", "1", "1"]);
        assert_eq!(infer_column_type(&values), ColumnType::Boolean);
    }

    #[test]
    fn yes_no_column_is_boolean() {
        let values = texts(&["Yes", "no", "YES", "no"]);
        assert_eq!(infer_column_type(&values), ColumnType::Boolean);
    }

    #[test]
    fn mostly_numeric_column_is_numeric() {
        // 5 of 6 parse, 0.83 > 0.8
        let values = texts(&["1", "2", "3.5", "4", "n/a", "6"]);
        assert_eq!(infer_column_type(&values), ColumnType::Numeric);
    }

    #[test]
    fn exactly_eighty_percent_numeric_is_not_numeric() {
        // threshold is strict: 4 of 5 = 0.8 does not clear it
        let values = texts(&["1", "2", "3", "4", "x"]);
        assert_eq!(infer_column_type(&values), ColumnType::Categorical);
    }

    #[test]
    fn date_column_is_datetime() {
        let values = texts(&[
            "2024-01-01",
            "2024-02-15",
            "2024-03-30",
            "2024-12-25",
            "2025-06-01",
            "oops",
        ]);
        assert_eq!(infer_column_type(&values), ColumnType::Datetime);
    }

    #[test]
    fn empty_column_defaults_to_categorical() {
        let values = vec![CellValue::Null, CellValue::Text(String::new())];
        assert_eq!(infer_column_type(&values), ColumnType::Categorical);
    }

    #[test]
    fn mixed_text_is_categorical() {
        let values = texts(&["red", "green", "blue", "red"]);
        assert_eq!(infer_column_type(&values), ColumnType::Categorical);
    }

    #[test]
    fn inference_is_idempotent() {
        let values = texts(&["1", "2", "three", "4", "5"]);
        let first = infer_column_type(&values);
        assert_eq!(infer_column_type(&values), first);
        assert_eq!(infer_column_type(&values), first);
    }

    #[test]
    fn numeric_cells_count_toward_numeric() {
        let values = vec![
            CellValue::Number(1.5),
            CellValue::Number(2.0),
            CellValue::Text("3".into()),
            CellValue::Null,
        ];
        assert_eq!(infer_column_type(&values), ColumnType::Numeric);
    }
}
