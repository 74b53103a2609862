use std::time::{Duration, Instant};

use super::correlate::correlation_matrix;
use super::outliers::detect_outliers;
use super::profile::analyze_dataset;
use super::stats::{round1, summarize_categorical, summarize_numeric};
use super::types::{ColumnType, DataRow, EdaError, EdaResult, MissingValueSummary, SAMPLE_ROWS};
use crate::services::insights::{rule_based_recommendations, InsightGenerator};

const INSIGHT_TIMEOUT: Duration = Duration::from_secs(30);

/// Full analysis pass over one dataset snapshot: type inference, profiling,
/// per-column statistics, correlations and outlier detection. Pure function
/// of (rows, file_name); recommendations are left empty for the caller.
pub fn run_eda(rows: &[DataRow], file_name: &str) -> Result<EdaResult, EdaError> {
    let start = Instant::now();
    let dataset_info = analyze_dataset(rows, file_name)?;

    let numeric_columns: Vec<String> = dataset_info
        .columns
        .iter()
        .filter(|col| col.column_type == ColumnType::Numeric)
        .map(|col| col.name.clone())
        .collect();
    let categorical_columns: Vec<String> = dataset_info
        .columns
        .iter()
        .filter(|col| col.column_type == ColumnType::Categorical)
        .map(|col| col.name.clone())
        .collect();

    let mut numeric_stats = Vec::with_capacity(numeric_columns.len());
    for column in &numeric_columns {
        match summarize_numeric(rows, column) {
            Ok(stats) => numeric_stats.push(stats),
            // an inferred-numeric column always has coercible values, so
            // this only fires on an invariant violation upstream
            Err(e) => tracing::warn!("skipping numeric column: {}", e),
        }
    }

    let categorical_stats = categorical_columns
        .iter()
        .map(|column| summarize_categorical(rows, column))
        .collect();

    let missing_values: Vec<MissingValueSummary> = dataset_info
        .columns
        .iter()
        .filter(|col| col.null_count > 0)
        .map(|col| MissingValueSummary {
            column: col.name.clone(),
            count: col.null_count,
            percentage: round1(col.null_percentage),
        })
        .collect();

    let correlations = correlation_matrix(rows, &numeric_columns);

    let outliers = numeric_columns
        .iter()
        .filter_map(|column| detect_outliers(rows, column))
        .collect();

    tracing::info!(
        "EDA completed in {:?}: {} rows, {} columns ({} numeric, {} categorical)",
        start.elapsed(),
        dataset_info.total_rows,
        dataset_info.total_columns,
        numeric_columns.len(),
        categorical_columns.len()
    );

    Ok(EdaResult {
        dataset_info,
        numeric_stats,
        categorical_stats,
        missing_values,
        correlations,
        outliers,
        recommendations: Vec::new(),
    })
}

/// Runs the analysis, then makes a single bounded call to the insight
/// generator. Any failure - error, timeout or an empty answer - substitutes
/// the rule-based recommendations; the analysis itself is never lost.
pub async fn run_eda_with_insights(
    rows: &[DataRow],
    file_name: &str,
    insights: &dyn InsightGenerator,
) -> Result<EdaResult, EdaError> {
    let mut result = run_eda(rows, file_name)?;

    let sample = &rows[..rows.len().min(SAMPLE_ROWS)];
    let recommendations =
        match tokio::time::timeout(INSIGHT_TIMEOUT, insights.generate_insights(&result, sample)).await
        {
            Ok(Ok(recs)) if !recs.is_empty() => recs,
            Ok(Ok(_)) => {
                tracing::warn!("insight generator returned nothing, using rule-based fallback");
                rule_based_recommendations(&result)
            }
            Ok(Err(e)) => {
                tracing::warn!("insight generation failed: {}, using rule-based fallback", e);
                rule_based_recommendations(&result)
            }
            Err(_) => {
                tracing::warn!("insight generation timed out, using rule-based fallback");
                rule_based_recommendations(&result)
            }
        };

    result.recommendations = recommendations;
    Ok(result)
}
