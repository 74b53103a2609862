use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const SAMPLE_VALUES: usize = 5;
pub const SAMPLE_ROWS: usize = 10;

/// One cell of an uploaded dataset. Uploads arrive loosely typed, so every
/// coercion happens explicitly at analysis time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Absent cells, JSON nulls and empty strings all count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion shared by the summarizer, the correlation engine and
    /// the outlier detector. Returns None for missing or non-numeric cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// String form used for uniqueness, frequency maps and boolean detection.
    /// Whole numbers render without a trailing ".0" so "1" and 1 collapse to
    /// the same key, matching how the cells looked in the source file.
    pub fn lexical(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// A single row keyed by column name. Insertion order is preserved so the
/// column order of the upload survives into the analysis output.
pub type DataRow = IndexMap<String, CellValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Datetime,
    Boolean,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Datetime => "datetime",
            ColumnType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
    pub sample_values: SmallVec<[CellValue; SAMPLE_VALUES]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnInfo>,
    pub sample_data: Vec<DataRow>,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NumericStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoricalStats {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: String,
    pub freq: usize,
    pub distribution: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingValueSummary {
    pub column: String,
    pub count: usize,
    /// Rounded to one decimal; the rule-based recommender compares against
    /// this rounded figure so thresholds match what the user sees.
    pub percentage: f64,
}

/// Square, symmetric, keyed by numeric column name on both axes.
pub type CorrelationMatrix = IndexMap<String, IndexMap<String, f64>>;

#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub column: String,
    pub outlier_count: usize,
    pub outlier_indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdaResult {
    pub dataset_info: DatasetInfo,
    pub numeric_stats: Vec<NumericStats>,
    pub categorical_stats: Vec<CategoricalStats>,
    pub missing_values: Vec<MissingValueSummary>,
    pub correlations: CorrelationMatrix,
    pub outliers: Vec<OutlierReport>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EdaError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("numeric column '{0}' has no coercible values")]
    DegenerateColumn(String),
}
