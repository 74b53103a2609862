use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, Role,
    },
    Client,
};
use async_trait::async_trait;

use crate::error::AppError;
use crate::services::eda::types::{ColumnType, DataRow, EdaResult};

/// Capability interface for the recommendation text on an analysis result.
/// Two implementations exist: the OpenAI-backed one and the deterministic
/// rule-based one the orchestrator falls back to.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate_insights(
        &self,
        result: &EdaResult,
        sample_rows: &[DataRow],
    ) -> Result<Vec<String>, AppError>;
}

pub struct OpenAiInsights {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiInsights {
    pub fn new(api_key: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[async_trait]
impl InsightGenerator for OpenAiInsights {
    async fn generate_insights(
        &self,
        result: &EdaResult,
        sample_rows: &[DataRow],
    ) -> Result<Vec<String>, AppError> {
        let prompt = build_insights_prompt(result, sample_rows)?;

        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt),
                name: None,
                role: Role::User,
            },
        )];

        let request = CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(0.1),
            ..Default::default()
        };

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::LlmError(e.to_string()))?;

        let content = response.choices[0].message.content.clone().unwrap_or_default();

        let insights = parse_insight_lines(&content);
        if insights.is_empty() {
            return Err(AppError::LlmError(
                "no insight lines found in model response".to_string(),
            ));
        }
        Ok(insights)
    }
}

fn parse_insight_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix('\u{2022}')
                .or_else(|| line.strip_prefix("- "))
                .map(str::trim)
        })
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn build_insights_prompt(result: &EdaResult, sample_rows: &[DataRow]) -> Result<String, AppError> {
    let info = &result.dataset_info;

    let column_lines: Vec<String> = info
        .columns
        .iter()
        .map(|col| {
            format!(
                "- {} ({}): {} missing values ({:.1}%), {} unique values",
                col.name, col.column_type, col.null_count, col.null_percentage, col.unique_count
            )
        })
        .collect();

    let numeric_lines: Vec<String> = result
        .numeric_stats
        .iter()
        .map(|s| {
            format!(
                "- {}: mean={}, std={}, range=[{}, {}]",
                s.column, s.mean, s.std, s.min, s.max
            )
        })
        .collect();

    let categorical_lines: Vec<String> = result
        .categorical_stats
        .iter()
        .map(|s| {
            format!(
                "- {}: {} unique values, most frequent=\"{}\" ({} times)",
                s.column, s.unique, s.top, s.freq
            )
        })
        .collect();

    let missing_lines: Vec<String> = result
        .missing_values
        .iter()
        .map(|mv| format!("- {}: {} missing ({}%)", mv.column, mv.count, mv.percentage))
        .collect();

    let outlier_lines: Vec<String> = result
        .outliers
        .iter()
        .map(|ol| format!("- {}: {} potential outliers", ol.column, ol.outlier_count))
        .collect();

    let sample = serde_json::to_string_pretty(&sample_rows.iter().take(3).collect::<Vec<_>>())?;

    Ok(format!(
        r#"As a professional data analyst, analyze this dataset and provide 5-7 specific, actionable insights and recommendations. Use the actual column names and data patterns from the analysis below.

Dataset: {}
Rows: {}
Columns: {}

Column Information:
{}

Numeric Statistics:
{}

Categorical Statistics:
{}

Missing Values:
{}

Outliers Detected:
{}

Sample Data (first few rows):
{}

Please provide specific, actionable insights that:
1. Reference actual column names from the dataset
2. Highlight interesting patterns or anomalies
3. Suggest data cleaning steps if needed
4. Recommend further analysis directions
5. Point out potential data quality issues
6. Suggest business insights if patterns are evident

Format as a simple list of 4-6 concise insights, each on a new line starting with "•".
Keep each insight to 1-2 sentences maximum. Do not use markdown formatting like ** or *."#,
        info.file_name,
        info.total_rows,
        info.total_columns,
        column_lines.join("\n"),
        numeric_lines.join("\n"),
        categorical_lines.join("\n"),
        missing_lines.join("\n"),
        outlier_lines.join("\n"),
        sample,
    ))
}

/// Deterministic fallback used whenever the live generator is unavailable
/// or fails.
pub struct RuleBasedInsights;

#[async_trait]
impl InsightGenerator for RuleBasedInsights {
    async fn generate_insights(
        &self,
        result: &EdaResult,
        _sample_rows: &[DataRow],
    ) -> Result<Vec<String>, AppError> {
        Ok(rule_based_recommendations(result))
    }
}

/// Threshold-based recommendations over the computed result. Compares
/// against the rounded missing-value percentages so the advice matches the
/// figures shown to the user.
pub fn rule_based_recommendations(result: &EdaResult) -> Vec<String> {
    let info = &result.dataset_info;
    let mut recommendations = Vec::new();

    for mv in &result.missing_values {
        if mv.percentage > 50.0 {
            recommendations.push(format!(
                "Consider dropping column '{}' - it has {}% missing values",
                mv.column, mv.percentage
            ));
        } else if mv.percentage > 10.0 {
            recommendations.push(format!(
                "Address missing values in '{}' ({}%) - consider imputation or removal",
                mv.column, mv.percentage
            ));
        }
    }

    for ol in &result.outliers {
        if ol.outlier_count as f64 > info.total_rows as f64 * 0.05 {
            recommendations.push(format!(
                "Review outliers in '{}' - {} potential outliers detected",
                ol.column, ol.outlier_count
            ));
        }
    }

    if info.total_rows < 100 {
        recommendations.push("Small dataset - consider gathering more data for robust analysis".to_string());
    }

    for col in &info.columns {
        if col.column_type == ColumnType::Categorical
            && col.unique_count as f64 > info.total_rows as f64 * 0.5
        {
            recommendations.push(format!(
                "Column '{}' has high cardinality - consider grouping or encoding strategies",
                col.name
            ));
        }
    }

    if recommendations.is_empty() {
        recommendations.push("Dataset looks clean! Ready for analysis and modeling.".to_string());
    }

    recommendations
}
