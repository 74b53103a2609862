use axum::{
    extract::State,
    routing::post,
    Router,
    Json,
    http::Method,
};
use serde::Deserialize;
use std::sync::Arc;
use crate::{
    AppState,
    error::AppError,
    services::{
        eda::{self, DataRow, EdaResult},
        ingest,
    },
};
use tower_http::cors::{Any, CorsLayer};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/datasets/analyze", post(analyze_dataset))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct FileInfo {
    #[serde(rename = "type")]
    file_type: String,
    signed_url: String,
}

/// Either inline rows or a file reference must be present. Inline rows win
/// when both are sent.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    file_name: String,
    rows: Option<Vec<DataRow>>,
    file: Option<FileInfo>,
}

#[axum::debug_handler]
async fn analyze_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<EdaResult>, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Starting analysis for dataset: {}", request.file_name);

    let rows = match (request.rows, request.file) {
        (Some(rows), _) => rows,
        (None, Some(file_info)) => {
            tracing::info!(
                "Downloading {} file, URL length: {}",
                file_info.file_type,
                file_info.signed_url.len()
            );
            let download_start = std::time::Instant::now();
            let file_data = ingest::load_file_from_url(&file_info.signed_url).await?;
            tracing::info!(
                "File downloaded, size: {}KB, took: {:?}",
                file_data.len() / 1024,
                download_start.elapsed()
            );

            if file_data.len() > state.config.max_file_size {
                return Err(AppError::InvalidInput(format!(
                    "File exceeds the {}MB limit",
                    state.config.max_file_size / (1024 * 1024)
                )));
            }

            ingest::parse_file(file_data, &file_info.file_type)?
        }
        (None, None) => {
            return Err(AppError::InvalidInput(
                "Either rows or a file reference must be provided".to_string(),
            ));
        }
    };

    tracing::info!("Analyzing {} rows...", rows.len());
    let analysis_start = std::time::Instant::now();
    let result =
        eda::run_eda_with_insights(&rows, &request.file_name, state.insights.as_ref()).await?;
    tracing::info!(
        "EDA completed in {:?}: {} columns, {} recommendations",
        analysis_start.elapsed(),
        result.dataset_info.total_columns,
        result.recommendations.len()
    );

    tracing::info!("Total processing completed in {:?}", start.elapsed());

    Ok(Json(result))
}
