use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use reqwest::Client;

use crate::error::AppError;
use crate::services::eda::types::{CellValue, DataRow};

/// Parses an uploaded file into rows according to its declared type. Cells
/// stay loosely typed; the EDA engine does all coercion.
pub fn parse_file(file_data: Bytes, file_type: &str) -> Result<Vec<DataRow>, AppError> {
    let file_type = file_type.to_lowercase();
    if file_type.contains("csv") {
        parse_csv_bytes(&file_data)
    } else if file_type.contains("xlsx") {
        parse_xlsx_bytes(file_data)
    } else {
        Err(AppError::InvalidInput(format!(
            "Unsupported file type: {}",
            file_type
        )))
    }
}

/// CSV with a header row. Fully empty lines are skipped; empty fields become
/// nulls.
pub fn parse_csv_bytes(data: &[u8]) -> Result<Vec<DataRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers = unique_headers(
        reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
    );

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row: DataRow = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                (header.clone(), cell_from_str(record.get(idx).unwrap_or("")))
            })
            .collect();
        rows.push(row);
    }

    tracing::info!("Parsed {} CSV rows with {} columns", rows.len(), headers.len());
    Ok(rows)
}

/// First worksheet of an XLSX workbook, first row as headers.
pub fn parse_xlsx_bytes(file_data: Bytes) -> Result<Vec<DataRow>, AppError> {
    let cursor = Cursor::new(file_data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| AppError::FileProcessingError(format!("Failed to open Excel file: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| AppError::FileProcessingError("No sheets found in workbook".to_string()))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| AppError::FileProcessingError(format!("Failed to read worksheet: {}", e)))?;

    let mut row_iter = range.rows();
    let headers = unique_headers(
        row_iter
            .next()
            .ok_or_else(|| AppError::FileProcessingError("Worksheet is empty".to_string()))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
    );

    let mut rows = Vec::new();
    for record in row_iter {
        if record.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let row: DataRow = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cell = record.get(idx).map_or(CellValue::Null, cell_from_excel);
                (header.clone(), cell)
            })
            .collect();
        rows.push(row);
    }

    tracing::info!(
        "Parsed {} rows with {} columns from sheet '{}'",
        rows.len(),
        headers.len(),
        sheet_name
    );
    Ok(rows)
}

pub async fn load_file_from_url(url: &str) -> Result<Bytes, AppError> {
    let client = Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::FileProcessingError(format!("Failed to fetch file: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::FileProcessingError(format!(
            "Failed to fetch file. Status: {}",
            response.status()
        )));
    }

    response
        .bytes()
        .await
        .map_err(|e| AppError::FileProcessingError(format!("Failed to read response bytes: {}", e)))
}

fn cell_from_str(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Null
    } else {
        CellValue::Text(field.to_string())
    }
}

fn cell_from_excel(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.is_empty() => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

/// Duplicate or blank headers get a stable suffix so rows can be keyed by
/// column name.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.is_empty() { format!("col_{}", idx) } else { name };
            let mut candidate = base.clone();
            let mut counter = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}_{}", base, counter);
                counter += 1;
            }
            candidate
        })
        .collect()
}
