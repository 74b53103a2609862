pub mod eda;
pub mod ingest;
pub mod insights;
