pub mod analyzer;
pub mod correlate;
pub mod infer;
pub mod outliers;
pub mod profile;
pub mod stats;
pub mod types;

pub use analyzer::{run_eda, run_eda_with_insights};
pub use types::{DataRow, EdaError, EdaResult};
