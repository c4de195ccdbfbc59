use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("capacity threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("monthly total #{index} is {value}; totals must be non-negative")]
    InvalidSample { index: usize, value: f64 },

    #[error("projection horizon must be at least one month")]
    InvalidHorizon,

    #[error("{dataset} snapshot is missing required column `{column}`")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    #[error("row {row}: unrecognised date `{value}` (expected DD-MM-YYYY or YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: column `{column}` holds non-numeric value `{value}`")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
