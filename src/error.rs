use thiserror::Error;

use crate::model::Table;

pub type Result<T> = std::result::Result<T, BrtError>;

#[derive(Debug, Error)]
pub enum BrtError {
    #[error("Data format error in {table}: {message}")]
    DataFormat { table: Table, message: String },
    #[error("Time bin '{label}' in {table} is not part of the load table's time bins")]
    UnknownTimeBin { table: Table, label: String },
    #[error("Invalid source '{location}': {message}")]
    InvalidSource { location: String, message: String },
    #[error("Invalid filter selection: {0}")]
    InvalidSelection(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrtError {
    pub fn data_format(table: Table, message: impl Into<String>) -> Self {
        BrtError::DataFormat {
            table,
            message: message.into(),
        }
    }

    /// Errors that mean the session has no usable dataset at all.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            BrtError::DataFormat { .. } | BrtError::UnknownTimeBin { .. } | BrtError::Csv(_)
        )
    }
}
