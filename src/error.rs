// Error types shared by the loader, the report layer and the binary.

use crate::schema::{Column, Feature};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AriError>;

#[derive(Debug, Error)]
pub enum AriError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A derived table cannot be produced because its input column is absent.
    #[error("{feature} unavailable: column '{column}' not present in dataset")]
    MissingColumn { feature: Feature, column: Column },

    #[error("No data loaded")]
    NoData,
}

impl AriError {
    /// True for errors that only disable one derived table.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AriError::MissingColumn { .. })
    }
}
