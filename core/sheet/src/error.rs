//! FILENAME: core/sheet/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown sort method: {0}")]
    UnknownSortMethod(String),

    #[error("Sheet has been destroyed")]
    Destroyed,

    #[error("Node not found: {0}")]
    UnknownNode(String),
}

/// Failure of a single cell while drawing. Never aborts a render pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellDrawError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cell panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Custom(String),
}
