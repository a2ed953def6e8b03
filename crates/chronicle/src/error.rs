//! Error types for chronicle models.

use std::error::Error;
use std::fmt;

/// Errors produced when constructing a selection model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The model forbids an empty selection but no default was provided.
    EmptyDefaultSelection,
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::EmptyDefaultSelection => {
                write!(f, "selection cannot be empty but no default selection was provided")
            }
        }
    }
}

impl Error for SelectionError {}

/// Errors produced while rendering an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// An item could not be serialized to an intermediate JSON value.
    Serialize(String),
    /// CSV rendering failed.
    Csv(String),
    /// JSON rendering failed.
    Json(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Serialize(detail) => write!(f, "failed to serialize export item: {detail}"),
            ExportError::Csv(detail) => write!(f, "failed to render CSV export: {detail}"),
            ExportError::Json(detail) => write!(f, "failed to render JSON export: {detail}"),
        }
    }
}

impl Error for ExportError {}
