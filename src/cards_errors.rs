//! # Card Loading Error Types Module
//!
//! Errors raised while loading the card deck. All of them are fatal at
//! startup: the bot never runs with a partially loaded deck.

use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for card loading
#[derive(Debug, Error)]
pub enum CardsError {
    /// The CSV file does not exist
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The image directory does not exist
    #[error("Image directory not found: {}", .0.display())]
    ImageDirNotFound(PathBuf),
    /// Malformed CSV content
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),
    /// A required column is absent from the header or a row
    #[error("Invalid CSV format at row {row}: missing column '{column}'")]
    MissingColumn { row: usize, column: String },
    /// A row has an empty card name
    #[error("Error parsing row {row}: empty card name")]
    EmptyName { row: usize },
    /// No image file matches a card name
    #[error("Image not found for card '{name}' in {}", .dir.display())]
    MissingImage { name: String, dir: PathBuf },
    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
