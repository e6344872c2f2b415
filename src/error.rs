use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PlacesError {
    #[error("invalid year: {0} (not in the dataset registry)")]
    #[diagnostic(help("run `places list` to see the registered years"))]
    InvalidYear(u16),

    #[error("invalid health measure: {0}")]
    #[diagnostic(help("run `places measures` to see the known measure codes"))]
    InvalidMeasure(String),

    #[error("invalid measure category: {0}")]
    InvalidCategory(String),

    #[error("unknown state abbreviation: {0}")]
    InvalidState(String),

    #[error("invalid artifact name: {0}")]
    InvalidName(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("download request failed: {0}")]
    DownloadHttp(String),

    #[error("download returned status {status}: {message}")]
    DownloadStatus { status: u16, message: String },

    #[error("dataset for year {0} not found locally")]
    DatasetNotFound(u16),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl PlacesError {
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            PlacesError::DownloadHttp(_) | PlacesError::DownloadStatus { .. }
        )
    }
}
