use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DubplateError {
    #[error("Dubplate error: {0}")]
    Generic(String),
    #[error(transparent)]
    Expected(#[from] DubplateExpectedError),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Conditions that are reported to the user rather than terminating the process.
#[derive(Error, Debug)]
pub enum DubplateExpectedError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },
    #[error("Invalid file format: {format}")]
    InvalidFileFormat { format: String },
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },
    #[error("Failed to decode configuration file {path}: {message}")]
    ConfigDecode { path: PathBuf, message: String },
    #[error("Invalid value for {key} in configuration file: {message}")]
    InvalidConfigValue { key: String, message: String },
    #[error("Failed to read {path}: {message}")]
    ImportUnreadable { path: PathBuf, message: String },
    #[error("Failed to write export to {path}: {message}")]
    ExportFailed { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, DubplateError>;
