//! Error types for the msgtmpl application.
//!
//! Storage and network failures are recovered inside the store and only
//! logged; the remaining variants surface through the CLI.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::TemplateId;

/// The main error type for the msgtmpl application.
#[derive(Error, Debug)]
pub enum TmplError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted data was malformed or could not be read.
    #[error("Failed to read templates from storage key '{key}': {message}")]
    StorageRead { key: String, message: String },

    /// Persisting templates failed.
    #[error("Failed to save templates to storage key '{key}': {message}")]
    StorageWrite { key: String, message: String },

    /// Loading templates from a remote server failed.
    #[error("Failed to load templates from {url}: {message}")]
    Network { url: String, message: String },

    /// Template was not found when performing an operation.
    #[error("Template not found: {id}")]
    TemplateNotFound { id: TemplateId },

    /// Rejected user input.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    #[error("{message}")]
    EditorError { message: String },
}
