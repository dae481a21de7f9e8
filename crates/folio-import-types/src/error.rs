//! Error types for the import system

use thiserror::Error;

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by an `EntityRepository`
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced entity does not exist
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Write collides with an existing entity (duplicate slug, login, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store refused the write (missing column, invalid value, ...)
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(String),
}

/// Errors that can occur during import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// Malformed value supplied by a row (empty path, unparsable URL, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input directory missing or not a directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// No importer registered for the requested type
    #[error("Unsupported import type: {0}")]
    UnsupportedType(String),

    /// No adapter registered for the requested source
    #[error("Unsupported import source: {0}")]
    UnsupportedSource(String),

    /// Row needs a collaborator that is not configured (e.g. SEO mapping)
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// Discovery found nothing the adapter can read
    #[error("No supported files found (expected extensions: {extensions})")]
    NoFiles { extensions: String },

    /// A source file could not be read or parsed
    #[error("Failed to import {file}: {message}")]
    Adapter { file: String, message: String },

    /// File discovery failed (unreadable directory, bad pattern)
    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
