//! Error types for formdesk.
//!
//! This module defines all error types used throughout the formdesk crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::state::Rejection;

/// The main error type for formdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Command Errors ===
    /// A command was refused and the state was left untouched.
    #[error("{0}")]
    Rejected(Rejection),

    /// No form matches the given id or title.
    #[error("no form matches '{reference}'")]
    FormNotFound {
        /// The id or title that was looked up.
        reference: String,
    },

    /// A `FIELD=VALUE` argument without a field name or `=`.
    #[error("expected FIELD=VALUE, got '{argument}'")]
    InvalidAssignment {
        /// The argument as given.
        argument: String,
    },

    // === Export Errors ===
    /// Writing the spreadsheet file failed.
    #[error("failed to write spreadsheet {path}: {source}")]
    SpreadsheetWrite {
        /// Destination of the spreadsheet.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// The table has more rows or columns than a worksheet can hold.
    #[error("table of {rows} rows and {columns} columns does not fit in a worksheet")]
    SheetTooLarge {
        /// Rows requested, header included.
        rows: usize,
        /// Columns requested, timestamp included.
        columns: usize,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for formdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl Error {
    /// Create a form-not-found error.
    #[must_use]
    pub fn form_not_found(reference: impl Into<String>) -> Self {
        Self::FormNotFound {
            reference: reference.into(),
        }
    }
}
