//! Error types for the line filter service.
//!
//! - [`CsvError`] - CSV reading and writing errors (drive the pass-through path)
//! - [`PipelineError`] - File-level processing errors (CLI `filter` command)
//! - [`ServerError`] - HTTP transport errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or writing CSV.
///
/// None of these reach an HTTP client: the CSV processor turns them into a
/// pass-through of the original text.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The `csv` reader or writer failed.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// A `"` appeared inside an unquoted field.
    #[error("Line {line}: bare \" in non-quoted field")]
    BareQuote { line: usize },

    /// A closing `"` was followed by something other than a delimiter or newline.
    #[error("Line {line}: extraneous or missing \" in quoted field")]
    ExtraneousQuote { line: usize },

    /// Input ended inside a quoted field.
    #[error("Line {line}: quoted field is never closed")]
    UnterminatedQuote { line: usize },

    /// No records at all.
    #[error("CSV input is empty")]
    EmptyInput,

    /// Serializing the transformed table failed.
    #[error("Failed to write CSV: {0}")]
    Writer(String),
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Errors while preparing input for the processors outside of HTTP.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Failed to read or write a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV features document could not be parsed.
    #[error("Invalid CSV features: {0}")]
    Features(#[from] serde_json::Error),

    /// Input bytes could not be decoded to text.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request body is not a valid filter request.
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request body exceeded the configured limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
