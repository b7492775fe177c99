//! # Line Filter - text and CSV cleanup service
//!
//! Deduplicates, trims and reshapes text or CSV payloads, returning the
//! result with summary statistics.
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────────┐
//!                 ┌───▶│  Text processor  │───┐
//! ┌───────────┐   │    └──────────────────┘   │    ┌──────────────────┐
//! │  Request  │───┤                           ├───▶│  FilterResponse  │
//! │ (fileName)│   │    ┌──────────────────┐   │    └──────────────────┘
//! └───────────┘   └───▶│   CSV stages     │───┘
//!                      └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linefilter::{process_text, FilterOptions};
//!
//! let options = FilterOptions { ignore_blanks: true, ..FilterOptions::default() };
//! let result = process_text("a\n\na\nb", &options);
//! assert_eq!(result.filtered_text, "a\nb");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Requests, responses and the CSV table
//! - [`parser`] - CSV reading/writing and encoding detection
//! - [`transform`] - Text processor, CSV stages and dispatch
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server and metrics log

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Configuration and logging
pub mod config;
pub mod logging;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CsvFeatures,
    CsvFilter,
    CsvSort,
    CsvTopN,
    FilterOptions,
    FilterRequest,
    FilterResponse,
    Mode,
    Row,
    SortDirection,
    Table,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_auto, parse_table, write_table};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    filter_file,
    filter_request,
    load_features,
    process_csv,
    process_text,
    run_stages,
    CsvOutcome,
    FilterOutcome,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::{build_router, AppState, MetricSample, MetricsLog, MetricsSink};
pub use config::ServerConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
