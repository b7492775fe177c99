//! Transformation module.
//!
//! - Text: line-oriented dedupe and cleanup
//! - Stages: the column-aware CSV stages
//! - Pipeline: CSV processor and request dispatch

pub mod pipeline;
pub mod stages;
pub mod text;

pub use pipeline::*;
pub use stages::run_stages;
pub use text::process_text;
