//! Request dispatch and the CSV processor.
//!
//! A request is routed by its file name: `.csv` goes through the CSV stages,
//! everything else through [`process_text`]. CSV input that cannot be parsed is
//! handed back untouched as a [`CsvOutcome::PassThrough`].
//!
//! # Example
//!
//! ```rust,ignore
//! use linefilter::{filter_request, FilterRequest};
//!
//! let request = FilterRequest {
//!     text: "name,team\nann,red\nbo,red\n".into(),
//!     file_name: "people.csv".into(),
//!     ..FilterRequest::default()
//! };
//! let outcome = filter_request(&request);
//! println!("{} rows kept", outcome.response.unique_lines);
//! ```

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use super::stages::run_stages;
use super::text::process_text;
use crate::error::{CsvError, PipelineResult};
use crate::models::{CsvFeatures, FilterOptions, FilterRequest, FilterResponse, Mode};
use crate::parser::{decode_auto, parse_table, write_table};

// =============================================================================
// CSV Processor
// =============================================================================

/// Result of running the CSV processor.
#[derive(Debug)]
pub enum CsvOutcome {
    /// The input parsed and every configured stage ran.
    Transformed {
        /// Serialized output table.
        output: String,
        /// Data rows before any stage.
        input_rows: usize,
        /// Data rows after the last stage.
        output_rows: usize,
    },
    /// The input could not be parsed and is returned as-is.
    PassThrough { original: String, reason: CsvError },
}

impl CsvOutcome {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, CsvOutcome::PassThrough { .. })
    }
}

impl From<CsvOutcome> for FilterResponse {
    fn from(outcome: CsvOutcome) -> Self {
        match outcome {
            CsvOutcome::Transformed {
                output,
                input_rows,
                output_rows,
            } => FilterResponse {
                filtered_text: output,
                total_lines: input_rows,
                unique_lines: output_rows,
                duplicates_removed: 0,
                blanks_ignored: 0,
            },
            CsvOutcome::PassThrough { original, .. } => FilterResponse::pass_through(original),
        }
    }
}

/// Parse `text` as CSV, run the configured stages and serialize the result.
pub fn process_csv(text: &str, features: &CsvFeatures) -> CsvOutcome {
    let pass_through = |reason: CsvError| {
        warn!(error = %reason, "CSV input not transformed, returning it unchanged");
        CsvOutcome::PassThrough {
            original: text.to_string(),
            reason,
        }
    };

    let table = match parse_table(text) {
        Ok(table) => table,
        Err(e) => return pass_through(e),
    };

    let input_rows = table.rows.len();
    debug!(
        columns = table.headers.len(),
        rows = input_rows,
        "CSV parsed"
    );

    let table = run_stages(table, features);
    let output_rows = table.rows.len();

    match write_table(&table) {
        Ok(output) => CsvOutcome::Transformed {
            output,
            input_rows,
            output_rows,
        },
        Err(e) => pass_through(e),
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Result of processing one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutcome {
    /// Processor that handled the request.
    pub mode: Mode,
    /// Whether CSV input was returned unparsed.
    pub pass_through: bool,
    pub response: FilterResponse,
}

/// Route a request to the text or CSV processor by its file name.
pub fn filter_request(request: &FilterRequest) -> FilterOutcome {
    let mode = request.mode();
    match mode {
        Mode::Csv => {
            let outcome = process_csv(&request.text, &request.csv_features);
            FilterOutcome {
                mode,
                pass_through: outcome.is_pass_through(),
                response: outcome.into(),
            }
        }
        Mode::Text => FilterOutcome {
            mode,
            pass_through: false,
            response: process_text(&request.text, &request.options),
        },
    }
}

// =============================================================================
// File Input
// =============================================================================

/// Load a `csvFeatures` JSON document from disk.
pub fn load_features(path: &Path) -> PipelineResult<CsvFeatures> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run a file through the dispatcher.
///
/// The mode follows `file_name` when given, otherwise the path's own name.
/// Input bytes are decoded with encoding detection.
pub fn filter_file(
    path: &Path,
    file_name: Option<&str>,
    options: FilterOptions,
    csv_features: CsvFeatures,
) -> PipelineResult<FilterOutcome> {
    let bytes = std::fs::read(path)?;
    let (text, encoding) = decode_auto(&bytes)?;
    debug!(path = %path.display(), %encoding, bytes = bytes.len(), "input decoded");

    let file_name = match file_name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let request = FilterRequest {
        text,
        file_name,
        options,
        csv_features,
    };
    Ok(filter_request(&request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::models::{CsvSort, CsvTopN, SortDirection};
    use std::io::Write;

    fn csv_request(text: &str, csv_features: CsvFeatures) -> FilterRequest {
        FilterRequest {
            text: text.to_string(),
            file_name: "data.csv".to_string(),
            options: FilterOptions::default(),
            csv_features,
        }
    }

    #[test]
    fn test_csv_without_features_round_trips() {
        let text = "name,team\nann,red\nbo,blue\n";
        let outcome = filter_request(&csv_request(text, CsvFeatures::default()));

        assert_eq!(outcome.mode, Mode::Csv);
        assert!(!outcome.pass_through);
        assert_eq!(outcome.response.filtered_text, text);
        assert_eq!(outcome.response.total_lines, 2);
        assert_eq!(outcome.response.unique_lines, 2);
    }

    #[test]
    fn test_csv_statistics() {
        let text = "name,team\nann,red\nbo,red\ncy,blue\ndi,red\n";
        let features = CsvFeatures {
            top_n_per_group: CsvTopN {
                column: "team".into(),
                limit: 1,
            },
            ..CsvFeatures::default()
        };
        let resp = filter_request(&csv_request(text, features)).response;

        assert_eq!(resp.filtered_text, "name,team\nann,red\ncy,blue\n");
        assert_eq!(resp.total_lines, 4);
        assert_eq!(resp.unique_lines, 2);
        assert_eq!(resp.duplicates_removed, 0);
        assert_eq!(resp.blanks_ignored, 0);
    }

    #[test]
    fn test_malformed_csv_passes_through() {
        let text = "name,age\n\"Alice,30\nBob,25\n";
        let features = CsvFeatures {
            sort: CsvSort {
                column: "name".into(),
                direction: SortDirection::Asc,
            },
            ..CsvFeatures::default()
        };

        let outcome = process_csv(text, &features);
        assert!(matches!(
            outcome,
            CsvOutcome::PassThrough {
                reason: CsvError::UnterminatedQuote { .. },
                ..
            }
        ));

        let resp = FilterResponse::from(outcome);
        assert_eq!(resp, FilterResponse::pass_through(text));
        assert_eq!(resp.total_lines, 0);
    }

    #[test]
    fn test_empty_csv_passes_through() {
        let outcome = filter_request(&csv_request("", CsvFeatures::default()));
        assert!(outcome.pass_through);
        assert_eq!(outcome.response, FilterResponse::default());
    }

    #[test]
    fn test_header_only_csv() {
        let resp = filter_request(&csv_request("a,b", CsvFeatures::default())).response;
        assert_eq!(resp.filtered_text, "a,b\n");
        assert_eq!(resp.total_lines, 0);
        assert_eq!(resp.unique_lines, 0);
    }

    #[test]
    fn test_keep_only_unknown_column_writes_empty_records() {
        let features = CsvFeatures {
            keep_only_columns: vec!["ghost".into()],
            ..CsvFeatures::default()
        };
        let resp = filter_request(&csv_request("a,b\n1,2\n3,4\n", features)).response;

        assert_eq!(resp.filtered_text, "\n\n\n");
        assert_eq!(resp.total_lines, 2);
        assert_eq!(resp.unique_lines, 2);
    }

    #[test]
    fn test_crlf_input_writes_lf_output() {
        let text = "a,b\r\n\"x\r\ny\",2\r\n";
        let resp = filter_request(&csv_request(text, CsvFeatures::default())).response;
        assert_eq!(resp.filtered_text, "a,b\n\"x\ny\",2\n");
    }

    #[test]
    fn test_csv_output_requotes_fields() {
        let text = "name,note\nann,\"a, b\"\n";
        let resp = filter_request(&csv_request(text, CsvFeatures::default())).response;
        assert_eq!(resp.filtered_text, text);
    }

    #[test]
    fn test_text_mode_ignores_csv_features() {
        let request = FilterRequest {
            text: "b\na\nb".into(),
            file_name: "notes.txt".into(),
            options: FilterOptions {
                sort_alphabetically: true,
                case_sensitive: true,
                ..FilterOptions::default()
            },
            csv_features: CsvFeatures::example(),
        };

        let outcome = filter_request(&request);
        assert_eq!(outcome.mode, Mode::Text);
        assert_eq!(outcome.response.filtered_text, "a\nb");
        assert_eq!(outcome.response.total_lines, 3);
    }

    #[test]
    fn test_csv_mode_ignores_text_options() {
        let request = FilterRequest {
            text: "v\nb\nB\nb\n".into(),
            file_name: "Upper.CSV".into(),
            options: FilterOptions {
                sort_alphabetically: true,
                ..FilterOptions::default()
            },
            csv_features: CsvFeatures::default(),
        };

        let resp = filter_request(&request).response;
        assert_eq!(resp.filtered_text, "v\nb\nB\nb\n");
        assert_eq!(resp.unique_lines, 3);
    }

    #[test]
    fn test_filter_file_uses_path_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "name,team\nann,red\nann,red\n").unwrap();

        let features = CsvFeatures {
            dedupe_columns: vec!["name".into()],
            ..CsvFeatures::default()
        };
        let outcome = filter_file(&path, None, FilterOptions::default(), features).unwrap();

        assert_eq!(outcome.mode, Mode::Csv);
        assert_eq!(outcome.response.filtered_text, "name,team\nann,red\n");
    }

    #[test]
    fn test_filter_file_name_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "x\nx\n").unwrap();

        let outcome = filter_file(
            &path,
            Some("people.txt"),
            FilterOptions::default(),
            CsvFeatures::default(),
        )
        .unwrap();

        assert_eq!(outcome.mode, Mode::Text);
        assert_eq!(outcome.response.filtered_text, "x\n");
        assert_eq!(outcome.response.duplicates_removed, 1);
    }

    #[test]
    fn test_load_features() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"DedupeCols": ["email"], "sort": {{"column": "n"}}}}"#).unwrap();

        let features = load_features(file.path()).unwrap();
        assert_eq!(features.dedupe_columns, vec!["email"]);
        assert_eq!(features.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_load_features_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_features(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Features(_)));
    }
}
