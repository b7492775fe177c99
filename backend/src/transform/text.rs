//! Line-oriented cleanup for plain text payloads.
//!
//! Every input line ends up in exactly one bucket: blank-ignored,
//! duplicate-removed, or kept.

use std::collections::HashSet;

use crate::models::{fold_case, FilterOptions, FilterResponse};

/// Deduplicate and clean `text` line by line.
///
/// Lines are split on `\n` only, so a `\r` survives unless trimming is on.
/// Kept lines stay in first-occurrence order unless sorting is requested.
pub fn process_text(text: &str, options: &FilterOptions) -> FilterResponse {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<&str> = Vec::new();
    let mut stats = FilterResponse::default();

    for raw in text.split('\n') {
        stats.total_lines += 1;

        let line = if options.trim_whitespace {
            raw.trim()
        } else {
            raw
        };

        if options.ignore_blanks && line.is_empty() {
            stats.blanks_ignored += 1;
            continue;
        }

        let key = if options.case_sensitive {
            line.to_string()
        } else {
            fold_case(line)
        };

        if seen.insert(key) {
            kept.push(line);
        } else {
            stats.duplicates_removed += 1;
        }
    }

    if options.sort_alphabetically {
        kept.sort_unstable();
    }

    stats.unique_lines = kept.len();
    stats.filtered_text = kept.join("\n");
    stats
}
