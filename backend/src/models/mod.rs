//! Domain models for the line filter pipeline.
//!
//! - [`FilterRequest`] - Body of `POST /filter-lines`
//! - [`FilterOptions`] - Text mode flags
//! - [`CsvFeatures`] - CSV mode stage configuration
//! - [`FilterResponse`] - Transformed text plus statistics
//! - [`Table`] - Parsed CSV headers and rows
//! - [`Mode`] - Which processor a request is dispatched to
//!
//! Request types accept both the camelCase wire names and the PascalCase names
//! older web clients send. Every field defaults to its zero value and a JSON
//! `null` reads as absent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Request
// =============================================================================

/// Body of a filter request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    /// Raw payload, either free text or CSV.
    #[serde(default, deserialize_with = "null_as_default", alias = "Text")]
    pub text: String,

    /// Declared file name; only its extension matters.
    #[serde(default, deserialize_with = "null_as_default", alias = "FileName")]
    pub file_name: String,

    /// Text mode flags, sent at the top level of the body.
    #[serde(flatten)]
    pub options: FilterOptions,

    /// CSV mode stage configuration.
    #[serde(default, deserialize_with = "null_as_default", alias = "CsvFeatures")]
    pub csv_features: CsvFeatures,
}

impl FilterRequest {
    /// Processor this request is dispatched to.
    pub fn mode(&self) -> Mode {
        Mode::from_file_name(&self.file_name)
    }
}

/// Text mode flags. All combinations are valid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(default, deserialize_with = "null_as_default", alias = "CaseSensitive")]
    pub case_sensitive: bool,
    #[serde(default, deserialize_with = "null_as_default", alias = "TrimWhitespace")]
    pub trim_whitespace: bool,
    #[serde(default, deserialize_with = "null_as_default", alias = "IgnoreBlanks")]
    pub ignore_blanks: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        alias = "SortAlphabetically"
    )]
    pub sort_alphabetically: bool,
}

// =============================================================================
// CSV Features
// =============================================================================

/// CSV stage configuration. An empty field skips its stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CsvFeatures {
    #[serde(default, deserialize_with = "null_as_default", alias = "Sort")]
    pub sort: CsvSort,

    #[serde(default, deserialize_with = "null_as_default", alias = "DedupeCols")]
    pub dedupe_columns: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default", alias = "Filter")]
    pub filter: CsvFilter,

    #[serde(default, deserialize_with = "null_as_default", alias = "RemoveEmpty")]
    pub remove_empty: String,

    #[serde(default, deserialize_with = "null_as_default", alias = "TopNPerGrp")]
    pub top_n_per_group: CsvTopN,

    #[serde(default, deserialize_with = "null_as_default", alias = "RenameColumn")]
    pub rename_column: String,

    #[serde(default, deserialize_with = "null_as_default", alias = "NewColumnName")]
    pub new_column_name: String,

    #[serde(default, deserialize_with = "null_as_default", alias = "KeepOnlyColumn")]
    pub keep_only_columns: Vec<String>,
}

impl CsvFeatures {
    /// An example configuration touching every stage.
    pub fn example() -> Self {
        Self {
            sort: CsvSort {
                column: "score".to_string(),
                direction: SortDirection::Desc,
            },
            dedupe_columns: vec!["email".to_string()],
            filter: CsvFilter {
                column: "country".to_string(),
                contains: "fr".to_string(),
            },
            remove_empty: "email".to_string(),
            top_n_per_group: CsvTopN {
                column: "team".to_string(),
                limit: 3,
            },
            rename_column: "mail".to_string(),
            new_column_name: "email".to_string(),
            keep_only_columns: vec![
                "name".to_string(),
                "email".to_string(),
                "country".to_string(),
                "team".to_string(),
                "score".to_string(),
            ],
        }
    }
}

/// Sort stage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CsvSort {
    #[serde(default, deserialize_with = "null_as_default", alias = "Column")]
    pub column: String,
    #[serde(default, alias = "Direction")]
    pub direction: SortDirection,
}

/// Sort order. Only `"desc"` (any case) means descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(if raw.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        })
    }
}

/// Value filter configuration: keep rows whose cell contains `contains`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CsvFilter {
    #[serde(default, deserialize_with = "null_as_default", alias = "Column")]
    pub column: String,
    #[serde(default, deserialize_with = "null_as_default", alias = "Contains")]
    pub contains: String,
}

/// Top-N-per-group configuration. A non-positive limit skips the stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CsvTopN {
    #[serde(default, deserialize_with = "null_as_default", alias = "Column")]
    pub column: String,
    #[serde(default, deserialize_with = "null_as_default", alias = "Limit")]
    pub limit: i64,
}

// =============================================================================
// Response
// =============================================================================

/// Transformed text plus statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    pub filtered_text: String,
    pub total_lines: usize,
    pub unique_lines: usize,
    pub duplicates_removed: usize,
    pub blanks_ignored: usize,
}

impl FilterResponse {
    /// Untransformed input with zeroed statistics.
    pub fn pass_through(text: impl Into<String>) -> Self {
        Self {
            filtered_text: text.into(),
            ..Self::default()
        }
    }
}

// =============================================================================
// Dispatch Mode
// =============================================================================

/// Which processor handles a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Text,
    Csv,
}

impl Mode {
    /// `.csv` (any case) selects CSV mode, everything else is text.
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.to_lowercase().ends_with(".csv") {
            Mode::Csv
        } else {
            Mode::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Text => "text",
            Mode::Csv => "csv",
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// One CSV data row. May hold fewer cells than there are headers.
pub type Row = Vec<String>;

/// A parsed CSV document: header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Resolve a column name to its index.
    ///
    /// The lookup name is trimmed and compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = fold_case(name.trim());
        self.headers.iter().position(|h| fold_case(h) == wanted)
    }
}

/// Lowercase `s` one character at a time.
///
/// Unlike [`str::to_lowercase`] this ignores context, so a final `Σ` folds to
/// `σ` like every other `Σ`.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Cell at `idx`, or `None` when the row is too short.
pub fn cell(row: &Row, idx: usize) -> Option<&str> {
    row.get(idx).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_camel_case() {
        let req: FilterRequest = serde_json::from_value(json!({
            "text": "a\nb",
            "fileName": "list.txt",
            "caseSensitive": true,
            "trimWhitespace": true,
            "ignoreBlanks": false,
            "sortAlphabetically": true,
            "csvFeatures": {
                "sort": { "column": "name", "direction": "desc" },
                "dedupeColumns": ["email"],
                "topNPerGroup": { "column": "team", "limit": 2 }
            }
        }))
        .unwrap();

        assert_eq!(req.text, "a\nb");
        assert!(req.options.case_sensitive);
        assert!(req.options.trim_whitespace);
        assert!(!req.options.ignore_blanks);
        assert!(req.options.sort_alphabetically);
        assert_eq!(req.csv_features.sort.direction, SortDirection::Desc);
        assert_eq!(req.csv_features.dedupe_columns, vec!["email"]);
        assert_eq!(req.csv_features.top_n_per_group.limit, 2);
        assert_eq!(req.mode(), Mode::Text);
    }

    #[test]
    fn test_request_all_fields_optional() {
        let req: FilterRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req, FilterRequest::default());
    }

    #[test]
    fn test_null_reads_as_absent() {
        let req: FilterRequest = serde_json::from_value(json!({
            "text": null,
            "caseSensitive": null,
            "csvFeatures": { "dedupeColumns": null, "sort": null }
        }))
        .unwrap();

        assert_eq!(req.text, "");
        assert!(!req.options.case_sensitive);
        assert!(req.csv_features.dedupe_columns.is_empty());
        assert_eq!(req.csv_features.sort, CsvSort::default());
    }

    #[test]
    fn test_pascal_case_aliases() {
        let features: CsvFeatures = serde_json::from_value(json!({
            "Sort": { "Column": "age", "Direction": "desc" },
            "DedupeCols": ["name"],
            "Filter": { "Column": "city", "Contains": "par" },
            "RemoveEmpty": "email",
            "TopNPerGrp": { "Column": "team", "Limit": 1 },
            "RenameColumn": "a",
            "NewColumnName": "b",
            "KeepOnlyColumn": ["b"]
        }))
        .unwrap();

        assert_eq!(features.sort.column, "age");
        assert_eq!(features.sort.direction, SortDirection::Desc);
        assert_eq!(features.dedupe_columns, vec!["name"]);
        assert_eq!(features.filter.contains, "par");
        assert_eq!(features.remove_empty, "email");
        assert_eq!(features.top_n_per_group.column, "team");
        assert_eq!(features.rename_column, "a");
        assert_eq!(features.new_column_name, "b");
        assert_eq!(features.keep_only_columns, vec!["b"]);
    }

    #[test]
    fn test_request_pascal_case_aliases() {
        let req: FilterRequest = serde_json::from_value(json!({
            "Text": "b\na",
            "FileName": "rows.CSV",
            "CaseSensitive": true,
            "TrimWhitespace": true,
            "IgnoreBlanks": true,
            "SortAlphabetically": true,
            "CsvFeatures": { "DedupeCols": ["id"] }
        }))
        .unwrap();

        assert_eq!(req.text, "b\na");
        assert_eq!(req.mode(), Mode::Csv);
        assert_eq!(
            req.options,
            FilterOptions {
                case_sensitive: true,
                trim_whitespace: true,
                ignore_blanks: true,
                sort_alphabetically: true,
            }
        );
        assert_eq!(req.csv_features.dedupe_columns, vec!["id"]);
    }

    #[test]
    fn test_sort_direction_parsing() {
        let parse = |v: serde_json::Value| serde_json::from_value::<SortDirection>(v).unwrap();
        assert_eq!(parse(json!("desc")), SortDirection::Desc);
        assert_eq!(parse(json!("DESC")), SortDirection::Desc);
        assert_eq!(parse(json!("asc")), SortDirection::Asc);
        assert_eq!(parse(json!("sideways")), SortDirection::Asc);
        assert_eq!(parse(json!(null)), SortDirection::Asc);
    }

    #[test]
    fn test_response_wire_names() {
        let resp = FilterResponse {
            filtered_text: "a".into(),
            total_lines: 3,
            unique_lines: 1,
            duplicates_removed: 1,
            blanks_ignored: 1,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["filteredText"], "a");
        assert_eq!(value["totalLines"], 3);
        assert_eq!(value["uniqueLines"], 1);
        assert_eq!(value["duplicatesRemoved"], 1);
        assert_eq!(value["blanksIgnored"], 1);
    }

    #[test]
    fn test_mode_from_file_name() {
        assert_eq!(Mode::from_file_name("data.csv"), Mode::Csv);
        assert_eq!(Mode::from_file_name("DATA.CSV"), Mode::Csv);
        assert_eq!(Mode::from_file_name("data.csv.txt"), Mode::Text);
        assert_eq!(Mode::from_file_name(""), Mode::Text);
    }

    #[test]
    fn test_column_index_trims_lookup_and_ignores_case() {
        let table = Table::new(vec!["Name".into(), "Email".into()], vec![]);
        assert_eq!(table.column_index("  email "), Some(1));
        assert_eq!(table.column_index("NAME"), Some(0));
        assert_eq!(table.column_index("phone"), None);
    }

    #[test]
    fn test_fold_case_ignores_word_position() {
        assert_eq!(fold_case("ΟΔΟΣ"), "οδοσ");
        assert_eq!(fold_case("MiXeD"), "mixed");

        let table = Table::new(vec!["ΟΔΟΣ".into()], vec![]);
        assert_eq!(table.column_index("οδοσ"), Some(0));
    }
}
