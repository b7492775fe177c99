//! CSV pipeline stages.
//!
//! Each stage takes a [`Table`] and returns the next one. A stage whose
//! configuration is empty, or whose column does not resolve, returns the table
//! unchanged. [`run_stages`] composes them in their fixed order:
//!
//! ```text
//! rename → keep-only → filter → remove-empty → dedupe → sort → top-N
//! ```

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{
    cell, fold_case, CsvFeatures, CsvFilter, CsvSort, CsvTopN, Row, SortDirection, Table,
};

/// Run every configured stage over `table`, in order.
pub fn run_stages(table: Table, features: &CsvFeatures) -> Table {
    let table = rename_column(table, &features.rename_column, &features.new_column_name);
    let table = keep_only_columns(table, &features.keep_only_columns);
    let table = filter_rows(table, &features.filter);
    let table = remove_empty(table, &features.remove_empty);
    let table = dedupe_rows(table, &features.dedupe_columns);
    let table = sort_rows(table, &features.sort);
    top_n_per_group(table, &features.top_n_per_group)
}

/// Resolve a configured column, logging why a stage is skipped.
fn resolve(table: &Table, stage: &str, column: &str) -> Option<usize> {
    let idx = table.column_index(column);
    if idx.is_none() {
        debug!(stage, column, "column not found, stage skipped");
    }
    idx
}

/// Replace the header `from` with `to`. Data rows are untouched.
pub fn rename_column(mut table: Table, from: &str, to: &str) -> Table {
    if from.is_empty() || to.is_empty() {
        return table;
    }
    if let Some(idx) = resolve(&table, "rename", from) {
        table.headers[idx] = to.to_string();
    }
    table
}

/// Project headers and rows onto `columns`, in the given order.
///
/// Names that do not resolve are dropped. Short rows contribute `""`.
pub fn keep_only_columns(table: Table, columns: &[String]) -> Table {
    if columns.is_empty() {
        return table;
    }

    let keep: Vec<usize> = columns
        .iter()
        .filter_map(|name| resolve(&table, "keep_only", name))
        .collect();

    let headers = keep.iter().map(|&i| table.headers[i].clone()).collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            keep.iter()
                .map(|&i| cell(&row, i).unwrap_or("").to_string())
                .collect()
        })
        .collect();

    Table::new(headers, rows)
}

/// Keep rows whose cell contains the needle, ignoring case.
pub fn filter_rows(mut table: Table, filter: &CsvFilter) -> Table {
    if filter.column.is_empty() || filter.contains.is_empty() {
        return table;
    }
    let Some(idx) = resolve(&table, "filter", &filter.column) else {
        return table;
    };

    let needle = fold_case(&filter.contains);
    table
        .rows
        .retain(|row| cell(row, idx).is_some_and(|value| fold_case(value).contains(&needle)));
    table
}

/// Drop rows whose cell is blank after trimming, or missing.
pub fn remove_empty(mut table: Table, column: &str) -> Table {
    if column.is_empty() {
        return table;
    }
    let Some(idx) = resolve(&table, "remove_empty", column) else {
        return table;
    };

    table
        .rows
        .retain(|row| cell(row, idx).is_some_and(|value| !value.trim().is_empty()));
    table
}

/// Keep the first row for each combination of the given columns' values.
///
/// The key joins the cells with `|`; a missing cell reads as `""`.
pub fn dedupe_rows(mut table: Table, columns: &[String]) -> Table {
    if columns.is_empty() {
        return table;
    }

    let idxs: Vec<usize> = columns
        .iter()
        .filter_map(|name| resolve(&table, "dedupe", name))
        .collect();
    if idxs.is_empty() {
        return table;
    }

    let mut seen: HashSet<String> = HashSet::new();
    table.rows.retain(|row| {
        let key = idxs
            .iter()
            .map(|&i| cell(row, i).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("|");
        seen.insert(key)
    });
    table
}

/// Stable sort by one column's raw string value.
///
/// Rows missing the column go last, in their original order, whatever the
/// direction.
pub fn sort_rows(mut table: Table, sort: &CsvSort) -> Table {
    if sort.column.is_empty() {
        return table;
    }
    let Some(idx) = resolve(&table, "sort", &sort.column) else {
        return table;
    };

    table.rows.sort_by(|a, b| match (cell(a, idx), cell(b, idx)) {
        (Some(x), Some(y)) => match sort.direction {
            SortDirection::Asc => x.cmp(y),
            SortDirection::Desc => y.cmp(x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    table
}

/// Keep at most `limit` rows per distinct value of a column.
///
/// Groups are emitted in the order their first row appeared; rows inside a
/// group keep their relative order.
pub fn top_n_per_group(table: Table, top_n: &CsvTopN) -> Table {
    if top_n.column.is_empty() || top_n.limit <= 0 {
        return table;
    }
    let Some(idx) = resolve(&table, "top_n", &top_n.column) else {
        return table;
    };
    let limit = usize::try_from(top_n.limit).unwrap_or(usize::MAX);

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Row>> = HashMap::new();
    for row in table.rows {
        let key = cell(&row, idx).unwrap_or("").to_string();
        let group = groups.entry(key).or_insert_with_key(|k| {
            order.push(k.clone());
            Vec::new()
        });
        if group.len() < limit {
            group.push(row);
        }
    }

    let rows = order
        .iter()
        .filter_map(|key| groups.remove(key))
        .flatten()
        .collect();

    Table::new(table.headers, rows)
}
