//! Training-data aggregation
//!
//! Human-labelled training sheets repeat the same review once per label.
//! Aggregation collapses them: rows without text are dropped, non-ASCII
//! characters are stripped from the text, and all labels seen for the same
//! stripped text are unioned into one row.

use crate::normalize::strip_non_ascii;
use crate::table::Table;
use reviewlens_core::{encode_label_literal, parse_label_literal, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

/// One unique review with every label it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRow {
    pub text: String,
    pub labels: BTreeSet<String>,
}

/// Group `(text, label cell)` pairs by stripped text; output is sorted by text
pub fn aggregate<I>(rows: I) -> Vec<AggregatedRow>
where
    I: IntoIterator<Item = (Option<String>, Option<String>)>,
{
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (text, cell) in rows {
        let Some(text) = text else { continue };
        let text = strip_non_ascii(&text);
        if text.trim().is_empty() {
            continue;
        }

        let labels = groups.entry(text).or_default();
        if let Some(cell) = cell {
            labels.extend(labels_from_cell(&cell));
        }
    }

    groups
        .into_iter()
        .map(|(text, labels)| AggregatedRow { text, labels })
        .collect()
}

/// Labels in one training cell
///
/// Bracketed cells are list literals; anything else is a single label.
fn labels_from_cell(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        match parse_label_literal(trimmed) {
            Ok(labels) => {
                return labels
                    .into_iter()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect()
            }
            Err(e) => warn!(cell = trimmed, error = %e, "unparseable label list, keeping cell as one label"),
        }
    }

    vec![trimmed.to_string()]
}

/// Aggregate the text and label columns of a table
pub fn aggregate_table(table: &Table, text_column: &str, label_column: &str) -> Result<Vec<AggregatedRow>> {
    let texts = table.column(text_column)?;
    let labels = table.column(label_column)?;
    Ok(aggregate(texts.into_iter().zip(labels)))
}

/// Render aggregated rows as a table; label sets are JSON list literals
pub fn to_table(rows: &[AggregatedRow], text_column: &str, label_column: &str) -> Result<Table> {
    let mut table = Table::new([text_column, label_column]);
    for row in rows {
        table.push_row(vec![
            Some(row.text.clone()),
            Some(encode_label_literal(&row.labels)),
        ])?;
    }
    Ok(table)
}

/// Load a training sheet, aggregate it, and write the result as CSV
///
/// Returns the number of unique reviews written.
pub fn aggregate_file(
    input: &Path,
    output: &Path,
    text_column: &str,
    label_column: &str,
) -> Result<usize> {
    let table = Table::load(input)?;
    info!(path = %input.display(), rows = table.len(), "Aggregating training data...");

    let rows = aggregate_table(&table, text_column, label_column)?;
    to_table(&rows, text_column, label_column)?.write_csv(output)?;

    info!(
        "Success! Created {} with {} unique reviews.",
        output.display(),
        rows.len()
    );
    Ok(rows.len())
}
