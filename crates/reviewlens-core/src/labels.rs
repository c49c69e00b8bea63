//! Taxonomy-restricted label sets and their string encodings
//!
//! Two encodings exist at the CSV boundary:
//! - output cells: labels joined with [`LABEL_DELIMITER`] (`"Fragrance, Price"`)
//! - ground-truth cells: a bracketed list literal, either JSON
//!   (`["Fragrance","Price"]`) or the single-quoted form older exports carry
//!   (`['Fragrance', 'Price']`)

use crate::taxonomy::TaxonomyLabel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Delimiter used when joining labels into a single output cell
pub const LABEL_DELIMITER: &str = ", ";

/// A set of taxonomy labels, iterated in taxonomy order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<TaxonomyLabel>);

impl LabelSet {
    /// Create an empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the strings that are taxonomy labels, dropping everything else
    pub fn from_factors<I, S>(factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            factors
                .into_iter()
                .filter_map(|f| TaxonomyLabel::parse(f.as_ref()))
                .collect(),
        )
    }

    /// Decode a joined output cell
    pub fn from_cell(cell: &str) -> Self {
        Self::from_factors(
            cell.split(LABEL_DELIMITER)
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    /// Encode as a joined output cell; empty sets encode as the empty string
    ///
    /// Labels come out in taxonomy order with duplicates removed, not in the
    /// order the model listed them.
    pub fn to_cell(&self) -> String {
        self.0
            .iter()
            .map(TaxonomyLabel::as_str)
            .collect::<Vec<_>>()
            .join(LABEL_DELIMITER)
    }

    /// Insert a label, returning whether it was new
    pub fn insert(&mut self, label: TaxonomyLabel) -> bool {
        self.0.insert(label)
    }

    pub fn contains(&self, label: TaxonomyLabel) -> bool {
        self.0.contains(&label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in taxonomy order
    pub fn iter(&self) -> impl Iterator<Item = TaxonomyLabel> + '_ {
        self.0.iter().copied()
    }

    /// Number of labels present in both sets
    pub fn intersection_len(&self, other: &LabelSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Number of labels present in either set
    pub fn union_len(&self, other: &LabelSet) -> usize {
        self.0.union(&other.0).count()
    }

    /// Whether the two sets share at least one label
    pub fn overlaps(&self, other: &LabelSet) -> bool {
        self.intersection_len(other) > 0
    }

    /// Binary indicator row over the taxonomy vocabulary
    pub fn indicator(&self) -> [bool; TaxonomyLabel::COUNT] {
        let mut row = [false; TaxonomyLabel::COUNT];
        for label in &self.0 {
            row[label.index()] = true;
        }
        row
    }
}

impl FromIterator<TaxonomyLabel> for LabelSet {
    fn from_iter<T: IntoIterator<Item = TaxonomyLabel>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

/// Encode a sequence of labels as a JSON list literal
pub fn encode_label_literal<I, S>(labels: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let labels: Vec<String> = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
    // Serializing a list of strings cannot fail.
    serde_json::to_string(&labels).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a bracketed list literal of quoted strings
///
/// Accepts single- or double-quoted elements, backslash escapes (including
/// JSON `\uXXXX`), surrounding whitespace and a trailing comma.
pub fn parse_label_literal(input: &str) -> Result<Vec<String>> {
    let inner = input
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| Error::label_parse(format!("not a list literal: {input:?}")))?;

    let mut chars = inner.chars().peekable();
    let mut labels = Vec::new();

    loop {
        skip_whitespace(&mut chars);
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(other) => {
                return Err(Error::label_parse(format!(
                    "expected quoted element, found {other:?} in {input:?}"
                )))
            }
        };

        labels.push(read_quoted(&mut chars, quote, input)?);

        skip_whitespace(&mut chars);
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(other) => {
                return Err(Error::label_parse(format!(
                    "expected ',' between elements, found {other:?} in {input:?}"
                )))
            }
        }
    }

    Ok(labels)
}

type CharStream<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn skip_whitespace(chars: &mut CharStream<'_>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn read_quoted(chars: &mut CharStream<'_>, quote: char, input: &str) -> Result<String> {
    let mut out = String::new();
    loop {
        match chars.next() {
            None => {
                return Err(Error::label_parse(format!(
                    "unterminated string in {input:?}"
                )))
            }
            Some(c) if c == quote => return Ok(out),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some('u') => out.push(read_unicode_escape(chars, input)?),
                Some(c @ ('\\' | '\'' | '"' | '/')) => out.push(c),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => {
                    return Err(Error::label_parse(format!(
                        "dangling escape in {input:?}"
                    )))
                }
            },
            Some(c) => out.push(c),
        }
    }
}

fn read_unicode_escape(chars: &mut CharStream<'_>, input: &str) -> Result<char> {
    let hex: String = chars.by_ref().take(4).collect();
    u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|_| hex.len() == 4)
        .and_then(char::from_u32)
        .ok_or_else(|| Error::label_parse(format!("bad \\u escape '{hex}' in {input:?}")))
}
