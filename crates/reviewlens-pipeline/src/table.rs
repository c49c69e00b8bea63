//! Spreadsheet and CSV tables
//!
//! Everything is loaded as text: a cell is `Some(String)` or `None` when the
//! source cell is empty. Headers are trimmed on load so that `" Core Item"`
//! and `"Core Item"` name the same column.

use calamine::{open_workbook_auto, Data, Reader};
use reviewlens_core::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Review text column
pub const REVIEW_COLUMN: &str = "Core Item";

/// Label column, both for training data and labelled output
pub const LABEL_COLUMN: &str = "Level 1 Factors";

/// A column-named table of optional text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table with the given headers
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(|h| h.into().trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Load a table, choosing the reader from the file extension
    ///
    /// `.csv` is read as CSV; `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods`
    /// are read from their first worksheet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let table = match extension.as_str() {
            "csv" => Self::load_csv(path)?,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::load_workbook(path)?,
            other => {
                return Err(Error::table(format!(
                    "unsupported file type '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), rows = table.len(), columns = table.headers.len(), "table loaded");
        Ok(table)
    }

    fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::table(format!("Failed to open {}: {}", path.display(), e)))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::table(format!("Failed to read CSV header: {}", e)))?
            .iter()
            .map(String::from)
            .collect();
        let mut table = Self::new(headers);

        for record in reader.records() {
            let record =
                record.map_err(|e| Error::table(format!("Failed to read CSV row: {}", e)))?;
            table.push_row(
                record
                    .iter()
                    .map(|field| (!field.is_empty()).then(|| field.to_string()))
                    .collect(),
            )?;
        }

        Ok(table)
    }

    fn load_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| Error::table(format!("Failed to open {}: {}", path.display(), e)))?;

        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::table(format!("{} has no worksheets", path.display())))?;
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| Error::table(format!("Failed to read sheet '{}': {}", sheet, e)))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
            .unwrap_or_default();
        let mut table = Self::new(headers);

        for row in rows {
            table.push_row(row.iter().map(cell_text).collect())?;
        }

        Ok(table)
    }

    /// Write the table as CSV with a header row; missing cells are empty
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| Error::table(format!("Failed to create {}: {}", path.display(), e)))?;

        writer
            .write_record(&self.headers)
            .map_err(|e| Error::table(format!("Failed to write CSV header: {}", e)))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
                .map_err(|e| Error::table(format!("Failed to write CSV row: {}", e)))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append a row, padding short rows to the header width
    ///
    /// Trailing empty cells past the last header are dropped. A row with
    /// text past the last header is an error, since it has no column to
    /// land in.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) -> Result<()> {
        let width = self.headers.len();
        if let Some(extra) = row.iter().skip(width).position(Option::is_some) {
            return Err(Error::table(format!(
                "row {} has a value in column {} but only {} headers",
                self.rows.len() + 1,
                width + extra + 1,
                width
            )));
        }
        row.resize(width, None);
        self.rows.push(row);
        Ok(())
    }

    /// Add a column, replacing any existing column with the same name
    pub fn push_column(&mut self, name: &str, values: Vec<Option<String>>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::table(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.headers.push(name.trim().to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    /// All cells of a column, in row order
    pub fn column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
