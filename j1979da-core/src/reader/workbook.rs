//! Workbook data structures

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// An eagerly loaded workbook. The source file is closed once this exists.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub path: PathBuf,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// A worksheet as a dense grid over its used range.
///
/// Rows are stored in sheet order; `rows[0]` is the header row. Cells outside
/// the used range read as `CellValue::Empty`.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Number of rows in the used range
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a row by 1-based sheet row number
    pub fn row(&self, row_number: usize) -> Option<&[CellValue]> {
        if row_number == 0 {
            return None;
        }
        self.rows.get(row_number - 1).map(|r| r.as_slice())
    }

    /// Iterate the first-column value of every row, top to bottom,
    /// paired with its 1-based row number.
    pub fn first_column(&self) -> impl Iterator<Item = (usize, &CellValue)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i + 1, row.first().unwrap_or(&CellValue::Empty)))
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Get the text if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => {
                // Integral floats print without the trailing ".0"
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}
