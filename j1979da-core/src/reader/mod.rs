//! Excel workbook reader using calamine

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::path::Path;

pub mod workbook;

pub use workbook::{CellValue, Sheet, Workbook};

/// Read a workbook from a file path.
///
/// Every sheet is loaded eagerly into a dense [`Sheet`] grid and the file is
/// released before this returns.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let mut excel: Sheets<_> = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_names = excel.sheet_names();
    let mut sheets = Vec::new();

    for sheet_name in &sheet_names {
        let range = excel
            .worksheet_range(sheet_name)
            .with_context(|| format!("Failed to read sheet '{}'", sheet_name))?;
        sheets.push(parse_sheet(sheet_name, &range));
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        sheets,
    })
}

fn parse_sheet(name: &str, range: &Range<Data>) -> Sheet {
    // calamine ranges start at the first used cell; pad leading rows/columns
    // so grid positions line up with sheet positions.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (n_rows, n_cols) = range.get_size();

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];

    for rel_row in 0..n_rows {
        let mut cells = Vec::with_capacity(start_col as usize + n_cols);
        cells.resize(start_col as usize, CellValue::Empty);
        for rel_col in 0..n_cols {
            let value = range
                .get((rel_row, rel_col))
                .map(parse_cell_value)
                .unwrap_or(CellValue::Empty);
            cells.push(value);
        }
        rows.push(cells);
    }

    Sheet {
        name: name.to_string(),
        rows,
    }
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
