//! Sheet header reading, PID row-range location, and record extraction
//!
//! A PID's data in an annex sheet is a contiguous block of rows: the first
//! row carries the PID marker in column 1 and the block runs until the next
//! `0x..` marker. Extraction turns each block into a header-field map (from
//! the marker row) plus ordered per-row field maps (from the rest).

use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::reader::{CellValue, Sheet, Workbook};
use crate::selection::{SelectionEntry, SelectionSet};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Embedded whitespace runs inside sheet cell text
static EMBEDDED_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\r\n]+").expect("whitespace pattern is valid"));

/// Fatal extraction failures. Everything else is a [`Diagnostic`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("required sheet '{sheet}' not found in {path} (sheets: {available:?})")]
    MissingSheet {
        sheet: String,
        path: String,
        available: Vec<String>,
    },
}

/// Contiguous 1-based row block belonging to one PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub first_row: usize,
    pub last_row: usize,
}

/// Remove embedded tab/newline/carriage-return runs entirely.
pub fn strip_embedded_whitespace(text: &str) -> String {
    EMBEDDED_WHITESPACE.replace_all(text, "").into_owned()
}

/// Collapse embedded tab/newline/carriage-return runs to a single space.
pub fn collapse_embedded_whitespace(text: &str) -> String {
    EMBEDDED_WHITESPACE.replace_all(text, " ").into_owned()
}

/// Read the column labels from row 1 of a sheet.
///
/// Empty cells are skipped outright, so label positions are compacted left to
/// right; embedded whitespace runs are stripped from each label and
/// surrounding spaces trimmed.
pub fn sheet_header(sheet: &Sheet) -> Vec<String> {
    let Some(row) = sheet.row(1) else {
        return Vec::new();
    };
    row.iter()
        .filter(|cell| !cell.is_empty())
        .map(|cell| strip_embedded_whitespace(&cell.to_string()).trim().to_string())
        .collect()
}

/// Outcome of a column-1 marker scan, before the end-of-sheet policy applies.
enum MarkerScan {
    /// Block opened and closed by the next distinct marker
    Found(RowRange),
    /// Block opened but still open at the last sheet row
    Unterminated { first_row: usize },
    /// Marker never seen
    Absent,
}

fn scan_marker_rows(sheet: &Sheet, pid: &str) -> MarkerScan {
    let mut first_row = None;

    for (row_number, value) in sheet.first_column() {
        let Some(text) = value.as_text() else {
            continue;
        };
        match first_row {
            None if text == pid => first_row = Some(row_number),
            Some(first) if text.starts_with("0x") && text != pid => {
                return MarkerScan::Found(RowRange {
                    first_row: first,
                    last_row: row_number - 1,
                });
            }
            _ => {}
        }
    }

    match first_row {
        Some(first_row) => MarkerScan::Unterminated { first_row },
        None => MarkerScan::Absent,
    }
}

/// Find the row block belonging to `pid` in a sheet.
///
/// Column 1 is scanned top to bottom. The first exact match of the canonical
/// PID opens the block; the row before the next cell whose text starts with
/// `0x` and differs from the target closes it. A block still open at the last
/// sheet row closes there when `close_at_sheet_end` is set, otherwise no
/// range is returned. Later duplicate markers for the same PID are ignored.
pub fn locate_rows(sheet: &Sheet, pid: &str, close_at_sheet_end: bool) -> Option<RowRange> {
    match scan_marker_rows(sheet, pid) {
        MarkerScan::Found(range) => Some(range),
        MarkerScan::Unterminated { first_row } if close_at_sheet_end => Some(RowRange {
            first_row,
            last_row: sheet.row_count(),
        }),
        _ => None,
    }
}

/// Build the header-field map and body-row maps for one located block.
///
/// An absent range yields empty structures so a PID missing from its sheet
/// never fails the run. Cells in columns beyond the label list are dropped.
pub fn extract_record(
    sheet: &Sheet,
    labels: &[String],
    range: Option<RowRange>,
) -> (BTreeMap<String, CellValue>, Vec<BTreeMap<String, CellValue>>) {
    let Some(range) = range else {
        return (BTreeMap::new(), Vec::new());
    };

    let header_fields = row_fields(sheet, labels, range.first_row);

    let mut body_rows = Vec::new();
    for row_number in (range.first_row + 1)..=range.last_row {
        body_rows.push(row_fields(sheet, labels, row_number));
    }

    (header_fields, body_rows)
}

fn row_fields(sheet: &Sheet, labels: &[String], row_number: usize) -> BTreeMap<String, CellValue> {
    let mut fields = BTreeMap::new();
    let Some(row) = sheet.row(row_number) else {
        return fields;
    };
    for (label, cell) in labels.iter().zip(row.iter()) {
        if !cell.is_empty() {
            fields.insert(label.clone(), cell.clone());
        }
    }
    fields
}

/// Populate every selection entry from its category's sheet.
///
/// Verifies both required sheets up front (fatal if either is missing), then
/// locates and extracts each entry's block in sorted-PID order. Returns the
/// two sheet headers plus advisory diagnostics for PIDs that were not found.
pub fn populate(
    workbook: &Workbook,
    selection: &mut SelectionSet,
    config: &Config,
) -> Result<(Vec<String>, Vec<String>, Vec<Diagnostic>), ExtractError> {
    let annex_b = require_sheet(workbook, &config.annex_b_sheet)?;
    let annex_g = require_sheet(workbook, &config.annex_g_sheet)?;

    let annex_b_labels = sheet_header(annex_b);
    let annex_g_labels = sheet_header(annex_g);

    let mut diagnostics = Vec::new();
    populate_map(
        &mut selection.parameters,
        annex_b,
        &annex_b_labels,
        config,
        &mut diagnostics,
    );
    populate_map(
        &mut selection.infotypes,
        annex_g,
        &annex_g_labels,
        config,
        &mut diagnostics,
    );

    Ok((annex_b_labels, annex_g_labels, diagnostics))
}

fn populate_map(
    entries: &mut BTreeMap<String, SelectionEntry>,
    sheet: &Sheet,
    labels: &[String],
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for entry in entries.values_mut() {
        let range = match scan_marker_rows(sheet, &entry.pid) {
            MarkerScan::Found(range) => Some(range),
            MarkerScan::Unterminated { first_row } => {
                if config.close_range_at_sheet_end {
                    Some(RowRange {
                        first_row,
                        last_row: sheet.row_count(),
                    })
                } else {
                    diagnostics.push(Diagnostic::info(
                        "PID_BLOCK_UNTERMINATED",
                        format!(
                            "{} block at row {} in sheet '{}' has no closing marker, extracted empty",
                            entry.pid, first_row, sheet.name
                        ),
                    ));
                    None
                }
            }
            MarkerScan::Absent => {
                diagnostics.push(Diagnostic::info(
                    "PID_NOT_FOUND",
                    format!("{} not found in sheet '{}'", entry.pid, sheet.name),
                ));
                None
            }
        };
        let (header_fields, body_rows) = extract_record(sheet, labels, range);
        entry.header_fields = header_fields;
        entry.body_rows = body_rows;
    }
}

fn require_sheet<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet, ExtractError> {
    workbook.get_sheet(name).ok_or_else(|| ExtractError::MissingSheet {
        sheet: name.to_string(),
        path: workbook.path.display().to_string(),
        available: workbook.sheet_names().iter().map(|s| s.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSet, CommandDescriptor};
    use crate::selection;
    use std::path::PathBuf;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    fn sheet(name: &str, rows: Vec<Vec<CellValue>>) -> Sheet {
        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    /// Minimal annex-style sheet: header row, then PID-delimited blocks.
    fn annex_sheet(name: &str) -> Sheet {
        sheet(
            name,
            vec![
                vec![text("PID"), text("Description"), text("Comment")],
                vec![text("0x05"), text("Engine coolant temperature")],
                vec![CellValue::Empty, text("Data Byte A"), text("Temp reading")],
                vec![text("0x0C"), text("Engine speed"), text("Two bytes")],
                vec![CellValue::Empty, text("Data Byte A")],
                vec![CellValue::Empty, text("Data Byte B")],
                vec![text("0x0D"), text("Vehicle speed")],
            ],
        )
    }

    #[test]
    fn test_sheet_header_strips_and_compacts() {
        let ws = sheet(
            "Header",
            vec![vec![
                text("  Description\t"),
                CellValue::Empty,
                text("Comment\n"),
            ]],
        );
        assert_eq!(sheet_header(&ws), vec!["Description", "Comment"]);
    }

    #[test]
    fn test_sheet_header_empty_sheet() {
        let ws = sheet("Empty", Vec::new());
        assert!(sheet_header(&ws).is_empty());
    }

    #[test]
    fn test_whitespace_helpers() {
        assert_eq!(strip_embedded_whitespace("a\t\r\nb"), "ab");
        assert_eq!(collapse_embedded_whitespace("a\t\nb"), "a b");
    }

    #[test]
    fn test_locate_rows_ends_before_next_marker() {
        let ws = annex_sheet("Annex B - Parameter IDs");
        assert_eq!(
            locate_rows(&ws, "0x05", true),
            Some(RowRange {
                first_row: 2,
                last_row: 3
            })
        );
        assert_eq!(
            locate_rows(&ws, "0x0C", true),
            Some(RowRange {
                first_row: 4,
                last_row: 6
            })
        );
    }

    #[test]
    fn test_locate_rows_missing_pid() {
        let ws = annex_sheet("Annex B - Parameter IDs");
        assert_eq!(locate_rows(&ws, "0xEE", true), None);
    }

    #[test]
    fn test_locate_rows_block_at_sheet_end() {
        let ws = annex_sheet("Annex B - Parameter IDs");
        // 0x0D runs to the last row; behavior depends on the terminator flag
        assert_eq!(
            locate_rows(&ws, "0x0D", true),
            Some(RowRange {
                first_row: 7,
                last_row: 7
            })
        );
        assert_eq!(locate_rows(&ws, "0x0D", false), None);
    }

    #[test]
    fn test_locate_rows_ignores_duplicate_marker() {
        let ws = sheet(
            "Dup",
            vec![
                vec![text("PID")],
                vec![text("0x05")],
                vec![text("0x05")],
                vec![text("0x06")],
            ],
        );
        // Only the first occurrence opens the block; the duplicate is data
        assert_eq!(
            locate_rows(&ws, "0x05", true),
            Some(RowRange {
                first_row: 2,
                last_row: 3
            })
        );
    }

    #[test]
    fn test_locate_rows_skips_non_text_cells() {
        let ws = sheet(
            "Mixed",
            vec![
                vec![text("PID")],
                vec![CellValue::Number(12.0)],
                vec![text("0x05")],
                vec![text("0x06")],
            ],
        );
        assert_eq!(
            locate_rows(&ws, "0x05", true),
            Some(RowRange {
                first_row: 3,
                last_row: 3
            })
        );
    }

    #[test]
    fn test_extract_record_single_row_block() {
        let ws = annex_sheet("Annex B - Parameter IDs");
        let labels = sheet_header(&ws);
        let range = locate_rows(&ws, "0x0D", true);
        let (header_fields, body_rows) = extract_record(&ws, &labels, range);
        assert_eq!(header_fields["PID"], text("0x0D"));
        assert_eq!(header_fields["Description"], text("Vehicle speed"));
        assert!(body_rows.is_empty());
    }

    #[test]
    fn test_extract_record_body_rows_in_order() {
        let ws = annex_sheet("Annex B - Parameter IDs");
        let labels = sheet_header(&ws);
        let range = locate_rows(&ws, "0x0C", true);
        let (header_fields, body_rows) = extract_record(&ws, &labels, range);
        assert_eq!(header_fields["Comment"], text("Two bytes"));
        assert_eq!(body_rows.len(), 2);
        // Empty column-1 cells contribute no key
        assert!(!body_rows[0].contains_key("PID"));
        assert_eq!(body_rows[0]["Description"], text("Data Byte A"));
        assert_eq!(body_rows[1]["Description"], text("Data Byte B"));
    }

    #[test]
    fn test_extract_record_absent_range_is_empty() {
        let ws = annex_sheet("Annex B - Parameter IDs");
        let labels = sheet_header(&ws);
        let (header_fields, body_rows) = extract_record(&ws, &labels, None);
        assert!(header_fields.is_empty());
        assert!(body_rows.is_empty());
    }

    fn test_workbook() -> Workbook {
        Workbook {
            path: PathBuf::from("test.xlsx"),
            sheets: vec![
                annex_sheet("Annex B - Parameter IDs"),
                sheet(
                    "Annex G - InfoType IDs",
                    vec![
                        vec![text("PID"), text("Description")],
                        vec![text("0x02"), text("VIN")],
                        vec![CellValue::Empty, text("17 characters")],
                        vec![text("0x04"), text("Calibration ID")],
                    ],
                ),
            ],
        }
    }

    fn test_catalogs() -> CatalogSet {
        CatalogSet {
            mode1: vec![CommandDescriptor::new("RPM", "010C")],
            mode9: Vec::new(),
            extensions: Vec::new(),
        }
    }

    #[test]
    fn test_populate_fills_every_entry() {
        let workbook = test_workbook();
        let (mut sel, _) = selection::build(
            &["RPM".to_string()],
            &["0x05".to_string()],
            &["0x02".to_string()],
            &test_catalogs(),
        );
        let config = Config::default();
        let (b_labels, g_labels, diagnostics) =
            populate(&workbook, &mut sel, &config).unwrap();

        assert_eq!(b_labels[0], "PID");
        assert_eq!(g_labels.len(), 2);
        assert!(diagnostics.is_empty());

        let rpm = &sel.parameters["0x0C"];
        assert_eq!(rpm.header_fields["Description"], text("Engine speed"));
        assert_eq!(rpm.body_rows.len(), 2);

        let vin = &sel.infotypes["0x02"];
        assert_eq!(vin.body_rows.len(), 1);
    }

    #[test]
    fn test_populate_keeps_missing_pid_with_empty_record() {
        let workbook = test_workbook();
        let (mut sel, _) =
            selection::build(&[], &["0xEE".to_string()], &[], &test_catalogs());
        let config = Config::default();
        let (_, _, diagnostics) = populate(&workbook, &mut sel, &config).unwrap();

        let entry = &sel.parameters["0xEE"];
        assert!(entry.header_fields.is_empty());
        assert!(entry.body_rows.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "PID_NOT_FOUND");
    }

    #[test]
    fn test_populate_distinguishes_unterminated_block() {
        // 0x0D opens at the last row of the Annex B sheet; with the
        // end-of-sheet terminator disabled its block never closes, which is
        // not the same condition as the PID being absent
        let workbook = test_workbook();
        let (mut sel, _) = selection::build(
            &[],
            &["0x0D".to_string(), "0xEE".to_string()],
            &[],
            &test_catalogs(),
        );
        let config = Config {
            close_range_at_sheet_end: false,
            ..Config::default()
        };
        let (_, _, diagnostics) = populate(&workbook, &mut sel, &config).unwrap();

        assert!(sel.parameters["0x0D"].header_fields.is_empty());
        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["PID_BLOCK_UNTERMINATED", "PID_NOT_FOUND"]);
        assert!(diagnostics[0].message.contains("no closing marker"));
        assert!(diagnostics[0].message.contains("0x0D"));
    }

    #[test]
    fn test_populate_missing_sheet_is_fatal() {
        let mut workbook = test_workbook();
        workbook.sheets.remove(1);
        let (mut sel, _) = selection::build(&[], &[], &[], &test_catalogs());
        let err = populate(&workbook, &mut sel, &Config::default()).unwrap_err();
        let ExtractError::MissingSheet { sheet, .. } = err;
        assert_eq!(sheet, "Annex G - InfoType IDs");
    }
}
