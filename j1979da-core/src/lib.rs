//! j1979da-core: extract PID/InfoType records from SAE J1979DA spreadsheets
//!
//! The J1979DA standard ships as an Excel workbook whose annex sheets hold
//! PID-delimited row blocks. This library resolves symbolic OBD command names
//! and explicit PIDs into a selection set, locates each PID's block in its
//! annex sheet, and returns the blocks as structured records ready for
//! rendering.

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod reader;
pub mod resolve;
pub mod selection;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

pub use catalog::{CatalogSet, Category, CommandDescriptor};
pub use config::Config;
pub use diagnostics::{Diagnostic, Severity};
pub use extract::ExtractError;
pub use selection::{SelectionEntry, SelectionSet};

/// Everything produced by one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// Column labels of the Annex B parameter sheet
    pub annex_b_header: Vec<String>,
    /// Column labels of the Annex G InfoType sheet
    pub annex_g_header: Vec<String>,
    /// The populated selection maps
    pub selection: SelectionSet,
    /// Advisory notes: unresolved commands, malformed PIDs, missing blocks
    pub diagnostics: Vec<Diagnostic>,
}

/// Main extraction interface
pub struct Extractor {
    config: Config,
    catalogs: CatalogSet,
}

impl Extractor {
    /// Create an extractor with default configuration and built-in catalogs
    pub fn new() -> Self {
        Self::with_config(Config::default(), CatalogSet::builtin())
    }

    /// Create an extractor with custom configuration and catalogs
    pub fn with_config(config: Config, catalogs: CatalogSet) -> Self {
        Self { config, catalogs }
    }

    /// Run a full extraction against a workbook file.
    ///
    /// Opens the workbook once, builds the selection set from the given
    /// command names and explicit PID lists, and populates every entry from
    /// its annex sheet. Fails only when the workbook cannot be read or a
    /// required sheet is missing.
    pub fn extract_file<P: AsRef<Path>>(
        &self,
        path: P,
        commands: &[String],
        annex_b_pids: &[String],
        annex_g_pids: &[String],
    ) -> Result<Extraction> {
        let path = path.as_ref();
        let workbook = reader::read_workbook(path)?;
        self.extract(&workbook, commands, annex_b_pids, annex_g_pids)
            .with_context(|| format!("Failed to extract from {}", path.display()))
    }

    /// Run a full extraction against an already loaded workbook.
    pub fn extract(
        &self,
        workbook: &reader::Workbook,
        commands: &[String],
        annex_b_pids: &[String],
        annex_g_pids: &[String],
    ) -> Result<Extraction> {
        let (mut selection, mut diagnostics) =
            selection::build(commands, annex_b_pids, annex_g_pids, &self.catalogs);

        let (annex_b_header, annex_g_header, extract_diagnostics) =
            extract::populate(workbook, &mut selection, &self.config)?;
        diagnostics.extend(extract_diagnostics);

        Ok(Extraction {
            annex_b_header,
            annex_g_header,
            selection,
            diagnostics,
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{CellValue, Sheet, Workbook};
    use std::path::PathBuf;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    fn workbook() -> Workbook {
        Workbook {
            path: PathBuf::from("j1979da.xlsx"),
            sheets: vec![
                Sheet {
                    name: config::ANNEX_B_SHEET.to_string(),
                    rows: vec![
                        vec![text("PID"), text("Description"), text("Data Byte")],
                        vec![text("0x05"), text("Engine coolant temperature")],
                        vec![CellValue::Empty, text("Coolant temp"), text("A")],
                        vec![text("0x0C"), text("Engine speed")],
                        vec![CellValue::Empty, text("RPM high"), text("A")],
                        vec![CellValue::Empty, text("RPM low"), text("B")],
                        vec![text("0x0D"), text("Vehicle speed")],
                    ],
                },
                Sheet {
                    name: config::ANNEX_G_SHEET.to_string(),
                    rows: vec![vec![text("PID"), text("Description")]],
                },
            ],
        }
    }

    #[test]
    fn test_end_to_end_commands_and_pids() {
        let extractor = Extractor::new();
        let extraction = extractor
            .extract(
                &workbook(),
                &["RPM".to_string()],
                &["0x05".to_string()],
                &[],
            )
            .unwrap();

        let pids: Vec<_> = extraction.selection.parameters.keys().collect();
        assert_eq!(pids, vec!["0x05", "0x0C"]);
        assert!(extraction.selection.infotypes.is_empty());

        for entry in extraction.selection.parameters.values() {
            assert!(!entry.header_fields.is_empty());
        }
        assert_eq!(
            extraction.selection.parameters["0x0C"].name.as_deref(),
            Some("RPM")
        );
        // 0x05 got its name by reverse resolution from the built-in catalog
        assert_eq!(
            extraction.selection.parameters["0x05"].name.as_deref(),
            Some("COOLANT_TEMP")
        );
    }

    #[test]
    fn test_end_to_end_missing_sheet_fails() {
        let mut wb = workbook();
        wb.sheets.pop();
        let extractor = Extractor::new();
        let err = extractor.extract(&wb, &[], &[], &[]).unwrap_err();
        assert!(err.to_string().contains(config::ANNEX_G_SHEET));
    }

    #[test]
    fn test_extraction_serializes_to_json() {
        let extractor = Extractor::new();
        let extraction = extractor
            .extract(&workbook(), &["NO_SUCH".to_string()], &["0xEE".to_string()], &[])
            .unwrap();

        let json = serde_json::to_value(&extraction).unwrap();
        assert!(json.get("selection").is_some());
        let diags = json["diagnostics"].as_array().unwrap();
        // one unresolved command, one PID not found in the sheet
        assert_eq!(diags.len(), 2);
    }
}
