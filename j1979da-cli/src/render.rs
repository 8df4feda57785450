//! Document rendering for extractions
//!
//! The Markdown layout mirrors the printed standard extract: one section per
//! PID with its description, comments, and a small value table per data-byte
//! row. JSON mode dumps the whole extraction for downstream tooling.

use anyhow::Result;
use j1979da_core::extract::collapse_embedded_whitespace;
use j1979da_core::reader::CellValue;
use j1979da_core::{Category, Config, Extraction, SelectionEntry};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

const DOCUMENT_TITLE: &str = "SAE J1979 Standard Extract";

/// Render an extraction as a Markdown document.
pub fn render_markdown(extraction: &Extraction, config: &Config, source: &Path) -> String {
    let mut doc = String::new();
    let _ = writeln!(doc, "# {}: {}", DOCUMENT_TITLE, source.display());

    for entry in extraction.selection.parameters.values() {
        render_entry(&mut doc, entry, &config.annex_b_sheet);
    }
    for entry in extraction.selection.infotypes.values() {
        render_entry(&mut doc, entry, &config.annex_g_sheet);
    }

    doc
}

/// Render an extraction as pretty-printed JSON.
pub fn render_json(extraction: &Extraction) -> Result<String> {
    Ok(serde_json::to_string_pretty(extraction)?)
}

fn render_entry(doc: &mut String, entry: &SelectionEntry, sheet_name: &str) {
    let name = entry.name.as_deref().unwrap_or("unknown");

    // Section heading; the description is absent when the PID was not found
    match field_text(&entry.header_fields, "Description") {
        Some(description) => {
            let _ = writeln!(
                doc,
                "\n## {}: {}: {} ({})",
                sheet_name, entry.pid, name, description
            );
        }
        None => {
            let _ = writeln!(doc, "\n## {}: {}: {}", sheet_name, entry.pid, name);
        }
    }

    if let Some(comment) = field_text(&entry.header_fields, "Comment") {
        let _ = writeln!(doc, "\n{}", comment);
    }

    for (position, fields) in entry.body_rows.iter().enumerate() {
        render_body_row(doc, entry.category, position + 1, fields);
    }

    // Section separator, the page-break analog
    let _ = writeln!(doc, "\n---");
}

fn render_body_row(
    doc: &mut String,
    category: Category,
    position: usize,
    fields: &BTreeMap<String, CellValue>,
) {
    let Some(data_byte) = field_text(fields, "Data Byte") else {
        // InfoType rows without a data byte still get a heading line
        if category == Category::InfoType {
            if let Some(description) = field_text(fields, "Description") {
                let _ = writeln!(doc, "\n### {}. {}", position, description);
            }
            if let Some(comment) = field_text(fields, "Comment") {
                let _ = writeln!(doc, "\n{}", comment);
            }
        }
        return;
    };

    let description = field_text(fields, "Description").unwrap_or_default();
    let _ = writeln!(doc, "\n### {}. Data Byte {}, {}", position, data_byte, description);

    if let Some(comment) = field_text(fields, "Comment") {
        let _ = writeln!(doc, "\n{}", comment);
    }

    if let Some(term) = field_text(fields, "US OBD Regulatory term used") {
        let _ = writeln!(doc, "\n#### US OBD Regulatory term used");
        let _ = writeln!(doc, "\n{}", collapse_embedded_whitespace(&term));
    }

    let max = field_text(fields, "Max. Value").unwrap_or_default();
    let min = field_text(fields, "Min. Value").unwrap_or_default();
    let scaling = field_text(fields, "Scaling/bit").unwrap_or_default();

    let _ = writeln!(doc, "\n| Data Byte | Maximum Value | Minimum Value | Scaling/Bit |");
    let _ = writeln!(doc, "| --- | --- | --- | --- |");
    let _ = writeln!(doc, "| {} | {} | {} | {} |", data_byte, max, min, scaling);
}

fn field_text(fields: &BTreeMap<String, CellValue>, label: &str) -> Option<String> {
    fields.get(label).map(|value| value.to_string())
}
