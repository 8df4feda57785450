//! Selection set construction
//!
//! Merges explicit PID lists and symbolic command names into two maps of
//! [`SelectionEntry`], one per category. Entries are keyed by canonical PID,
//! so the maps iterate in a stable order.

use crate::catalog::{CatalogSet, Category};
use crate::diagnostics::Diagnostic;
use crate::reader::CellValue;
use crate::resolve;
use serde::Serialize;
use std::collections::BTreeMap;

/// The unit of extraction output, one per selected PID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionEntry {
    /// Symbolic command name, absent when no catalog entry matches the PID
    pub name: Option<String>,
    pub category: Category,
    /// Canonical `0xXX` PID
    pub pid: String,
    /// Column label -> value from the first row of the PID's block
    pub header_fields: BTreeMap<String, CellValue>,
    /// One label -> value map per subsequent row of the block, in sheet order
    /// (index 0 is position 1)
    pub body_rows: Vec<BTreeMap<String, CellValue>>,
}

impl SelectionEntry {
    fn new(category: Category, pid: String, name: Option<String>) -> Self {
        Self {
            name,
            category,
            pid,
            header_fields: BTreeMap::new(),
            body_rows: Vec::new(),
        }
    }
}

/// Both category maps of a run, keyed by canonical PID.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionSet {
    pub parameters: BTreeMap<String, SelectionEntry>,
    pub infotypes: BTreeMap<String, SelectionEntry>,
}

impl SelectionSet {
    /// Mutable access to the map for a category
    pub fn map_mut(&mut self, category: Category) -> &mut BTreeMap<String, SelectionEntry> {
        match category {
            Category::Parameter => &mut self.parameters,
            Category::InfoType => &mut self.infotypes,
        }
    }

    /// Shared access to the map for a category
    pub fn map(&self, category: Category) -> &BTreeMap<String, SelectionEntry> {
        match category {
            Category::Parameter => &self.parameters,
            Category::InfoType => &self.infotypes,
        }
    }
}

/// Build the selection set for a run.
///
/// Explicit PID lists are seeded first, with names filled in by reverse
/// resolution where possible. Command names are applied afterwards and
/// overwrite any seeded entry for the same PID, so a name given on the
/// command line wins over a reverse-resolved one. Unresolved command names
/// and malformed PIDs are dropped with a warning diagnostic.
pub fn build(
    commands: &[String],
    annex_b_pids: &[String],
    annex_g_pids: &[String],
    catalogs: &CatalogSet,
) -> (SelectionSet, Vec<Diagnostic>) {
    let mut selection = SelectionSet::default();
    let mut diagnostics = Vec::new();

    seed_pids(
        &mut selection,
        &mut diagnostics,
        Category::Parameter,
        annex_b_pids,
        catalogs,
    );
    seed_pids(
        &mut selection,
        &mut diagnostics,
        Category::InfoType,
        annex_g_pids,
        catalogs,
    );

    for command in commands {
        match resolve::command_category_pid(command, catalogs) {
            Some((category, pid)) => {
                selection.map_mut(category).insert(
                    pid.clone(),
                    SelectionEntry::new(category, pid, Some(command.clone())),
                );
            }
            None => {
                diagnostics.push(Diagnostic::warning(
                    "UNRESOLVED_COMMAND",
                    format!("command '{}' not found in any catalog, dropped", command),
                ));
            }
        }
    }

    (selection, diagnostics)
}

fn seed_pids(
    selection: &mut SelectionSet,
    diagnostics: &mut Vec<Diagnostic>,
    category: Category,
    pids: &[String],
    catalogs: &CatalogSet,
) {
    for raw_pid in pids {
        let Some(pid) = resolve::canonical_pid(raw_pid) else {
            diagnostics.push(Diagnostic::warning(
                "MALFORMED_PID",
                format!("{}: '{}' is not a 0xXX identifier, skipped", category, raw_pid),
            ));
            continue;
        };
        let name = resolve::name_for_pid(category, &pid, catalogs).map(str::to_string);
        selection
            .map_mut(category)
            .insert(pid.clone(), SelectionEntry::new(category, pid, name));
    }
}
