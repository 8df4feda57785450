//! Extraction configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sheet name of the Annex B parameter table in the J1979DA workbook
pub const ANNEX_B_SHEET: &str = "Annex B - Parameter IDs";
/// Sheet name of the Annex G InfoType table in the J1979DA workbook
pub const ANNEX_G_SHEET: &str = "Annex G - InfoType IDs";

/// Configuration for one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the Annex B parameter sheet
    #[serde(default = "default_annex_b_sheet")]
    pub annex_b_sheet: String,
    /// Name of the Annex G InfoType sheet
    #[serde(default = "default_annex_g_sheet")]
    pub annex_g_sheet: String,
    /// Whether a PID block running to the last sheet row closes there.
    /// When false, a block with no following `0x..` marker yields no range
    /// and the record extracts empty.
    #[serde(default = "default_close_range")]
    pub close_range_at_sheet_end: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annex_b_sheet: default_annex_b_sheet(),
            annex_g_sheet: default_annex_g_sheet(),
            close_range_at_sheet_end: default_close_range(),
        }
    }
}

fn default_annex_b_sheet() -> String {
    ANNEX_B_SHEET.to_string()
}

fn default_annex_g_sheet() -> String {
    ANNEX_G_SHEET.to_string()
}

fn default_close_range() -> bool {
    true
}
