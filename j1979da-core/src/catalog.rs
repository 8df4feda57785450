//! OBD command catalogs
//!
//! Three ordered command tables mirror the external OBD reference library:
//! the standard service-01 (Annex B parameter) commands, the service-09
//! (Annex G InfoType) commands, and an extension table of commands added on
//! top of the standard set. Resolution precedence follows table order, so the
//! catalogs are passed around as one explicit [`CatalogSet`] value instead of
//! living in module state.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Wire-protocol mode byte for Annex B parameter commands
pub const MODE_PARAMETER: &str = "01";
/// Wire-protocol mode byte for Annex G InfoType commands
pub const MODE_INFOTYPE: &str = "09";

/// The two reference-table domains of the J1979DA workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Annex B parameter IDs (service 01)
    Parameter,
    /// Annex G InfoType IDs (service 09)
    InfoType,
}

impl Category {
    /// The wire-protocol mode byte for this category
    pub fn mode(&self) -> &'static str {
        match self {
            Category::Parameter => MODE_PARAMETER,
            Category::InfoType => MODE_INFOTYPE,
        }
    }

    /// Map a mode byte back to its category
    pub fn from_mode(mode: &str) -> Option<Category> {
        match mode {
            MODE_PARAMETER => Some(Category::Parameter),
            MODE_INFOTYPE => Some(Category::InfoType),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Parameter => write!(f, "annex_b"),
            Category::InfoType => write!(f, "annex_g"),
        }
    }
}

/// One entry of a command catalog.
///
/// `raw_code` is the hex-encoded wire command, at least two bytes: mode byte
/// followed by PID byte (e.g. `"010C"` for engine RPM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub raw_code: String,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>, raw_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_code: raw_code.into(),
        }
    }

    /// Mode byte of the wire command (first two hex digits)
    pub fn mode(&self) -> Option<&str> {
        self.raw_code.get(0..2)
    }

    /// PID byte of the wire command (second two hex digits)
    pub fn pid_byte(&self) -> Option<&str> {
        self.raw_code.get(2..4)
    }
}

/// The three ordered catalogs used for name/PID resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSet {
    /// Standard service-01 commands (searched first)
    #[serde(default)]
    pub mode1: Vec<CommandDescriptor>,
    /// Standard service-09 commands (searched second)
    #[serde(default)]
    pub mode9: Vec<CommandDescriptor>,
    /// Extension commands, either mode (searched last)
    #[serde(default)]
    pub extensions: Vec<CommandDescriptor>,
}

impl CatalogSet {
    /// Load a replacement catalog set from a TOML file.
    ///
    /// The file holds three arrays of tables (`mode1`, `mode9`, `extensions`)
    /// with `name` and `raw_code` keys; missing arrays default to empty.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalogs: CatalogSet = toml::from_str(&content)?;
        Ok(catalogs)
    }

    /// The built-in tables, mirroring the external OBD reference library.
    pub fn builtin() -> Self {
        Self {
            mode1: table(MODE1_COMMANDS),
            mode9: table(MODE9_COMMANDS),
            extensions: table(EXTENSION_COMMANDS),
        }
    }

    /// All descriptors in fixed concatenation order: mode1, mode9, extensions.
    pub fn all(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.mode1
            .iter()
            .chain(self.mode9.iter())
            .chain(self.extensions.iter())
    }
}

fn table(entries: &[(&str, &str)]) -> Vec<CommandDescriptor> {
    entries
        .iter()
        .map(|(name, code)| CommandDescriptor::new(*name, *code))
        .collect()
}

/// Standard service-01 command table (Annex B parameters)
const MODE1_COMMANDS: &[(&str, &str)] = &[
    ("PIDS_A", "0100"),
    ("STATUS", "0101"),
    ("FREEZE_DTC", "0102"),
    ("FUEL_STATUS", "0103"),
    ("ENGINE_LOAD", "0104"),
    ("COOLANT_TEMP", "0105"),
    ("SHORT_FUEL_TRIM_1", "0106"),
    ("LONG_FUEL_TRIM_1", "0107"),
    ("SHORT_FUEL_TRIM_2", "0108"),
    ("LONG_FUEL_TRIM_2", "0109"),
    ("FUEL_PRESSURE", "010A"),
    ("INTAKE_PRESSURE", "010B"),
    ("RPM", "010C"),
    ("SPEED", "010D"),
    ("TIMING_ADVANCE", "010E"),
    ("INTAKE_TEMP", "010F"),
    ("MAF", "0110"),
    ("THROTTLE_POS", "0111"),
    ("AIR_STATUS", "0112"),
    ("O2_SENSORS", "0113"),
    ("O2_B1S1", "0114"),
    ("O2_B1S2", "0115"),
    ("O2_B1S3", "0116"),
    ("O2_B1S4", "0117"),
    ("O2_B2S1", "0118"),
    ("O2_B2S2", "0119"),
    ("O2_B2S3", "011A"),
    ("O2_B2S4", "011B"),
    ("OBD_COMPLIANCE", "011C"),
    ("O2_SENSORS_ALT", "011D"),
    ("AUX_INPUT_STATUS", "011E"),
    ("RUN_TIME", "011F"),
    ("PIDS_B", "0120"),
    ("DISTANCE_W_MIL", "0121"),
    ("FUEL_RAIL_PRESSURE_VAC", "0122"),
    ("FUEL_RAIL_PRESSURE_DIRECT", "0123"),
    ("O2_S1_WR_VOLTAGE", "0124"),
    ("O2_S2_WR_VOLTAGE", "0125"),
    ("O2_S3_WR_VOLTAGE", "0126"),
    ("O2_S4_WR_VOLTAGE", "0127"),
    ("O2_S5_WR_VOLTAGE", "0128"),
    ("O2_S6_WR_VOLTAGE", "0129"),
    ("O2_S7_WR_VOLTAGE", "012A"),
    ("O2_S8_WR_VOLTAGE", "012B"),
    ("COMMANDED_EGR", "012C"),
    ("EGR_ERROR", "012D"),
    ("EVAPORATIVE_PURGE", "012E"),
    ("FUEL_LEVEL", "012F"),
    ("WARMUPS_SINCE_DTC_CLEAR", "0130"),
    ("DISTANCE_SINCE_DTC_CLEAR", "0131"),
    ("EVAP_VAPOR_PRESSURE", "0132"),
    ("BAROMETRIC_PRESSURE", "0133"),
    ("O2_S1_WR_CURRENT", "0134"),
    ("O2_S2_WR_CURRENT", "0135"),
    ("O2_S3_WR_CURRENT", "0136"),
    ("O2_S4_WR_CURRENT", "0137"),
    ("O2_S5_WR_CURRENT", "0138"),
    ("O2_S6_WR_CURRENT", "0139"),
    ("O2_S7_WR_CURRENT", "013A"),
    ("O2_S8_WR_CURRENT", "013B"),
    ("CATALYST_TEMP_B1S1", "013C"),
    ("CATALYST_TEMP_B2S1", "013D"),
    ("CATALYST_TEMP_B1S2", "013E"),
    ("CATALYST_TEMP_B2S2", "013F"),
    ("PIDS_C", "0140"),
    ("STATUS_DRIVE_CYCLE", "0141"),
    ("CONTROL_MODULE_VOLTAGE", "0142"),
    ("ABSOLUTE_LOAD", "0143"),
    ("COMMANDED_EQUIV_RATIO", "0144"),
    ("RELATIVE_THROTTLE_POS", "0145"),
    ("AMBIANT_AIR_TEMP", "0146"),
    ("THROTTLE_POS_B", "0147"),
    ("THROTTLE_POS_C", "0148"),
    ("ACCELERATOR_POS_D", "0149"),
    ("ACCELERATOR_POS_E", "014A"),
    ("ACCELERATOR_POS_F", "014B"),
    ("THROTTLE_ACTUATOR", "014C"),
    ("RUN_TIME_MIL", "014D"),
    ("TIME_SINCE_DTC_CLEARED", "014E"),
    ("MAX_VALUES", "014F"),
    ("MAX_MAF", "0150"),
    ("FUEL_TYPE", "0151"),
    ("ETHANOL_PERCENT", "0152"),
    ("EVAP_VAPOR_PRESSURE_ABS", "0153"),
    ("EVAP_VAPOR_PRESSURE_ALT", "0154"),
    ("SHORT_O2_TRIM_B1", "0155"),
    ("LONG_O2_TRIM_B1", "0156"),
    ("SHORT_O2_TRIM_B2", "0157"),
    ("LONG_O2_TRIM_B2", "0158"),
    ("FUEL_RAIL_PRESSURE_ABS", "0159"),
    ("RELATIVE_ACCEL_POS", "015A"),
    ("HYBRID_BATTERY_REMAINING", "015B"),
    ("OIL_TEMP", "015C"),
    ("FUEL_INJECT_TIMING", "015D"),
    ("FUEL_RATE", "015E"),
];

/// Standard service-09 command table (Annex G InfoTypes)
const MODE9_COMMANDS: &[(&str, &str)] = &[
    ("PIDS_9A", "0900"),
    ("VIN_MESSAGE_COUNT", "0901"),
    ("VIN", "0902"),
    ("CALIBRATION_ID_MESSAGE_COUNT", "0903"),
    ("CALIBRATION_ID", "0904"),
    ("CVN_MESSAGE_COUNT", "0905"),
    ("CVN", "0906"),
    ("PERF_TRACKING_SPARK", "0908"),
    ("ECU_NAME_MESSAGE_COUNT", "0909"),
    ("ECU_NAME", "090A"),
    ("PERF_TRACKING_COMPRESSION", "090B"),
];

/// Extension command table (telemetry additions beyond the standard set)
const EXTENSION_COMMANDS: &[(&str, &str)] = &[
    ("DEMANDED_TORQUE", "0161"),
    ("PERCENT_TORQUE", "0162"),
    ("REFERENCE_TORQUE", "0163"),
    ("PERCENT_TORQUE_DATA", "0164"),
    ("AUX_IO_SUPPORTED", "0165"),
    ("MAF_SENSOR", "0166"),
    ("COOLANT_TEMPERATURE_PAIR", "0167"),
    ("EGT_BANK_1", "0178"),
    ("EGT_BANK_2", "0179"),
    ("DPF_BANK_1", "017A"),
    ("DPF_BANK_2", "017B"),
    ("NOX_SENSOR", "0183"),
    ("ENGINE_RUN_TIME", "017F"),
    ("ODOMETER", "01A6"),
];
