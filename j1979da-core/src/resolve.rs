//! Name/PID resolution against the command catalogs

use crate::catalog::{CatalogSet, Category};

/// Normalize a PID string to its canonical `0xXX` form (uppercase hex).
///
/// Accepts `0x0c`, `0X0C`, or a bare `0c`; anything that is not exactly one
/// hex-encoded byte is rejected.
pub fn canonical_pid(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", digits.to_ascii_uppercase()))
}

/// Canonical PID derived from a descriptor's wire code, e.g. `"010C"` -> `"0x0C"`.
fn pid_from_code(raw_code: &str) -> Option<String> {
    raw_code.get(2..4).and_then(canonical_pid)
}

/// Resolve a symbolic command name to its category and canonical PID.
///
/// Searches `mode1`, then `mode9`, then `extensions`; the first name match
/// wins. Extension commands carry either mode, so their category comes from
/// the wire code's mode byte; an extension with an unknown mode byte leaves
/// the name unresolved. Returns `None` for unknown names.
pub fn command_category_pid(name: &str, catalogs: &CatalogSet) -> Option<(Category, String)> {
    for cmd in &catalogs.mode1 {
        if cmd.name == name {
            return pid_from_code(&cmd.raw_code).map(|pid| (Category::Parameter, pid));
        }
    }
    for cmd in &catalogs.mode9 {
        if cmd.name == name {
            return pid_from_code(&cmd.raw_code).map(|pid| (Category::InfoType, pid));
        }
    }
    for cmd in &catalogs.extensions {
        if cmd.name == name {
            let category = cmd.mode().and_then(Category::from_mode)?;
            return pid_from_code(&cmd.raw_code).map(|pid| (category, pid));
        }
    }
    None
}

/// Resolve a (category, PID) pair back to a command name.
///
/// Scans all catalogs in fixed concatenation order (mode1, mode9,
/// extensions); the first descriptor whose mode byte matches the category and
/// whose PID byte matches wins, so the result is deterministic even when
/// descriptors share a wire code.
pub fn name_for_pid<'a>(category: Category, pid: &str, catalogs: &'a CatalogSet) -> Option<&'a str> {
    let pid = canonical_pid(pid)?;
    let pid_byte = &pid[2..4];

    catalogs
        .all()
        .find(|cmd| {
            cmd.mode() == Some(category.mode())
                && cmd.pid_byte().is_some_and(|b| b.eq_ignore_ascii_case(pid_byte))
        })
        .map(|cmd| cmd.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CommandDescriptor;

    fn small_catalogs() -> CatalogSet {
        CatalogSet {
            mode1: vec![
                CommandDescriptor::new("RPM", "010C"),
                CommandDescriptor::new("SPEED", "010D"),
            ],
            mode9: vec![CommandDescriptor::new("VIN", "0902")],
            extensions: vec![
                CommandDescriptor::new("ODOMETER", "01A6"),
                CommandDescriptor::new("EXT_INFOTYPE", "090C"),
                CommandDescriptor::new("BROKEN_MODE", "220C"),
            ],
        }
    }

    #[test]
    fn test_canonical_pid() {
        assert_eq!(canonical_pid("0x0c"), Some("0x0C".to_string()));
        assert_eq!(canonical_pid("0X0C"), Some("0x0C".to_string()));
        assert_eq!(canonical_pid("a6"), Some("0xA6".to_string()));
        assert_eq!(canonical_pid("0x0"), None);
        assert_eq!(canonical_pid("0x0CC"), None);
        assert_eq!(canonical_pid("zz"), None);
    }

    #[test]
    fn test_mode1_name_resolves_to_parameter() {
        let catalogs = small_catalogs();
        assert_eq!(
            command_category_pid("RPM", &catalogs),
            Some((Category::Parameter, "0x0C".to_string()))
        );
    }

    #[test]
    fn test_mode9_name_resolves_to_infotype() {
        let catalogs = small_catalogs();
        assert_eq!(
            command_category_pid("VIN", &catalogs),
            Some((Category::InfoType, "0x02".to_string()))
        );
    }

    #[test]
    fn test_extension_category_from_mode_byte() {
        let catalogs = small_catalogs();
        assert_eq!(
            command_category_pid("ODOMETER", &catalogs),
            Some((Category::Parameter, "0xA6".to_string()))
        );
        assert_eq!(
            command_category_pid("EXT_INFOTYPE", &catalogs),
            Some((Category::InfoType, "0x0C".to_string()))
        );
        // Unknown mode byte leaves the command unresolved
        assert_eq!(command_category_pid("BROKEN_MODE", &catalogs), None);
    }

    #[test]
    fn test_unknown_name_is_unresolved() {
        let catalogs = small_catalogs();
        assert_eq!(command_category_pid("NOT_A_COMMAND", &catalogs), None);
    }

    #[test]
    fn test_mode1_precedence_over_duplicate_name() {
        let mut catalogs = small_catalogs();
        catalogs
            .extensions
            .insert(0, CommandDescriptor::new("RPM", "09FF"));
        // First catalog wins even though an extension shares the name
        assert_eq!(
            command_category_pid("RPM", &catalogs),
            Some((Category::Parameter, "0x0C".to_string()))
        );
    }

    #[test]
    fn test_name_for_pid_matches_mode_and_byte() {
        let catalogs = small_catalogs();
        assert_eq!(name_for_pid(Category::Parameter, "0x0C", &catalogs), Some("RPM"));
        assert_eq!(name_for_pid(Category::InfoType, "0x02", &catalogs), Some("VIN"));
        // Same PID byte, wrong category
        assert_eq!(name_for_pid(Category::InfoType, "0x0D", &catalogs), None);
        // Lowercase input normalizes before matching
        assert_eq!(name_for_pid(Category::Parameter, "0xa6", &catalogs), Some("ODOMETER"));
    }

    #[test]
    fn test_name_for_pid_first_match_wins_on_shared_code() {
        let mut catalogs = small_catalogs();
        catalogs
            .extensions
            .push(CommandDescriptor::new("RPM_ALIAS", "010C"));
        assert_eq!(name_for_pid(Category::Parameter, "0x0C", &catalogs), Some("RPM"));
    }

    #[test]
    fn test_name_for_pid_absent() {
        let catalogs = small_catalogs();
        assert_eq!(name_for_pid(Category::Parameter, "0xEE", &catalogs), None);
    }
}
