//! Scan-code ↔ semantic-name translation tables.
//!
//! The physical keyboard reports four independent code spaces: regular key
//! slots in the boot-protocol report, the modifier bitmask byte, and three
//! media-control bitmask bytes. Each space gets its own fixed table mapping
//! hardware codes to the semantic names that travel on the downstream wire
//! (`LEFT_CONTROL`, `SPACE`, `VOLUME_UP`, …).
//!
//! The tables are hand-authored for the one device the hub fronts (an AZERTY
//! composite keyboard/mouse); this is deliberately not a report-descriptor
//! parser. Both lookup directions are needed on the hot path – code→name when
//! decoding physical reports, name→code when re-encoding output reports for
//! the Bluetooth peer – so each space is built once into a pair of hash maps.

use std::collections::HashMap;

// ── Static table data ─────────────────────────────────────────────────────────

/// Modifier bitmask byte (report byte 1): bit value → name.
const MODIFIERS: &[(u8, &str)] = &[
    (0x01, "LEFT_CONTROL"),
    (0x02, "LEFT_SHIFT"),
    (0x04, "LEFT_ALT"),
    (0x08, "LEFT_WIN"),
    (0x20, "RIGHT_SHIFT"),
    (0x40, "RIGHT_ALT"),
];

/// Regular key slots (report bytes 2..): scan code → name.
const KEYS: &[(u8, &str)] = &[
    (0x29, "ESCAPE"),
    (0x3a, "F1"),
    (0x3b, "F2"),
    (0x3c, "F3"),
    (0x3d, "F4"),
    (0x3e, "F5"),
    (0x3f, "F6"),
    (0x40, "F7"),
    (0x41, "F8"),
    (0x42, "F9"),
    (0x43, "F10"),
    (0x44, "F11"),
    (0x45, "F12"),
    (0x48, "PAUSE"),
    (0x46, "PRINT_SCREEN"),
    (0x49, "INSERT"),
    (0x4c, "DELETE"),
    // Digit row
    (0x35, "SUPERSCRIPT_TWO"),
    (0x1e, "1"),
    (0x1f, "2"),
    (0x20, "3"),
    (0x21, "4"),
    (0x22, "5"),
    (0x23, "6"),
    (0x24, "7"),
    (0x25, "8"),
    (0x26, "9"),
    (0x27, "0"),
    (0x2d, "DEGREE"),
    (0x2e, "PLUS"),
    (0x2a, "BACKSPACE"),
    // Top letter row (AZERTY)
    (0x2b, "TAB"),
    (0x14, "A"),
    (0x1a, "Z"),
    (0x08, "E"),
    (0x15, "R"),
    (0x17, "T"),
    (0x1c, "Y"),
    (0x18, "U"),
    (0x0c, "I"),
    (0x12, "O"),
    (0x13, "P"),
    (0x2f, "CIRCUMFLEX"),
    (0x30, "DOLLAR"),
    (0x31, "ASTERISK"),
    // Home row
    (0x39, "CAPS_LOCK"),
    (0x04, "Q"),
    (0x16, "S"),
    (0x07, "D"),
    (0x09, "F"),
    (0x0a, "G"),
    (0x0b, "H"),
    (0x0d, "J"),
    (0x0e, "K"),
    (0x0f, "L"),
    (0x33, "M"),
    (0x34, "U_GRAVE"),
    (0x28, "ENTER"),
    // Bottom row
    (0x64, "ANGLE_BRACKET"),
    (0x1d, "W"),
    (0x1b, "X"),
    (0x06, "C"),
    (0x19, "V"),
    (0x05, "B"),
    (0x11, "N"),
    (0x10, "COMMA"),
    (0x36, "SEMICOLON"),
    (0x37, "COLON"),
    (0x38, "EXCLAMATION"),
    // Space and navigation cluster
    (0x2c, "SPACE"),
    (0x4f, "RIGHT_ARROW"),
    (0x4a, "HOME"),
    (0x52, "UP_ARROW"),
    (0x4b, "PAGE_UP"),
    (0x51, "DOWN_ARROW"),
    (0x4e, "PAGE_DOWN"),
    (0x50, "LEFT_ARROW"),
    (0x4d, "END"),
];

/// Media report byte 1: bit value → name.
const MEDIA1: &[(u8, &str)] = &[(0x08, "AC_HOME"), (0x20, "AC_SEARCH")];

/// Media report byte 2: bit value → name.
const MEDIA2: &[(u8, &str)] = &[(0x10, "AC_BACK")];

/// Media report byte 3: bit value → name.
const MEDIA3: &[(u8, &str)] = &[
    (0x01, "PREVIOUS_TRACK"),
    (0x02, "NEXT_TRACK"),
    (0x04, "POWER"),
    (0x08, "PLAY_PAUSE"),
    (0x10, "VOLUME_UP"),
    (0x20, "VOLUME_DOWN"),
];

// ── Lookup structures ─────────────────────────────────────────────────────────

/// One code space with O(1) lookup in both directions.
#[derive(Debug, Clone)]
pub struct CodeSpace {
    forward: HashMap<u8, &'static str>,
    reverse: HashMap<&'static str, u8>,
}

impl CodeSpace {
    fn build(entries: &'static [(u8, &'static str)]) -> Self {
        let forward: HashMap<u8, &'static str> = entries.iter().copied().collect();
        let reverse: HashMap<&'static str, u8> =
            entries.iter().map(|&(code, name)| (name, code)).collect();
        Self { forward, reverse }
    }

    /// Returns the semantic name registered for `code`, if any.
    pub fn name_for(&self, code: u8) -> Option<&'static str> {
        self.forward.get(&code).copied()
    }

    /// Returns the hardware code (scan code or bit value) for `name`, if any.
    pub fn code_for(&self, name: &str) -> Option<u8> {
        self.reverse.get(name).copied()
    }

    /// Returns `true` if `name` belongs to this code space.
    pub fn contains(&self, name: &str) -> bool {
        self.reverse.contains_key(name)
    }
}

/// The five fixed code spaces of the physical device, built once at process
/// start and shared immutably for the process lifetime.
#[derive(Debug, Clone)]
pub struct KeymapTable {
    pub keys: CodeSpace,
    pub modifiers: CodeSpace,
    pub media1: CodeSpace,
    pub media2: CodeSpace,
    pub media3: CodeSpace,
}

impl KeymapTable {
    /// Builds all code spaces from the compiled-in tables.
    pub fn new() -> Self {
        Self {
            keys: CodeSpace::build(KEYS),
            modifiers: CodeSpace::build(MODIFIERS),
            media1: CodeSpace::build(MEDIA1),
            media2: CodeSpace::build(MEDIA2),
            media3: CodeSpace::build(MEDIA3),
        }
    }

    /// Returns `true` if `name` is registered in any code space, i.e. it is
    /// part of the semantic vocabulary the downstream wire may carry.
    pub fn knows(&self, name: &str) -> bool {
        self.keys.contains(name)
            || self.modifiers.contains(name)
            || self.media1.contains(name)
            || self.media2.contains(name)
            || self.media3.contains(name)
    }
}

impl Default for KeymapTable {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_lookup_finds_registered_scan_codes() {
        let table = KeymapTable::new();
        assert_eq!(table.keys.name_for(0x2c), Some("SPACE"));
        assert_eq!(table.keys.name_for(0x29), Some("ESCAPE"));
        assert_eq!(table.keys.name_for(0x4a), Some("HOME"));
    }

    #[test]
    fn test_forward_lookup_returns_none_for_unregistered_code() {
        let table = KeymapTable::new();
        // 0x65 (keypad dot on other layouts) is not in this device's table
        assert_eq!(table.keys.name_for(0x65), None);
        assert_eq!(table.keys.name_for(0x00), None);
    }

    #[test]
    fn test_reverse_lookup_inverts_forward_lookup_for_every_entry() {
        let table = KeymapTable::new();
        for space in [
            &table.keys,
            &table.modifiers,
            &table.media1,
            &table.media2,
            &table.media3,
        ] {
            for (&code, &name) in &space.forward {
                assert_eq!(
                    space.code_for(name),
                    Some(code),
                    "reverse lookup for {name} must return 0x{code:02x}"
                );
            }
        }
    }

    #[test]
    fn test_modifier_bits_are_distinct_powers_of_two() {
        let table = KeymapTable::new();
        for (&bit, &name) in &table.modifiers.forward {
            assert_eq!(bit.count_ones(), 1, "{name} bit 0x{bit:02x} must be a single bit");
        }
    }

    #[test]
    fn test_media_spaces_hold_expected_names() {
        let table = KeymapTable::new();
        assert_eq!(table.media1.code_for("AC_HOME"), Some(0x08));
        assert_eq!(table.media2.code_for("AC_BACK"), Some(0x10));
        assert_eq!(table.media3.code_for("POWER"), Some(0x04));
        assert_eq!(table.media3.code_for("VOLUME_DOWN"), Some(0x20));
    }

    #[test]
    fn test_knows_covers_all_spaces() {
        let table = KeymapTable::new();
        assert!(table.knows("SPACE"));
        assert!(table.knows("LEFT_CONTROL"));
        assert!(table.knows("AC_SEARCH"));
        assert!(table.knows("PLAY_PAUSE"));
        assert!(!table.knows("NOT_A_KEY"));
    }

    #[test]
    fn test_no_duplicate_names_within_a_space() {
        // A duplicate name would make the reverse map smaller than the forward map.
        let table = KeymapTable::new();
        for space in [
            &table.keys,
            &table.modifiers,
            &table.media1,
            &table.media2,
            &table.media3,
        ] {
            assert_eq!(space.forward.len(), space.reverse.len());
        }
    }
}
