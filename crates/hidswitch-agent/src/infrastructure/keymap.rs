//! Semantic wire names → injector key names.
//!
//! The hub relays the semantic names of an AZERTY composite keyboard; the
//! injection API wants its own identifiers. Names that have no sensible local
//! equivalent map to `None` and are silently skipped by the replay layer
//! (CAPS_LOCK and INSERT are dropped on purpose, they cause more grief than
//! they are worth on a shared desktop).

/// Translates one wire name into the injector's key identifier.
pub fn injector_key(name: &str) -> Option<&'static str> {
    let key = match name {
        // Letters keep their AZERTY positions; the injector wants lowercase.
        "A" => "a",
        "B" => "b",
        "C" => "c",
        "D" => "d",
        "E" => "e",
        "F" => "f",
        "G" => "g",
        "H" => "h",
        "I" => "i",
        "J" => "j",
        "K" => "k",
        "L" => "l",
        "M" => "m",
        "N" => "n",
        "O" => "o",
        "P" => "p",
        "Q" => "q",
        "R" => "r",
        "S" => "s",
        "T" => "t",
        "U" => "u",
        "V" => "v",
        "W" => "w",
        "X" => "x",
        "Y" => "y",
        "Z" => "z",
        "0" => "0",
        "1" => "1",
        "2" => "2",
        "3" => "3",
        "4" => "4",
        "5" => "5",
        "6" => "6",
        "7" => "7",
        "8" => "8",
        "9" => "9",
        // Modifiers collapse onto their local equivalents.
        "LEFT_CONTROL" => "control",
        "LEFT_SHIFT" | "RIGHT_SHIFT" => "shift",
        "LEFT_ALT" | "RIGHT_ALT" => "alt",
        "LEFT_WIN" => "command",
        // Whitespace and editing
        "SPACE" => "space",
        "ENTER" => "enter",
        "BACKSPACE" => "backspace",
        "TAB" => "tab",
        "ESCAPE" => "escape",
        "DELETE" => "delete",
        // Navigation cluster
        "UP_ARROW" => "up",
        "DOWN_ARROW" => "down",
        "LEFT_ARROW" => "left",
        "RIGHT_ARROW" => "right",
        "HOME" => "home",
        "END" => "end",
        "PAGE_UP" => "pageup",
        "PAGE_DOWN" => "pagedown",
        // Function row
        "F1" => "f1",
        "F2" => "f2",
        "F3" => "f3",
        "F4" => "f4",
        "F5" => "f5",
        "F6" => "f6",
        "F7" => "f7",
        "F8" => "f8",
        "F9" => "f9",
        "F10" => "f10",
        "F11" => "f11",
        "F12" => "f12",
        "PRINT_SCREEN" => "printscreen",
        // AZERTY punctuation with direct equivalents
        "COMMA" => ",",
        "SEMICOLON" => ";",
        "COLON" => ":",
        "EXCLAMATION" => "!",
        "DOLLAR" => "$",
        "ASTERISK" => "*",
        "ANGLE_BRACKET" => "<",
        // Media controls. AC_HOME doubles as escape locally, the closest
        // thing a desktop session has to "go home".
        "AC_HOME" => "escape",
        "PLAY_PAUSE" => "audio_play",
        "VOLUME_UP" => "audio_vol_up",
        "VOLUME_DOWN" => "audio_vol_down",
        "NEXT_TRACK" => "audio_next",
        "PREVIOUS_TRACK" => "audio_prev",
        _ => return None,
    };
    Some(key)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_map_to_lowercase() {
        assert_eq!(injector_key("Q"), Some("q"));
        assert_eq!(injector_key("M"), Some("m"));
    }

    #[test]
    fn test_shift_variants_collapse() {
        assert_eq!(injector_key("LEFT_SHIFT"), Some("shift"));
        assert_eq!(injector_key("RIGHT_SHIFT"), Some("shift"));
    }

    #[test]
    fn test_unmapped_names_are_skipped() {
        assert_eq!(injector_key("CAPS_LOCK"), None);
        assert_eq!(injector_key("INSERT"), None);
        assert_eq!(injector_key("POWER"), None);
        assert_eq!(injector_key("AC_SEARCH"), None);
    }

    #[test]
    fn test_ac_home_lands_on_escape() {
        assert_eq!(injector_key("AC_HOME"), Some("escape"));
    }
}
