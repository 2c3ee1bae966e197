//! Hub configuration.
//!
//! Loaded from a TOML file; a missing file means built-in defaults. The relay
//! token can always be supplied through the `HIDSWITCH_TOKEN` environment
//! variable, which takes precedence over the file so the secret does not have
//! to live on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::application::route_reports::HotkeyConfig;

/// Environment variable overriding `relay.token`.
pub const TOKEN_ENV_VAR: &str = "HIDSWITCH_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Shared secret downstreams must present in their handshake.
    #[serde(default)]
    pub token: String,
    /// Factor applied to pointer deltas broadcast to mouse downstreams.
    #[serde(default = "default_mouse_speed")]
    pub mouse_speed: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            mouse_speed: default_mouse_speed(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Device node delivering the raw composite-HID report stream.
    #[serde(default = "default_device_path")]
    pub device_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_path: default_device_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BluetoothConfig {
    /// HID control channel socket of the paired host, when known up front.
    #[serde(default)]
    pub control_socket: Option<PathBuf>,
    /// HID interrupt channel socket of the paired host, when known up front.
    #[serde(default)]
    pub interrupt_socket: Option<PathBuf>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            control_socket: None,
            interrupt_socket: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
}

impl HubConfig {
    /// Loads, applies the environment token override, and validates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            info!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            config.relay.token = token;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.token.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "relay token is empty; set relay.token or the {TOKEN_ENV_VAR} environment variable"
            )));
        }
        if !(self.relay.mouse_speed.is_finite() && self.relay.mouse_speed > 0.0) {
            return Err(ConfigError::Invalid(
                "relay.mouse_speed must be a positive number".to_string(),
            ));
        }
        self.validate_hotkeys()
    }

    /// Hotkey chords must not shadow each other: no chord may be a subset of
    /// another, and the power key must not be part of any chord.
    fn validate_hotkeys(&self) -> Result<(), ConfigError> {
        let hotkeys = &self.hotkeys;
        let chords: [(&str, &[String]); 3] = [
            ("hotkeys.macro_combo", &hotkeys.macro_combo),
            ("hotkeys.toggle_keyboard_combo", &hotkeys.toggle_keyboard_combo),
            ("hotkeys.toggle_mouse_combo", &hotkeys.toggle_mouse_combo),
        ];

        for (name, chord) in &chords {
            if chord.iter().any(|key| key == &hotkeys.power_key) {
                return Err(ConfigError::Invalid(format!(
                    "{name} contains the power key {:?}",
                    hotkeys.power_key
                )));
            }
            for (other_name, other) in &chords {
                if name == other_name || other.is_empty() {
                    continue;
                }
                if other.iter().all(|key| chord.contains(key)) {
                    return Err(ConfigError::Invalid(format!(
                        "{other_name} is shadowed by {name}; chords must be disjoint"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    9898
}

fn default_mouse_speed() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_device_path() -> PathBuf {
    PathBuf::from("/dev/hidraw0")
}

fn default_poll_interval_ms() -> u64 {
    500
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::route_reports::MacroStep;

    fn parse(text: &str) -> HubConfig {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse("");

        assert_eq!(config.network.listen_port, 9898);
        assert_eq!(config.relay.mouse_speed, 1.0);
        assert_eq!(config.input.device_path, PathBuf::from("/dev/hidraw0"));
        assert_eq!(config.bluetooth.poll_interval_ms, 500);
        assert_eq!(config.hotkeys.power_key, "POWER");
    }

    #[test]
    fn test_missing_file_defaults_match_parsed_defaults() {
        // The no-file path goes through Default, not serde; both must agree.
        let config = HubConfig::default();

        assert_eq!(config.bluetooth.poll_interval_ms, 500);
        assert_eq!(config.network.listen_port, 9898);
    }

    #[test]
    fn test_macro_script_parses_clicks_and_delays() {
        let config = parse(
            r#"
            [relay]
            token = "secret"

            [hotkeys]
            macro_combo = ["AC_HOME"]

            [[hotkeys.macro_script]]
            click = "Q"

            [[hotkeys.macro_script]]
            delay_ms = 500

            [[hotkeys.macro_script]]
            click = "ENTER"
            "#,
        );

        assert_eq!(
            config.hotkeys.macro_script,
            vec![
                MacroStep::Click { click: "Q".to_string() },
                MacroStep::Delay { delay_ms: 500 },
                MacroStep::Click { click: "ENTER".to_string() },
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_hotkeys_table_merges_with_defaults() {
        // Operators usually configure only the macro; the rest must fill in.
        let config = parse(
            r#"
            [relay]
            token = "secret"

            [hotkeys]
            macro_combo = ["AC_SEARCH"]
            "#,
        );

        assert_eq!(config.hotkeys.macro_combo, vec!["AC_SEARCH".to_string()]);
        assert!(config.hotkeys.macro_script.is_empty());
        assert_eq!(config.hotkeys.power_key, "POWER");
        assert_eq!(
            config.hotkeys.toggle_mouse_combo,
            vec!["LEFT_CONTROL".to_string(), "LEFT_ALT".to_string(), "M".to_string()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_token_is_invalid() {
        let config = parse("");

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_mouse_speed_is_invalid() {
        let config = parse("[relay]\ntoken = \"secret\"\nmouse_speed = 0.0\n");

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_shadowed_chords_are_invalid() {
        let config = parse(
            r#"
            [relay]
            token = "secret"

            [hotkeys]
            macro_combo = ["LEFT_CONTROL", "LEFT_ALT", "K", "Q"]
            "#,
        );

        // The default keyboard toggle chord is a subset of this macro combo.
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_power_key_inside_a_chord_is_invalid() {
        let config = parse(
            r#"
            [relay]
            token = "secret"

            [hotkeys]
            macro_combo = ["POWER", "Q"]
            "#,
        );

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
