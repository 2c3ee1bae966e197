//! Agent configuration.
//!
//! Same conventions as the hub side: TOML file, defaults for everything
//! except the token, and a `HIDSWITCH_TOKEN` environment override so the
//! secret can stay off disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use hidswitch_core::wire::Role;

/// Environment variable overriding `hub.token`.
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
pub struct HubEndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret presented in the handshake.
    #[serde(default)]
    pub token: String,
}

impl Default for HubEndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Roles this agent connects as; one link per role.
    #[serde(default = "default_roles")]
    pub roles: Vec<Role>,
    /// Factor applied to incoming pointer deltas before injection.
    #[serde(default = "default_mouse_speed")]
    pub mouse_speed: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            roles: default_roles(),
            mouse_speed: default_mouse_speed(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub hub: HubEndpointConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl AgentConfig {
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
            config.hub.token = token;
        }

        config.validate()?;
        Ok(config)
    }

    /// `host:port` of the hub listener.
    pub fn hub_addr(&self) -> String {
        format!("{}:{}", self.hub.host, self.hub.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.token.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "hub token is empty; set hub.token or the {TOKEN_ENV_VAR} environment variable"
            )));
        }
        if self.replay.roles.is_empty() {
            return Err(ConfigError::Invalid(
                "replay.roles must name at least one role".to_string(),
            ));
        }
        let mut seen = Vec::new();
        for role in &self.replay.roles {
            if seen.contains(role) {
                return Err(ConfigError::Invalid(format!(
                    "replay.roles lists {role} more than once"
                )));
            }
            seen.push(*role);
        }
        if !(self.replay.mouse_speed.is_finite() && self.replay.mouse_speed > 0.0) {
            return Err(ConfigError::Invalid(
                "replay.mouse_speed must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9898
}

fn default_roles() -> Vec<Role> {
    vec![Role::Keyboard, Role::Mouse]
}

fn default_mouse_speed() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
