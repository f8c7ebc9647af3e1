//! config.rs — Listener port table and sensor profile
//!
//! Defaults mirror a two-feed bench setup: own-ship sensors on T1, AIS on
//! T2. An `ecdis.toml` given as the first CLI argument overrides them.

use serde::Deserialize;
use thiserror::Error;

use crate::profile::SensorProfile;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("port {0} outside the usable range (1025..65534)")]
    PortOutOfRange(u16),
    #[error("could not read {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Unparsable {
        path: String,
        source: toml::de::Error,
    },
}

/// One listener slot: alias plus TCP port, 0 = disabled.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PortTable {
    #[serde(rename = "T1", default)]
    pub t1: u16,
    #[serde(rename = "T2", default)]
    pub t2: u16,
    #[serde(rename = "T3", default)]
    pub t3: u16,
    #[serde(rename = "T4", default)]
    pub t4: u16,
    #[serde(rename = "T5", default)]
    pub t5: u16,
}

impl Default for PortTable {
    fn default() -> Self {
        Self {
            t1: 10110,
            t2: 10120,
            t3: 0,
            t4: 0,
            t5: 0,
        }
    }
}

impl PortTable {
    /// `(alias, port)` pairs for the enabled slots.
    pub fn enabled(&self) -> Vec<(&'static str, u16)> {
        [
            ("T1", self.t1),
            ("T2", self.t2),
            ("T3", self.t3),
            ("T4", self.t4),
            ("T5", self.t5),
        ]
        .into_iter()
        .filter(|(_, p)| *p != 0)
        .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (_, port) in self.enabled() {
            if port <= 1024 || port >= 65535 {
                return Err(ConfigError::PortOutOfRange(port));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EcdisConfig {
    #[serde(default)]
    pub ports: PortTable,
    #[serde(default)]
    pub profile: SensorProfile,
}

impl EcdisConfig {
    /// Load from a TOML file, or fall back to defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_string(),
            source,
        })?;
        let cfg: EcdisConfig =
            toml::from_str(&raw).map_err(|source| ConfigError::Unparsable {
                path: path.to_string(),
                source,
            })?;
        cfg.ports.validate()?;
        Ok(cfg)
    }
}
