//! Client configuration.
//!
//! A match is described by a *preset* file shipped with the server
//! (`<root>/MatchPresets/<name>.json`). The preset, combined with the local player's identity,
//! becomes a [`ClientConfig`] that is passed explicitly to the session and the cache loader.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Match preset as written by the server tooling. Keys follow the server's camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPreset {
    pub map_name: String,

    #[serde(deserialize_with = "lenient_number")]
    pub port_number: u16,

    /// Milliseconds the server waits for each turn's answer.
    #[serde(deserialize_with = "lenient_number")]
    pub max_response_time: u64,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Presets have been seen with numbers written as strings.
fn lenient_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
    };
    T::try_from(value).map_err(|_| serde::de::Error::custom(format!("{value} is out of range")))
}

impl MatchPreset {
    /// Loads a preset, as YAML for `.yaml`/`.yml` files and as JSON otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read match preset from {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let preset = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse match preset {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse match preset {}", path.display()))?
        };
        Ok(preset)
    }
}

/// Everything the session needs to play one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub max_response_time_ms: u64,
    pub map_name: String,
    pub player_uuid: String,
}

impl ClientConfig {
    pub fn from_preset(preset: MatchPreset, player_uuid: impl Into<String>) -> Self {
        Self {
            host: preset.host,
            port: preset.port_number,
            max_response_time_ms: preset.max_response_time,
            map_name: preset.map_name,
            player_uuid: player_uuid.into(),
        }
    }

    pub fn max_response_time(&self) -> Duration {
        Duration::from_millis(self.max_response_time_ms)
    }

    pub fn address(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    /// `<root>/Maps/<map>.nac`
    pub fn navigation_cache_path(&self, root: &Path) -> PathBuf {
        root.join("Maps").join(format!("{}.nac", self.map_name))
    }
}

/// `<root>/MatchPresets/<name>.json`
pub fn preset_path(root: &Path, name: &str) -> PathBuf {
    root.join("MatchPresets").join(format!("{name}.json"))
}

/// Player index used when none is given: `Red` plays first, `Blue` second.
pub fn default_player_index(player_uuid: &str) -> Option<u32> {
    match player_uuid {
        "Red" => Some(0),
        "Blue" => Some(1),
        _ => None,
    }
}
