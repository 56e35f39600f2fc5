//! Configuration management for spxsift.
//!
//! Handles:
//! - Analyzer cache sizing
//! - Reconstruction and correlation tuning knobs

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Reconstruction tuning knobs.
    #[serde(default)]
    pub reconstruction: ReconstructionConfig,
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SiftError::io(format!("failed to read config file {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| SiftError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| SiftError::InvalidConfig {
            message: format!("failed to serialize config: {e}"),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SiftError::io(format!("failed to create {}", parent.display()), e)
            })?;
        }
        std::fs::write(path, content).map_err(|e| {
            SiftError::io(format!("failed to write config file {}", path.display()), e)
        })
    }
}

/// Analyzer cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of fully-analyzed logs kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

/// Tuning knobs for thread correlation and session reconstruction.
///
/// The defaults reproduce the established heuristics; they are exposed
/// for unusual logs (very sparse traces, very long sessions) rather
/// than everyday use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    /// Window (ms) around a session's literal time range searched for
    /// SDK keyword activity when expanding the related thread set.
    #[serde(default = "default_expansion_window_ms")]
    pub expansion_window_ms: u64,
    /// Buffer (ms) applied to the literal time range when admitting
    /// related-thread lines into the excerpt.
    #[serde(default = "default_buffer_window_ms")]
    pub buffer_window_ms: u64,
    /// Hard cap (ms) on the degraded search buffer.
    #[serde(default = "default_degraded_cap_ms")]
    pub degraded_cap_ms: u64,
    /// Minimum keyword hits for a thread to join the expanded set.
    #[serde(default = "default_keyword_threshold")]
    pub keyword_threshold: usize,
    /// Minimum candidate lines below which primary reconstruction
    /// degrades to the broad search.
    #[serde(default = "default_degrade_threshold")]
    pub degrade_threshold: usize,
    /// Line radius around the kickoff line for the main-thread
    /// proximity heuristic.
    #[serde(default = "default_proximity_lines")]
    pub proximity_lines: usize,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            expansion_window_ms: default_expansion_window_ms(),
            buffer_window_ms: default_buffer_window_ms(),
            degraded_cap_ms: default_degraded_cap_ms(),
            keyword_threshold: default_keyword_threshold(),
            degrade_threshold: default_degrade_threshold(),
            proximity_lines: default_proximity_lines(),
        }
    }
}

// Default value functions for serde
fn default_cache_capacity() -> usize {
    5
}

fn default_expansion_window_ms() -> u64 {
    30_000
}

fn default_buffer_window_ms() -> u64 {
    10_000
}

fn default_degraded_cap_ms() -> u64 {
    60_000
}

fn default_keyword_threshold() -> usize {
    3
}

fn default_degrade_threshold() -> usize {
    50
}

fn default_proximity_lines() -> usize {
    100
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| SiftError::InvalidConfig {
        message: "could not determine the user config directory".to_string(),
    })?;

    Ok(config_dir.join("spxsift").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.capacity, 5);
        assert_eq!(config.reconstruction.expansion_window_ms, 30_000);
        assert_eq!(config.reconstruction.buffer_window_ms, 10_000);
        assert_eq!(config.reconstruction.degraded_cap_ms, 60_000);
        assert_eq!(config.reconstruction.keyword_threshold, 3);
        assert_eq!(config.reconstruction.degrade_threshold, 50);
        assert_eq!(config.reconstruction.proximity_lines, 100);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            "[reconstruction]\ndegrade_threshold = 10\n",
        )
        .unwrap();
        assert_eq!(config.reconstruction.degrade_threshold, 10);
        assert_eq!(config.reconstruction.expansion_window_ms, 30_000);
        assert_eq!(config.cache.capacity, 5);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.cache.capacity = 9;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cache.capacity, 9);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, SiftError::InvalidConfig { .. }));
    }
}
