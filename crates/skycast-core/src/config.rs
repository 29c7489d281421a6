// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use skycast_lexicon::VocabularyStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GENERATOR_URL: &str = "http://localhost:11434";
pub const DEFAULT_GENERATOR_MODEL: &str = "llama3.2:latest";
pub const DEFAULT_WEATHER_URL: &str = "http://localhost:8008/weather";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Endpoints, timeouts and limits for one [`crate::engine::Engine`].
/// Every field has a default, so a partial `config.json` is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the Ollama-style text generation server.
    pub generator_url: String,
    pub generator_model: String,
    /// Full URL of the weather lookup (scraper) endpoint.
    pub weather_url: String,
    pub generator_timeout_secs: u64,
    /// Per-candidate ceiling; each lookup has its own.
    pub lookup_timeout_secs: u64,
    /// Whole-request ceiling. Expiry cancels everything still in flight.
    pub request_timeout_secs: u64,
    /// How many recommendation candidates get a weather lookup.
    pub fan_out_limit: usize,
    pub observation_cache_ttl_secs: u64,
    pub observation_cache_capacity: usize,
    pub vocabulary_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generator_url: DEFAULT_GENERATOR_URL.to_string(),
            generator_model: DEFAULT_GENERATOR_MODEL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            generator_timeout_secs: 30,
            lookup_timeout_secs: 60,
            request_timeout_secs: 120,
            fan_out_limit: 3,
            observation_cache_ttl_secs: 900, // 15 minutes
            observation_cache_capacity: 128,
            vocabulary_path: None,
        }
    }
}

impl EngineConfig {
    /// `config.json` under the platform config directory.
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("config.json")
    }

    /// Reads the config at `path`; a missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("[Config] No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("[Config] Loaded {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator_timeout_secs == 0
            || self.lookup_timeout_secs == 0
            || self.request_timeout_secs == 0
        {
            return Err(ConfigError::Invalid("timeouts must be at least 1 second".into()));
        }
        if self.fan_out_limit == 0 {
            return Err(ConfigError::Invalid("fan_out_limit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.vocabulary_path
            .clone()
            .unwrap_or_else(VocabularyStore::default_path)
    }

    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn observation_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.observation_cache_ttl_secs)
    }
}
