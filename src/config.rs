use crate::error::{MatcherError, Result};
use gazette_matcher_common::{MatchMode, Threshold};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api_base`.
pub const API_BASE_ENV: &str = "GAZETTE_MATCHER_API_BASE";

const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

/// What to do with the local list when `POST /clear-records` fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearFailurePolicy {
    /// Re-fetch `GET /records` so the list matches the server again.
    #[default]
    Refetch,
    /// Keep showing the current list with the error banner.
    KeepStale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    /// Upper bound on a whole submission round trip.
    pub timeout_seconds: u64,
    /// How long the bar stays at 100% after a submission ends.
    pub progress_grace_ms: u64,
    pub default_mode: MatchMode,
    pub default_threshold: Threshold,
    pub clear_failure: ClearFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            timeout_seconds: 600,
            progress_grace_ms: 1000,
            default_mode: MatchMode::default(),
            default_threshold: Threshold::default(),
            clear_failure: ClearFailurePolicy::default(),
        }
    }
}

impl Config {
    /// Load from the user config file, then apply the environment override.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base = base;
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MatcherError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("gazette-matcher").join("config.json"))
    }

    pub fn set_api_base(&mut self, base: String) -> Result<()> {
        let trimmed = base.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(MatcherError::Config(format!(
                "api base must start with http:// or https://: {}",
                base
            )));
        }
        self.api_base = trimmed.trim_end_matches('/').to_string();
        self.save()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn progress_grace(&self) -> Duration {
        Duration::from_millis(self.progress_grace_ms)
    }
}
