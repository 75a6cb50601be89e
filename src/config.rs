use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pokeapi::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: u32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoscrollConfig {
    pub interval_ms: u64,
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self { interval_ms: 250 }
    }
}

impl AutoscrollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(16))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub autoscroll: AutoscrollConfig,
}

pub fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("pokescroll").join("config.toml"))
}

impl Config {
    /// Load from the explicit path, or the default location. Falls back to
    /// defaults when the file is missing or unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) => p,
                None => return Config::default(),
            },
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Config::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.list.page_size = config.list.page_size.max(1);
        Ok(config)
    }

    pub fn apply_overrides(&mut self, base_url: Option<String>, page_size: Option<u32>) {
        if let Some(url) = base_url {
            self.api.base_url = url;
        }
        if let Some(size) = page_size {
            self.list.page_size = size.max(1);
        }
    }
}
