use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Runtime knobs recognized by the core. Loaded from a TOML file or built
/// with `Config::default()`; every field has a serde default so partial
/// files work.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// How long cached search/detail/vendor records stay fresh
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Per-navigation deadline handed to the renderer
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Extra attempts after the first, for transient failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Concurrent renderer sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_max_sessions() -> usize {
    2
}

fn default_headless() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_retries: default_max_retries(),
            max_sessions: default_max_sessions(),
            headless: default_headless(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
