// src/config.rs
//! Runtime configuration. Defaults are compiled in; an optional
//! `config/settings.toml` overrides them, and environment variables win
//! over both (`.env` is honored via `dotenvy` in the binary).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::analysis::DEFAULT_YIELD_TARGET;
use crate::harvest::catalog::DEFAULT_BASE_URL;

const ENV_SETTINGS_PATH: &str = "RADAR_SETTINGS_PATH";
const DEFAULT_SETTINGS_PATH: &str = "config/settings.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub catalog_base_url: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_yield_target")]
    pub yield_target: f64,
    /// Default harvest size when the caller does not ask for one.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    /// Optional market-table override; the embedded snapshot is used
    /// otherwise.
    #[serde(default)]
    pub market_data_path: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_database_path() -> String {
    "reality_radar.db".to_string()
}

fn default_yield_target() -> f64 {
    DEFAULT_YIELD_TARGET
}

fn default_result_limit() -> usize {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        // An empty TOML document yields all serde defaults.
        toml::from_str("").expect("defaults deserialize")
    }
}

impl AppConfig {
    /// Resolution order: $RADAR_SETTINGS_PATH → config/settings.toml →
    /// compiled defaults; individual env vars override the file either way.
    pub fn load() -> Self {
        let path = std::env::var(ENV_SETTINGS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH));

        let mut cfg = Self::load_file(&path).unwrap_or_default();
        cfg.apply_env();
        cfg
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "bad settings file, using defaults");
                None
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("RADAR_BASE_URL") {
            self.catalog_base_url = v;
        }
        if let Ok(v) = std::env::var("RADAR_DB_PATH") {
            self.database_path = v;
        }
        if let Ok(v) = std::env::var("RADAR_YIELD_TARGET") {
            match v.parse() {
                Ok(t) => self.yield_target = t,
                Err(_) => warn!(value = %v, "RADAR_YIELD_TARGET is not a number, ignored"),
            }
        }
        if let Ok(v) = std::env::var("RADAR_RESULT_LIMIT") {
            match v.parse() {
                Ok(n) => self.result_limit = n,
                Err(_) => warn!(value = %v, "RADAR_RESULT_LIMIT is not a number, ignored"),
            }
        }
        if let Ok(v) = std::env::var("RADAR_MARKET_DATA_PATH") {
            self.market_data_path = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.catalog_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.yield_target, DEFAULT_YIELD_TARGET);
        assert_eq!(cfg.result_limit, 60);
        assert!(cfg.market_data_path.is_none());
    }

    #[test]
    fn partial_settings_file_keeps_other_defaults() {
        let cfg: AppConfig = toml::from_str("yield_target = 5.5").unwrap();
        assert_eq!(cfg.yield_target, 5.5);
        assert_eq!(cfg.database_path, "reality_radar.db");
    }
}
