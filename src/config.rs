//! Server configuration.
//!
//! Loaded from `config.json` in the platform config directory, then
//! overridden by environment variables. CLI flags override both.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "mom-notes";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the HTTP API.
    pub port: u16,
    /// Database file. Defaults to the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: None,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from disk and the environment.
    /// Falls back to defaults if the file is missing or fails to parse.
    pub fn load() -> Self {
        let config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    fn try_load() -> Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `MOMNOTES_PORT`, `MOMNOTES_DB_PATH` and `MOMNOTES_CORS_ORIGINS`.
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = var("MOMNOTES_PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(path) = var("MOMNOTES_DB_PATH").filter(|p| !p.is_empty()) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(origins) = var("MOMNOTES_CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            self.cors_origins = (!origins.is_empty()).then_some(origins);
        }
        self
    }
}

fn config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_port_3000_and_permissive_cors() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.db_path.is_none());
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let config = ServerConfig::default().with_env_overrides(env(&[
            ("MOMNOTES_PORT", "8080"),
            ("MOMNOTES_DB_PATH", "/tmp/notes.db"),
            ("MOMNOTES_CORS_ORIGINS", "https://a.example, https://b.example"),
        ]));

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/notes.db")));
        assert_eq!(
            config.cors_origins,
            Some(vec!["https://a.example".to_string(), "https://b.example".to_string()])
        );
    }

    #[test]
    fn invalid_port_is_ignored() {
        let config = ServerConfig::default().with_env_overrides(env(&[("MOMNOTES_PORT", "nope")]));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn reads_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "port": 4000 }"#).unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 4000);
        assert!(config.cors_origins.is_none());
    }
}
