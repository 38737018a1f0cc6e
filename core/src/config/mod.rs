use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const HOTLINE_DIR: &str = ".hotline";
pub const DEFAULT_STORAGE_KEY: &str = "assistants_v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage_dir: PathBuf,
    pub storage_key: String,
    /// Simulated latency of the "save prompt" action.
    pub save_delay_ms: u64,
    /// Simulated latency of the chat simulator's reply.
    pub reply_delay_ms: u64,
    /// Drop a pending prompt save when a newer one is scheduled.
    pub coalesce_saves: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_dir: get_hotline_dir().join("data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            save_delay_ms: 800,
            reply_delay_ms: 1500,
            coalesce_saves: true,
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!(
                    "Config file not found at {}. Run 'hotline init' to create one.",
                    path.display()
                )
            } else {
                anyhow::anyhow!("Failed to read config from {}: {}", path.display(), e)
            }
        })?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

pub fn get_hotline_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HOTLINE_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_hotline_dir().join("config.toml")
}

pub fn load_config() -> Result<Config> {
    Config::load_from(&get_config_path())
}

pub fn save_config(config: &Config) -> Result<()> {
    config.save_to(&get_config_path())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.storage_key, "assistants_v1");
        assert_eq!(config.save_delay(), Duration::from_millis(800));
        assert_eq!(config.reply_delay(), Duration::from_millis(1500));
        assert!(config.coalesce_saves);
        assert!(config.storage_dir.ends_with("data"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg").join("config.toml");
        let config = Config {
            storage_dir: tmp.path().join("data"),
            save_delay_ms: 10,
            coalesce_saves: false,
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "reply_delay_ms = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.reply_delay_ms, 5);
        assert_eq!(config.save_delay_ms, 800);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn missing_file_mentions_init() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load_from(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("hotline init"));
    }

    #[test]
    fn garbage_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "save_delay_ms = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
