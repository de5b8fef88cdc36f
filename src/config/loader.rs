//! Configuration loading and saving plus `~/.bareclaw` path helpers.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::schema::Config;

/// The bareclaw data directory (`~/.bareclaw`).
pub fn get_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".bareclaw")
}

/// Default configuration file path (`~/.bareclaw/config.toml`).
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// The workspace root (`~/.bareclaw/workspace`) — the security boundary for
/// all file and memory operations.
pub fn get_workspace_dir() -> PathBuf {
    get_data_dir().join("workspace")
}

/// Cron task store path (`~/.bareclaw/cron.tsv`).
pub fn get_cron_path() -> PathBuf {
    get_data_dir().join("cron.tsv")
}

/// Create the workspace directory if missing and return its path.
pub fn ensure_workspace() -> std::io::Result<PathBuf> {
    let dir = get_workspace_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Load configuration from a file, or return a default [`Config`] if the
/// file does not exist or cannot be parsed.
///
/// If `config_path` is `None`, the default path (`~/.bareclaw/config.toml`)
/// is used.
pub fn load_config(config_path: Option<&Path>) -> Config {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path(),
    };

    if path.exists() {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        "Failed to parse config from {}: {}. Using default configuration.",
                        path.display(),
                        e
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read config from {}: {}. Using default configuration.",
                    path.display(),
                    e
                );
            }
        }
    }

    Config::default()
}

/// Save configuration to a TOML file, creating parent directories.
pub fn save_config(config: &Config, config_path: Option<&Path>) {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => get_config_path(),
    };

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match toml::to_string_pretty(config) {
        Ok(text) => {
            if let Err(e) = fs::write(&path, text) {
                warn!("Failed to write config to {}: {}", path.display(), e);
            }
        }
        Err(e) => {
            warn!("Failed to serialize config: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.toml");
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.default_provider, "echo");
    }

    #[test]
    fn test_load_and_save_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.default_provider = "ollama".to_string();
        cfg.default_model = "llama3".to_string();
        save_config(&cfg, Some(&path));

        let loaded = load_config(Some(&path));
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_load_garbage_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is { not toml").unwrap();
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.default_provider, "echo");
    }
}
