use std::path::{Path, PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "venue-booking";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file, `~/` is expanded
    #[serde(default = "default_database")]
    database: String,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    static_dir: String,
}

fn default_database() -> String {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join("booking.db"))
        .unwrap_or_else(|| PathBuf::from("booking.db"))
        .to_string_lossy()
        .to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            server: ServerConfig::default(),
        }
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join(APP_DIR).join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when
    /// it does not exist.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) => {
                log::debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                log::debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn write_default(path: &Path) -> Result<bool> {
        if path.exists() {
            log::info!("Config file already exists at {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;
        log::info!("Wrote default config to {}", path.display());
        Ok(true)
    }

    /// Create the default config file, if it doesn't exist
    pub fn create_default() -> Result<bool> {
        let path = Self::config_path().ok_or_else(|| eyre!("No config directory found"))?;
        Self::write_default(&path)
    }

    /// Get expanded database path
    pub fn database_path(&self) -> PathBuf {
        expand_path(&self.database)
    }

    /// Get expanded static assets directory
    pub fn static_dir(&self) -> PathBuf {
        expand_path(&self.server.static_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database = \"/tmp/booking-test.db\"\n[server]\nport = 8080\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/booking-test.db"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.static_dir(), PathBuf::from("static"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(&dir.path().join("missing.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err:?}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_write_default_is_not_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Config::write_default(&path).unwrap());
        let written = Config::from_file(&path).unwrap();
        assert_eq!(written, Config::default());

        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();
        assert!(!Config::write_default(&path).unwrap());
        assert_eq!(Config::from_file(&path).unwrap().server.port, 9000);
    }

    #[test]
    fn test_home_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/booking.db"), home.join("booking.db"));
        }
        assert_eq!(expand_path("/var/booking.db"), PathBuf::from("/var/booking.db"));
    }
}
