use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::layout::DEFAULT_HIT_RADIUS;

const APP_DIR: &str = "icon-layout";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application settings
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory whose top-level files are laid out
    pub desktop_dir: PathBuf,
    /// Attribute holding the `"x,y"` position
    pub attribute: String,
    /// Program used to read and write attributes
    pub gio_program: String,
    /// Hit-test and dot radius in screen pixels
    pub hit_radius: u32,
    pub window_width: u32,
    pub window_height: u32,
    /// Desktop-icon manager executable
    pub manager_program: String,
    /// Arguments that make the manager quit
    pub manager_quit_args: Vec<String>,
    /// Restart the manager after every committed drag
    pub refresh_on_commit: bool,
    /// Default filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            desktop_dir: home.join("Desktop"),
            attribute: "metadata::caja-icon-position".to_string(),
            gio_program: "gio".to_string(),
            hit_radius: DEFAULT_HIT_RADIUS,
            window_width: 1000,
            window_height: 600,
            manager_program: "caja".to_string(),
            manager_quit_args: vec!["-q".to_string()],
            refresh_on_commit: true,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// `<config dir>/icon-layout/config.toml`, when a config dir exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Parses a config file and validates it
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: AppConfig = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Loads the user config
    ///
    /// A missing file (or no config directory at all) yields the defaults. An
    /// unreadable or malformed file is an error the caller reports before
    /// falling back to the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Clamps values that would break the layout math
    pub fn validate(&mut self) {
        self.hit_radius = self.hit_radius.max(1);
        self.window_width = self.window_width.max(1);
        self.window_height = self.window_height.max(1);
    }
}
