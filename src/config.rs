//! Configuration for the window manager core.
//!
//! The core does not query displays itself; the environment supplies the
//! bounds used for maximize/fullscreen geometry here, alongside the default
//! size limits new windows start with. TOML file format, falling back to
//! defaults when no file is present.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Bounds of the display area windows maximize and fullscreen into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for DisplayBounds {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        }
    }
}

/// Default size limits applied to newly created windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowDefaults {
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
            max_width: 4096,
            max_height: 4096,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WmConfig {
    pub display: DisplayBounds,
    pub window_defaults: WindowDefaults,
}

impl WmConfig {
    /// Load configuration from a file, or fall back to defaults.
    ///
    /// An explicitly given path must parse; a discovered or missing file
    /// degrades to [`WmConfig::default`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).or_else(Self::find_config_file);

        match config_path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {path:?}"))?;
                let config: Self = toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {path:?}"))?;
                Ok(config)
            }
            Some(path) => {
                warn!("Config file not found at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            dirs::config_dir().map(|p| p.join("cloudflow/wm.toml")),
            dirs::home_dir().map(|p| p.join(".config/cloudflow/wm.toml")),
            Some(PathBuf::from("/etc/cloudflow/wm.toml")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_permissive() {
        let config = WmConfig::default();
        assert_eq!(config.display.width, 1920);
        assert_eq!(config.display.height, 1080);
        assert_eq!(config.window_defaults.min_width, 100);
        assert_eq!(config.window_defaults.max_height, 4096);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: WmConfig = toml::from_str(
            r#"
            [display]
            width = 2560
            height = 1440
            "#,
        )
        .unwrap();
        assert_eq!(config.display.width, 2560);
        assert_eq!(config.display.x, 0);
        assert_eq!(config.window_defaults, WindowDefaults::default());
    }

    #[test]
    fn empty_toml_is_default() {
        let config: WmConfig = toml::from_str("").unwrap();
        assert_eq!(config, WmConfig::default());
    }
}
