//! Lumen configuration file handling
//!
//! Settings live in `lumen.toml`:
//!
//! ```toml
//! [theme]
//! store_path = "~/.config/lumen/preferences.json"
//! overlay_on_ms = 50
//! flip_ms = 150
//! overlay_off_ms = 600
//! settle_ms = 300
//!
//! [play]
//! show_explanations = true
//! ```

use anyhow::{Context, Result};
use lumen_theme::TransitionTimings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "lumen.toml";

/// Top-level configuration (lumen.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LumenConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub play: PlayConfig,
}

/// Theme persistence and transition timings
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ThemeConfig {
    /// Preference file; defaults to the platform config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    #[serde(flatten)]
    pub timings: TransitionTimings,
}

/// Quiz runner settings
#[derive(Debug, Deserialize, Serialize)]
pub struct PlayConfig {
    /// Print a question's explanation after it is answered
    #[serde(default = "default_true")]
    pub show_explanations: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            show_explanations: true,
        }
    }
}

impl LumenConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `lumen.toml` in `dir` is
    /// used when present, otherwise defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file {} does not exist", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let candidate = dir.join(CONFIG_FILE);
                if !candidate.exists() {
                    return Ok((Self::default(), None));
                }
                candidate
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: LumenConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok((config, Some(path)))
    }

    /// Preference file used for the persisted theme
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.theme.store_path {
            Some(path) => Ok(expand_home(path)),
            None => default_store_path(),
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// `<config dir>/lumen/preferences.json`
pub fn default_store_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine the platform config directory")?;
    Ok(base.join("lumen").join("preferences.json"))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let (config, path) = LumenConfig::load(None, dir.path()).unwrap();

        assert!(path.is_none());
        assert!(config.play.show_explanations);
        assert_eq!(config.theme.timings, TransitionTimings::default());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(LumenConfig::load(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn test_partial_config() {
        let dir = TempDir::new().unwrap();
        let text = "[theme]\nstore_path = \"prefs.json\"\nflip_ms = 20\n\n\
                    [play]\nshow_explanations = false\n";
        fs::write(dir.path().join(CONFIG_FILE), text).unwrap();

        let (config, path) = LumenConfig::load(None, dir.path()).unwrap();
        assert_eq!(path, Some(dir.path().join(CONFIG_FILE)));
        assert_eq!(config.theme.timings.flip_ms, 20);
        assert_eq!(config.theme.timings.overlay_off_ms, 600);
        assert!(!config.play.show_explanations);
        assert_eq!(config.store_path().unwrap(), PathBuf::from("prefs.json"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = LumenConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: LumenConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.theme.timings, config.theme.timings);
    }
}
