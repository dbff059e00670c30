//! Light/dark color scheme

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key under which the active scheme is persisted
pub const THEME_KEY: &str = "theme";

/// Color scheme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ColorScheme::Dark)
    }

    pub fn toggled(&self) -> Self {
        match self {
            ColorScheme::Light => ColorScheme::Dark,
            ColorScheme::Dark => ColorScheme::Light,
        }
    }

    /// Persisted string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized scheme string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color scheme '{0}', expected 'light' or 'dark'")]
pub struct ParseSchemeError(pub String);

impl FromStr for ColorScheme {
    type Err = ParseSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            _ => Err(ParseSchemeError(s.to_string())),
        }
    }
}
