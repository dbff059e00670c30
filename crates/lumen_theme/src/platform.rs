//! Ambient platform color-scheme preference
//!
//! Sampled once at provider startup when no scheme has been persisted.

use crate::scheme::ColorScheme;

/// Environment variable that overrides platform detection
pub const SCHEME_ENV: &str = "LUMEN_COLOR_SCHEME";

/// Source of the platform's preferred color scheme
pub trait AmbientPreference: Send + Sync {
    /// `None` when the platform expresses no preference
    fn preferred_scheme(&self) -> Option<ColorScheme>;
}

/// Fixed answer, for tests and hosts that already know the preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedAmbient(pub Option<ColorScheme>);

impl AmbientPreference for FixedAmbient {
    fn preferred_scheme(&self) -> Option<ColorScheme> {
        self.0
    }
}

/// Detects the desktop's light/dark setting
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAmbient;

impl AmbientPreference for SystemAmbient {
    fn preferred_scheme(&self) -> Option<ColorScheme> {
        if let Ok(value) = std::env::var(SCHEME_ENV) {
            match value.parse() {
                Ok(scheme) => return Some(scheme),
                Err(err) => tracing::warn!("ignoring {}: {}", SCHEME_ENV, err),
            }
        }
        detect_platform_scheme()
    }
}

#[cfg(target_os = "macos")]
fn detect_platform_scheme() -> Option<ColorScheme> {
    // AppleInterfaceStyle is only set while dark mode is on.
    let output = std::process::Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    let style = String::from_utf8_lossy(&output.stdout);
    Some(ColorScheme::from_dark(
        output.status.success() && style.trim().eq_ignore_ascii_case("dark"),
    ))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn detect_platform_scheme() -> Option<ColorScheme> {
    std::env::var("GTK_THEME")
        .ok()
        .and_then(|theme| scheme_from_gtk_theme(&theme))
        .or_else(|| {
            std::env::var("COLORFGBG")
                .ok()
                .and_then(|value| scheme_from_colorfgbg(&value))
        })
}

#[cfg(not(unix))]
fn detect_platform_scheme() -> Option<ColorScheme> {
    None
}

/// Interpret a `GTK_THEME` value such as `Adwaita:dark` or `Yaru-dark`
pub fn scheme_from_gtk_theme(theme: &str) -> Option<ColorScheme> {
    let theme = theme.trim().to_ascii_lowercase();
    if theme.is_empty() {
        return None;
    }
    Some(ColorScheme::from_dark(
        theme.ends_with(":dark") || theme.ends_with("-dark"),
    ))
}

/// Interpret a `COLORFGBG` value (`fg;bg` or `fg;default;bg`)
///
/// Terminal background colors 0-6 and 8 are dark.
pub fn scheme_from_colorfgbg(value: &str) -> Option<ColorScheme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(ColorScheme::from_dark(matches!(bg, 0..=6 | 8)))
}
