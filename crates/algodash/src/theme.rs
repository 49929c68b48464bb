//! Theme preference.
//!
//! Persisted as the `theme` key of a JSON preferences file. Other keys in the
//! file are preserved on write.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{AppError, AppResult};

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Anything other than `"dark"` reads as light.
    fn from_pref(value: Option<&serde_json::Value>) -> Self {
        match value.and_then(|v| v.as_str()) {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme held in memory, read once at startup.
#[derive(Debug, Clone)]
pub struct ThemePreference {
    path: PathBuf,
    theme: Theme,
}

impl ThemePreference {
    /// Read the preference; a missing or unreadable file means light.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let theme = match read_prefs(&path) {
            Some(prefs) => Theme::from_pref(prefs.get(THEME_KEY)),
            None => {
                debug!(path = %path.display(), "No readable preferences, using light theme");
                Theme::default()
            }
        };
        Self { path, theme }
    }

    pub fn current(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and persist it.
    pub fn toggle(&mut self) -> AppResult<Theme> {
        let next = self.theme.toggled();
        self.write(next)?;
        self.theme = next;
        info!(theme = %next, "Theme changed");
        Ok(next)
    }

    fn write(&self, theme: Theme) -> AppResult<()> {
        let mut prefs = read_prefs(&self.path).unwrap_or_default();
        prefs.insert(THEME_KEY.to_string(), serde_json::Value::from(theme.as_str()));
        let text = serde_json::to_string_pretty(&prefs)
            .map_err(|e| AppError::Prefs(format!("Failed to encode preferences: {e}")))?;
        std::fs::write(&self.path, text)
            .map_err(|e| AppError::Prefs(format!("Failed to write preferences: {e}")))
    }
}

fn read_prefs(path: &Path) -> Option<serde_json::Map<String, serde_json::Value>> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults_to_light() {
        let dir = tempfile::tempdir().unwrap();
        let pref = ThemePreference::load(dir.path().join("prefs.json"));
        assert_eq!(pref.current(), Theme::Light);
    }

    #[test]
    fn test_toggle_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut pref = ThemePreference::load(&path);
        assert_eq!(pref.toggle().unwrap(), Theme::Dark);

        let reloaded = ThemePreference::load(&path);
        assert_eq!(reloaded.current(), Theme::Dark);
    }

    #[test]
    fn test_other_keys_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"theme":"dark","density":"compact"}"#).unwrap();

        let mut pref = ThemePreference::load(&path);
        assert_eq!(pref.current(), Theme::Dark);
        pref.toggle().unwrap();

        let prefs = read_prefs(&path).unwrap();
        assert_eq!(prefs["theme"], "light");
        assert_eq!(prefs["density"], "compact");
    }

    #[test]
    fn test_garbage_reads_as_light() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(ThemePreference::load(&path).current(), Theme::Light);

        std::fs::write(&path, r#"{"theme":"solarized"}"#).unwrap();
        assert_eq!(ThemePreference::load(&path).current(), Theme::Light);
    }
}
