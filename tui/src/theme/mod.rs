//! Themes and Colors
//!
//! A theme is a flat mapping from semantic color role to a terminal color.
//! View handlers consume it as a read-only value threaded in at render
//! time - there is no ambient "current theme"; the registry is built once
//! at startup and passed by reference to whatever needs lookup.
//!
//! Two themes ship built in: `charm-dark` (the default) and
//! `catppuccin-mocha`. Users add more by dropping JSON palette files into
//! the theme directory or pointing `--theme`/`LIMELIGHT_THEME` at a file.

mod loader;

pub use loader::{load_theme_file, parse_color, ThemeError};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ratatui::style::Color;

/// Semantic color roles for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Headline / focus color.
    pub primary: Color,
    /// Secondary accents.
    pub secondary: Color,
    /// Base background.
    pub background: Color,
    /// Elevated surface (panels, input fields).
    pub surface: Color,
    /// Overlays and modals.
    pub overlay: Color,
    /// Body text.
    pub text: Color,
    /// De-emphasized text.
    pub text_muted: Color,
    /// Borders and hints.
    pub text_dim: Color,
    /// Positive outcomes.
    pub success: Color,
    /// Caution.
    pub warning: Color,
    /// Failures.
    pub error: Color,
    /// Neutral callouts.
    pub info: Color,
    /// First accent.
    pub accent1: Color,
    /// Second accent.
    pub accent2: Color,
    /// Third accent.
    pub accent3: Color,
}

/// A named palette.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    /// Stable identifier (`charm-dark`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// The colors.
    pub colors: Palette,
}

impl Theme {
    /// The signature dark theme: pink headlines, purple accents, deep
    /// blue-black background.
    pub fn charm_dark() -> Self {
        Self {
            id: "charm-dark".into(),
            name: "Charm Dark".into(),
            description: "Pink, purple, and teal on deep blue-black".into(),
            colors: Palette {
                primary: Color::Indexed(212),
                secondary: Color::Rgb(0x7d, 0x56, 0xf4),
                background: Color::Rgb(0x1a, 0x1a, 0x2e),
                surface: Color::Rgb(0x25, 0x25, 0x38),
                overlay: Color::Rgb(0x2f, 0x2f, 0x45),
                text: Color::Rgb(0xfa, 0xfa, 0xfa),
                text_muted: Color::Rgb(0xa9, 0xb1, 0xd6),
                text_dim: Color::Rgb(0x56, 0x5f, 0x89),
                success: Color::Rgb(0x04, 0xb5, 0x75),
                warning: Color::Rgb(0xff, 0xb8, 0x6c),
                error: Color::Rgb(0xff, 0x6b, 0x6b),
                info: Color::Rgb(0x7d, 0xcf, 0xff),
                accent1: Color::Indexed(212),
                accent2: Color::Rgb(0x7d, 0x56, 0xf4),
                accent3: Color::Indexed(35),
            },
        }
    }

    /// Catppuccin Mocha, for the soothing-pastel crowd.
    pub fn catppuccin_mocha() -> Self {
        Self {
            id: "catppuccin-mocha".into(),
            name: "Catppuccin Mocha".into(),
            description: "Soothing pastels on a warm dark base".into(),
            colors: Palette {
                primary: Color::Rgb(0xcb, 0xa6, 0xf7),
                secondary: Color::Rgb(0xf5, 0xc2, 0xe7),
                background: Color::Rgb(0x1e, 0x1e, 0x2e),
                surface: Color::Rgb(0x31, 0x32, 0x44),
                overlay: Color::Rgb(0x45, 0x47, 0x5a),
                text: Color::Rgb(0xcd, 0xd6, 0xf4),
                text_muted: Color::Rgb(0xba, 0xc2, 0xde),
                text_dim: Color::Rgb(0x6c, 0x70, 0x86),
                success: Color::Rgb(0xa6, 0xe3, 0xa1),
                warning: Color::Rgb(0xf9, 0xe2, 0xaf),
                error: Color::Rgb(0xf3, 0x8b, 0xa8),
                info: Color::Rgb(0x89, 0xdc, 0xeb),
                accent1: Color::Rgb(0xf5, 0xc2, 0xe7),
                accent2: Color::Rgb(0xcb, 0xa6, 0xf7),
                accent3: Color::Rgb(0x94, 0xe2, 0xd5),
            },
        }
    }
}

/// Immutable theme lookup table, built once at startup.
#[derive(Clone, Debug)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Theme>,
    default_id: String,
}

impl ThemeRegistry {
    /// Registry containing only the built-in themes.
    pub fn builtin() -> Self {
        let mut themes = BTreeMap::new();
        for theme in [Theme::charm_dark(), Theme::catppuccin_mocha()] {
            themes.insert(theme.id.clone(), theme);
        }
        Self {
            themes,
            default_id: "charm-dark".into(),
        }
    }

    /// Built-ins plus every readable JSON palette in `dir`. Unparseable
    /// files are skipped with a warning, never fatal.
    pub fn with_user_dir(dir: &Path) -> Self {
        let mut registry = Self::builtin();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return registry,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match load_theme_file(&path) {
                Ok(theme) => {
                    registry.themes.insert(theme.id.clone(), theme);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping theme file");
                }
            }
        }
        registry
    }

    /// The default user theme directory (`$XDG_CONFIG_HOME/limelight/themes`).
    pub fn user_theme_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("limelight").join("themes"))
    }

    /// Look up a theme by id.
    pub fn get(&self, id: &str) -> Option<&Theme> {
        self.themes.get(id)
    }

    /// The default theme.
    pub fn default_theme(&self) -> &Theme {
        &self.themes[&self.default_id]
    }

    /// Registered theme ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Resolve a selector to a theme: a registered id, a path to a palette
    /// file, or (when absent) the default.
    pub fn resolve(&self, selector: Option<&str>) -> Result<Theme, ThemeError> {
        let Some(selector) = selector.filter(|s| !s.is_empty()) else {
            return Ok(self.default_theme().clone());
        };
        if let Some(theme) = self.get(selector) {
            return Ok(theme.clone());
        }
        let path = Path::new(selector);
        if path.extension().and_then(|e| e.to_str()) == Some("json") || path.exists() {
            return load_theme_file(path);
        }
        Err(ThemeError::UnknownTheme(selector.to_string()))
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_registry_has_both_themes() {
        let registry = ThemeRegistry::builtin();
        assert!(registry.get("charm-dark").is_some());
        assert!(registry.get("catppuccin-mocha").is_some());
        assert_eq!(registry.default_theme().id, "charm-dark");
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(registry.resolve(None).unwrap().id, "charm-dark");
        assert_eq!(registry.resolve(Some("")).unwrap().id, "charm-dark");
    }

    #[test]
    fn resolve_by_id() {
        let registry = ThemeRegistry::builtin();
        let theme = registry.resolve(Some("catppuccin-mocha")).unwrap();
        assert_eq!(theme.name, "Catppuccin Mocha");
    }

    #[test]
    fn unknown_selector_is_an_error() {
        let registry = ThemeRegistry::builtin();
        assert!(matches!(
            registry.resolve(Some("solarized-sparkle")),
            Err(ThemeError::UnknownTheme(_))
        ));
    }
}
