//! JSON theme files
//!
//! Lets users define palettes without touching code. Colors accept hex
//! (`#7D56F4`), ANSI 256 indexes (`212`), or a handful of names.

use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

use super::{Palette, Theme};

/// Errors from theme loading and selection.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// The selector matched neither a registered id nor a readable file.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// The palette file could not be read.
    #[error("failed to read theme file: {0}")]
    Io(#[from] std::io::Error),

    /// The palette file is not valid theme JSON.
    #[error("failed to parse theme JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ThemeFile {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    colors: ColorsFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorsFile {
    primary: String,
    secondary: String,
    background: String,
    surface: String,
    overlay: String,
    text: String,
    text_muted: String,
    text_dim: String,
    success: String,
    warning: String,
    error: String,
    info: String,
    accent1: String,
    accent2: String,
    accent3: String,
}

/// Load one palette file.
pub fn load_theme_file(path: &Path) -> Result<Theme, ThemeError> {
    let data = std::fs::read_to_string(path)?;
    let file: ThemeFile = serde_json::from_str(&data)?;
    let c = &file.colors;
    Ok(Theme {
        id: file.id,
        name: file.name,
        description: file.description,
        colors: Palette {
            primary: parse_color(&c.primary),
            secondary: parse_color(&c.secondary),
            background: parse_color(&c.background),
            surface: parse_color(&c.surface),
            overlay: parse_color(&c.overlay),
            text: parse_color(&c.text),
            text_muted: parse_color(&c.text_muted),
            text_dim: parse_color(&c.text_dim),
            success: parse_color(&c.success),
            warning: parse_color(&c.warning),
            error: parse_color(&c.error),
            info: parse_color(&c.info),
            accent1: parse_color(&c.accent1),
            accent2: parse_color(&c.accent2),
            accent3: parse_color(&c.accent3),
        },
    })
}

/// Parse a color string: `#RRGGBB` hex, an ANSI 256 index, or a basic
/// color name. Unparseable strings reset to the terminal default.
pub fn parse_color(s: &str) -> Color {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        return Color::Reset;
    }
    if let Ok(index) = s.parse::<u8>() {
        return Color::Indexed(index);
    }
    match s.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" => Color::Gray,
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r##"{
        "id": "midnight",
        "name": "Midnight",
        "description": "A test palette",
        "colors": {
            "primary": "#7D56F4",
            "secondary": "212",
            "background": "#101020",
            "surface": "#181830",
            "overlay": "#202040",
            "text": "white",
            "textMuted": "gray",
            "textDim": "240",
            "success": "green",
            "warning": "yellow",
            "error": "red",
            "info": "cyan",
            "accent1": "#ff87d7",
            "accent2": "99",
            "accent3": "35"
        }
    }"##;

    #[test]
    fn parse_color_accepts_hex_index_and_names() {
        assert_eq!(parse_color("#7D56F4"), Color::Rgb(0x7d, 0x56, 0xf4));
        assert_eq!(parse_color("212"), Color::Indexed(212));
        assert_eq!(parse_color("magenta"), Color::Magenta);
        assert_eq!(parse_color("#nothex"), Color::Reset);
        assert_eq!(parse_color("chartreuse-ish"), Color::Reset);
    }

    #[test]
    fn load_theme_file_round_trips_a_palette() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let theme = load_theme_file(file.path()).unwrap();
        assert_eq!(theme.id, "midnight");
        assert_eq!(theme.colors.primary, Color::Rgb(0x7d, 0x56, 0xf4));
        assert_eq!(theme.colors.secondary, Color::Indexed(212));
        assert_eq!(theme.colors.text, Color::White);
    }

    #[test]
    fn malformed_theme_file_is_an_error_not_a_panic() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(load_theme_file(file.path()).is_err());
    }
}
