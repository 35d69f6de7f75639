//! Light and dark palettes.
//! Both are static; toggling only switches which one the UI reads.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Icon for the toggle: offers the sun in dark mode, the moon in light mode
    pub fn icon(self) -> &'static str {
        match self {
            ThemeMode::Dark => "☀",
            ThemeMode::Light => "☾",
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            ThemeMode::Light => &LIGHT,
            ThemeMode::Dark => &DARK,
        }
    }
}

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: Color,        // Focused borders, highlights
    pub success: Color,
    pub warning: Color,
    pub danger: Color,        // Errors, disabled resend
    pub text: Color,
    pub text_dim: Color,      // Hints, leaving toasts
    pub bg: Color,
    pub surface: Color,       // Card background
    pub inactive: Color,      // Unfocused borders
    pub filled: Color,        // Code cells holding a digit
}

pub static LIGHT: Palette = Palette {
    accent: Color::Rgb(103, 80, 164),
    success: Color::Rgb(2, 156, 118),
    warning: Color::Rgb(230, 142, 13),
    danger: Color::Rgb(186, 26, 26),
    text: Color::Rgb(28, 27, 31),
    text_dim: Color::Rgb(121, 116, 126),
    bg: Color::Rgb(255, 251, 254),
    surface: Color::Rgb(243, 237, 247),
    inactive: Color::Rgb(202, 196, 208),
    filled: Color::Rgb(79, 55, 139),
};

pub static DARK: Palette = Palette {
    accent: Color::Rgb(208, 188, 255),
    success: Color::Rgb(166, 218, 149),
    warning: Color::Rgb(250, 179, 135),
    danger: Color::Rgb(255, 180, 171),
    text: Color::Rgb(230, 225, 229),
    text_dim: Color::Rgb(147, 143, 153),
    bg: Color::Rgb(28, 27, 31),
    surface: Color::Rgb(43, 41, 48),
    inactive: Color::Rgb(73, 69, 79),
    filled: Color::Rgb(234, 221, 255),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_icon() {
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Dark.icon(), "☀");
        assert_eq!(ThemeMode::Light.icon(), "☾");
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(ThemeMode::Light.palette().bg, ThemeMode::Dark.palette().bg);
    }
}
