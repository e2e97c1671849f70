//! Theme system — colours for the pattern grid and the status rows.

pub mod builtin;
pub mod config;

use ratatui::style::Color;

/// A complete colour theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,

    // Grid cells
    pub note: Color,
    pub velocity: Color,
    pub delimiter: Color,
    pub placeholder: Color,
    pub header: Color,

    // Backgrounds
    pub highlight: Color,
    pub cursor: Color,

    // Status and message rows
    pub status_fg: Color,
    pub status_bg: Color,
    pub message: Color,
    pub fault: Color,
}

/// Pick the starting theme.
///
/// A custom `~/.trkr/theme.yaml` wins; otherwise the builtin called `name`;
/// otherwise the default builtin.
pub fn load_theme(name: Option<&str>) -> Theme {
    if let Some(theme) = config::load_theme_from_yaml() {
        return theme;
    }
    name.and_then(builtin::by_name)
        .unwrap_or_else(builtin::default)
}

/// Cycle to the next theme in the list, wrapping around.
pub fn cycle_theme(current: &Theme, themes: &[Theme]) -> Theme {
    if themes.is_empty() {
        return current.clone();
    }
    let idx = themes
        .iter()
        .position(|t| t.name == current.name)
        .map(|i| (i + 1) % themes.len())
        .unwrap_or(0);
    themes[idx].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_highlight_is_yellow() {
        let theme = builtin::default();
        assert_eq!(theme.name, "Default");
        assert_eq!(theme.highlight, Color::Yellow);
    }

    #[test]
    fn load_theme_returns_a_theme() {
        let theme = load_theme(Some("Mono"));
        assert!(!theme.name.is_empty());
    }

    #[test]
    fn cycle_wraps_around() {
        let themes = builtin::all_builtins();
        assert!(themes.len() >= 2);
        let last = &themes[themes.len() - 1];
        assert_eq!(cycle_theme(last, &themes).name, themes[0].name);
        assert_eq!(cycle_theme(&themes[0], &themes).name, themes[1].name);
    }

    #[test]
    fn cycle_unknown_theme_starts_over() {
        let mut custom = builtin::default();
        custom.name = "Custom".to_string();
        let themes = builtin::all_builtins();
        assert_eq!(cycle_theme(&custom, &themes).name, themes[0].name);
    }

    #[test]
    fn cycle_empty_themes_returns_current() {
        let theme = builtin::default();
        assert_eq!(cycle_theme(&theme, &[]), theme);
    }
}
