//! Theme YAML config — load a custom theme from ~/.trkr/theme.yaml.

use ratatui::style::Color;
use serde::Deserialize;

use super::Theme;

/// Intermediate YAML representation; all fields optional.
#[derive(Debug, Deserialize)]
struct ThemeConfig {
    name: Option<String>,
    /// Builtin to start from; defaults to "Default".
    base: Option<String>,

    note: Option<String>,
    velocity: Option<String>,
    delimiter: Option<String>,
    placeholder: Option<String>,
    header: Option<String>,

    highlight: Option<String>,
    cursor: Option<String>,

    status_fg: Option<String>,
    status_bg: Option<String>,
    message: Option<String>,
    fault: Option<String>,
}

/// Parse a color string: "#RRGGBB" hex or named color.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "white" => Some(Color::White),
        "reset" | "default" => Some(Color::Reset),
        _ => None,
    }
}

/// Load a custom theme from ~/.trkr/theme.yaml.
///
/// Returns `None` if the file doesn't exist or can't be parsed.
pub fn load_theme_from_yaml() -> Option<Theme> {
    let path = dirs::home_dir()?.join(".trkr").join("theme.yaml");
    let content = std::fs::read_to_string(&path).ok()?;
    let theme = parse_theme_yaml(&content);
    if theme.is_none() {
        tracing::warn!(path = %path.display(), "ignoring unparsable theme file");
    }
    theme
}

/// Parse a YAML string into a Theme, filling missing fields from the base.
pub fn parse_theme_yaml(yaml: &str) -> Option<Theme> {
    let config: ThemeConfig = serde_yaml::from_str(yaml).ok()?;
    let d = config
        .base
        .as_deref()
        .and_then(super::builtin::by_name)
        .unwrap_or_else(super::builtin::default);

    let color_or = |opt: Option<String>, fallback: Color| -> Color {
        opt.and_then(|s| parse_color(&s)).unwrap_or(fallback)
    };

    Some(Theme {
        name: config.name.unwrap_or_else(|| "Custom".to_string()),

        note: color_or(config.note, d.note),
        velocity: color_or(config.velocity, d.velocity),
        delimiter: color_or(config.delimiter, d.delimiter),
        placeholder: color_or(config.placeholder, d.placeholder),
        header: color_or(config.header, d.header),

        highlight: color_or(config.highlight, d.highlight),
        cursor: color_or(config.cursor, d.cursor),

        status_fg: color_or(config.status_fg, d.status_fg),
        status_bg: color_or(config.status_bg, d.status_bg),
        message: color_or(config.message, d.message),
        fault: color_or(config.fault, d.fault),
    })
}
