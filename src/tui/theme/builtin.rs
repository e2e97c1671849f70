//! Built-in themes.

use ratatui::style::Color;

use super::Theme;

/// Default theme: white numbers, yellow playing line.
pub fn default() -> Theme {
    Theme {
        name: "Default".to_string(),

        note: Color::White,
        velocity: Color::Gray,
        delimiter: Color::DarkGray,
        placeholder: Color::DarkGray,
        header: Color::Cyan,

        highlight: Color::Yellow,
        cursor: Color::Blue,

        status_fg: Color::White,
        status_bg: Color::DarkGray,
        message: Color::Gray,
        fault: Color::Red,
    }
}

/// Mono: no colours beyond reverse-style backgrounds, for plain terminals.
pub fn mono() -> Theme {
    Theme {
        name: "Mono".to_string(),

        note: Color::Reset,
        velocity: Color::Reset,
        delimiter: Color::Reset,
        placeholder: Color::Reset,
        header: Color::Reset,

        highlight: Color::Gray,
        cursor: Color::White,

        status_fg: Color::Black,
        status_bg: Color::Gray,
        message: Color::Reset,
        fault: Color::Reset,
    }
}

/// All builtin themes in cycle order.
pub fn all_builtins() -> Vec<Theme> {
    vec![default(), mono()]
}

/// Look up a builtin by name (case-insensitive).
pub fn by_name(name: &str) -> Option<Theme> {
    all_builtins()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_unique() {
        let themes = all_builtins();
        let mut names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
        names.dedup();
        assert_eq!(names.len(), themes.len());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(by_name("mono").map(|t| t.name), Some("Mono".to_string()));
        assert!(by_name("solarized").is_none());
    }
}
