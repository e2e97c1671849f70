//! Pattern view — projects a pattern and the controller state onto a surface.
//!
//! Layout, top to bottom: a header row naming each track's instrument (one
//! row above the origin), one row per line of the pattern, a blank row, the
//! status row, and the message row. Each track is one column; short tracks
//! are padded with placeholder cells so every column has the same height.

use ratatui::style::Color;

use super::selection::Cursor;
use super::surface::Surface;
use super::theme::Theme;
use crate::config::ViewConfig;
use crate::pattern::{Event, Pattern};

/// Everything one frame shows.
pub struct Scene<'a> {
    pub pattern: Option<&'a Pattern>,
    /// Line drawn with the highlight background.
    pub playing_line: Option<usize>,
    /// Cell drawn with the cursor background.
    pub cursor: Option<Cursor>,
    pub status: String,
    pub message: String,
    /// Draw the message in the fault colour.
    pub message_is_fault: bool,
    pub theme: &'a Theme,
    pub config: &'a ViewConfig,
}

/// Cell and column geometry derived from the view config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub origin_x: u16,
    pub origin_y: u16,
    /// Characters in one rendered event.
    pub cell_width: u16,
    /// Cell plus track delimiter.
    pub column_width: u16,
}

impl GridLayout {
    pub fn new(config: &ViewConfig) -> Self {
        let cell = config.field_width * 2 + config.event_delimiter.chars().count();
        let column = cell + config.track_delimiter.chars().count();
        Self {
            origin_x: config.origin_x,
            origin_y: config.origin_y,
            cell_width: clamp_u16(cell),
            column_width: clamp_u16(column),
        }
    }

    /// Left edge of track column `col`.
    pub fn column_x(&self, col: usize) -> u16 {
        self.origin_x
            .saturating_add(clamp_u16(col).saturating_mul(self.column_width))
    }

    /// Screen row of pattern line `row`.
    pub fn row_y(&self, row: usize) -> u16 {
        self.origin_y.saturating_add(clamp_u16(row))
    }

    /// Row of the status bar for a pattern with `rows` lines.
    pub fn status_y(&self, rows: usize) -> u16 {
        self.row_y(rows).saturating_add(1)
    }
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Text of one cell: `"  60 ·  100"`, or placeholders for an empty event.
pub fn format_cell(event: &Event, config: &ViewConfig) -> String {
    let w = config.field_width;
    let delim = &config.event_delimiter;
    if event.is_empty() {
        let ph = &config.placeholder;
        format!("{ph:>w$}{delim}{ph:>w$}")
    } else {
        format!("{:>w$}{delim}{:>w$}", event.note, event.velocity)
    }
}

/// Header label for track `index`: its instrument name, or `T<n>`.
pub fn track_label(pattern: &Pattern, index: usize) -> String {
    pattern
        .tracks
        .get(index)
        .and_then(|t| t.instrument())
        .map(|g| g.name().to_string())
        .unwrap_or_else(|| format!("T{}", index + 1))
}

/// Draw `scene` and flush.
pub fn render<S: Surface>(surface: &mut S, scene: &Scene<'_>) -> std::io::Result<()> {
    let layout = GridLayout::new(scene.config);
    let theme = scene.theme;
    let rows = scene.pattern.map_or(0, Pattern::max_track_len);

    if let Some(pattern) = scene.pattern {
        draw_header(surface, pattern, &layout, theme);
        draw_grid(surface, pattern, scene, &layout);
    }

    let status_y = layout.status_y(rows);
    let (width, _) = surface.size();
    fill_row(surface, status_y, width, theme.status_bg);
    draw_text(surface, 0, status_y, &scene.status, theme.status_fg, theme.status_bg);
    draw_text(
        surface,
        0,
        status_y.saturating_add(1),
        &scene.message,
        if scene.message_is_fault {
            theme.fault
        } else {
            theme.message
        },
        Color::Reset,
    );

    surface.flush()
}

fn draw_header<S: Surface>(surface: &mut S, pattern: &Pattern, layout: &GridLayout, theme: &Theme) {
    let Some(y) = layout.origin_y.checked_sub(1) else {
        return;
    };
    for col in 0..pattern.track_count() {
        let label: String = track_label(pattern, col)
            .chars()
            .take(usize::from(layout.cell_width))
            .collect();
        draw_text(surface, layout.column_x(col), y, &label, theme.header, Color::Reset);
    }
}

fn draw_grid<S: Surface>(
    surface: &mut S,
    pattern: &Pattern,
    scene: &Scene<'_>,
    layout: &GridLayout,
) {
    let theme = scene.theme;
    let config = scene.config;
    let note_end = config.field_width;
    let velocity_start = note_end + config.event_delimiter.chars().count();

    for (row, line) in pattern.lines().iter().enumerate() {
        let y = layout.row_y(row);
        let line_bg = if scene.playing_line == Some(row) {
            theme.highlight
        } else {
            Color::Reset
        };

        for (col, event) in line.iter().enumerate() {
            let x = layout.column_x(col);
            let is_cursor = scene.cursor == Some(Cursor { row, col });
            let bg = if is_cursor { theme.cursor } else { line_bg };

            for (i, ch) in format_cell(event, config).chars().enumerate() {
                let fg = if event.is_empty() {
                    theme.placeholder
                } else if i < note_end {
                    theme.note
                } else if i < velocity_start {
                    theme.delimiter
                } else {
                    theme.velocity
                };
                surface.set_cell(x.saturating_add(clamp_u16(i)), y, ch, fg, bg);
            }

            let delim_x = x.saturating_add(layout.cell_width);
            draw_text(surface, delim_x, y, &config.track_delimiter, theme.delimiter, line_bg);
        }
    }
}

fn draw_text<S: Surface>(surface: &mut S, x: u16, y: u16, text: &str, fg: Color, bg: Color) {
    for (i, ch) in text.chars().enumerate() {
        surface.set_cell(x.saturating_add(clamp_u16(i)), y, ch, fg, bg);
    }
}

fn fill_row<S: Surface>(surface: &mut S, y: u16, width: u16, bg: Color) {
    for x in 0..width {
        surface.set_cell(x, y, ' ', Color::Reset, bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Track;
    use crate::tui::surface::TextSurface;
    use crate::tui::theme::builtin;

    fn pattern() -> Pattern {
        Pattern::new(vec![
            Track::new(vec![Event::bare(60, 100), Event::bare(62, 90)]),
            Track::new(vec![Event::bare(36, 127)]),
        ])
    }

    #[test]
    fn cell_text_is_right_aligned() {
        let config = ViewConfig::default();
        assert_eq!(format_cell(&Event::bare(60, 100), &config), "  60 \u{00B7} 100");
        assert_eq!(format_cell(&Event::empty(), &config), "  -- \u{00B7}  --");
    }

    #[test]
    fn label_comes_from_declared_generator() {
        let g: std::sync::Arc<dyn crate::generator::Generator> =
            std::sync::Arc::new(crate::generator::TraceGenerator::new("pad"));
        let p = Pattern::new(vec![
            Track::with_generator(vec![Event::empty(), Event::empty()], g),
            Track::new(vec![Event::empty()]),
        ]);
        assert_eq!(track_label(&p, 0), "pad");
        assert_eq!(track_label(&p, 1), "T2");
    }

    #[test]
    fn layout_geometry() {
        let layout = GridLayout::new(&ViewConfig::default());
        assert_eq!(layout.cell_width, 10);
        assert_eq!(layout.column_width, 13);
        assert_eq!(layout.column_x(2), 4 + 26);
        assert_eq!(layout.row_y(3), 5);
        assert_eq!(layout.status_y(2), 5);
    }

    #[test]
    fn short_tracks_are_padded() {
        let config = ViewConfig::default();
        let theme = builtin::default();
        let p = pattern();
        let mut surface = TextSurface::new(Vec::new(), 60, 10);
        let scene = Scene {
            pattern: Some(&p),
            playing_line: None,
            cursor: None,
            status: "status".into(),
            message: "msg".into(),
            message_is_fault: false,
            theme: &theme,
            config: &config,
        };
        render(&mut surface, &scene).unwrap();

        let lines = surface.frame_lines();
        assert_eq!(lines[1], "    T1           T2");
        assert_eq!(lines[2], "      60 \u{00B7} 100 |   36 \u{00B7} 127 |");
        assert_eq!(lines[3], "      62 \u{00B7}  90 |   -- \u{00B7}  -- |");
        assert_eq!(lines[5], "status");
        assert_eq!(lines[6], "msg");
    }

    #[test]
    fn playing_line_and_cursor_backgrounds() {
        let config = ViewConfig::default();
        let theme = builtin::default();
        let p = pattern();
        let mut surface = TextSurface::new(Vec::new(), 60, 10);
        let scene = Scene {
            pattern: Some(&p),
            playing_line: Some(1),
            cursor: Some(Cursor { row: 0, col: 1 }),
            status: String::new(),
            message: String::new(),
            message_is_fault: false,
            theme: &theme,
            config: &config,
        };
        render(&mut surface, &scene).unwrap();

        let col1 = GridLayout::new(&config).column_x(1);
        assert_eq!(surface.cell(4, 3).map(|c| c.bg), Some(theme.highlight));
        assert_eq!(surface.cell(4, 2).map(|c| c.bg), Some(Color::Reset));
        assert_eq!(surface.cell(col1, 2).map(|c| c.bg), Some(theme.cursor));
    }

    #[test]
    fn no_pattern_still_draws_status() {
        let config = ViewConfig::default();
        let theme = builtin::default();
        let mut surface = TextSurface::new(Vec::new(), 20, 6);
        let scene = Scene {
            pattern: None,
            playing_line: None,
            cursor: None,
            status: "empty".into(),
            message: String::new(),
            message_is_fault: false,
            theme: &theme,
            config: &config,
        };
        render(&mut surface, &scene).unwrap();
        assert_eq!(surface.frame_lines()[3], "empty");
    }
}
