//! Render surfaces — where the controller draws cells.
//!
//! The controller writes a whole frame with [`Surface::set_cell`] and then
//! calls [`Surface::flush`]; after a flush every surface starts the next
//! frame blank. [`TerminalSurface`] drives a real terminal through ratatui,
//! [`TextSurface`] writes frames as plain text for headless runs and tests.

use std::io::{self, Write};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::DefaultTerminal;

/// A grid of coloured character cells.
pub trait Surface {
    /// Acquire the output (raw mode, alternate screen, ...).
    fn init(&mut self) -> io::Result<()>;

    /// Release the output. Safe to call when not initialised.
    fn close(&mut self);

    /// Stage one cell of the current frame. Out-of-bounds cells are ignored.
    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color);

    /// Show the staged frame and start a blank one.
    fn flush(&mut self) -> io::Result<()>;

    /// Width and height in cells.
    fn size(&self) -> (u16, u16);
}

/// Terminal surface backed by ratatui's crossterm terminal.
pub struct TerminalSurface {
    terminal: Option<DefaultTerminal>,
    frame: Buffer,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            terminal: None,
            frame: Buffer::empty(Rect::ZERO),
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn init(&mut self) -> io::Result<()> {
        if self.terminal.is_some() {
            return Ok(());
        }
        let terminal = ratatui::try_init()?;
        let size = terminal.size().map_err(|e| io::Error::other(e.to_string()))?;
        self.frame = Buffer::empty(Rect::new(0, 0, size.width, size.height));
        self.terminal = Some(terminal);
        Ok(())
    }

    fn close(&mut self) {
        if self.terminal.take().is_some() {
            ratatui::restore();
        }
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color) {
        if let Some(cell) = self.frame.cell_mut((x, y)) {
            cell.set_char(ch).set_fg(fg).set_bg(bg);
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Err(io::Error::other("terminal surface is not initialised"));
        };

        let staged = &self.frame;
        let mut area = Rect::ZERO;
        terminal
            .draw(|frame| {
                area = frame.area();
                let out = frame.buffer_mut();
                for y in area.top()..area.bottom() {
                    for x in area.left()..area.right() {
                        if let (Some(src), Some(dst)) =
                            (staged.cell((x, y)), out.cell_mut((x, y)))
                        {
                            *dst = src.clone();
                        }
                    }
                }
            })
            .map_err(|e| io::Error::other(e.to_string()))?;

        // Next frame is blank and tracks terminal resizes.
        self.frame = Buffer::empty(area);
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.frame.area.width, self.frame.area.height)
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.close();
    }
}

/// A styled character as recorded by [`TextSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for TextCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }
}

/// Plain-text surface: each flush writes the frame's rows to `out`.
///
/// Trailing blanks and trailing empty rows are trimmed; frames are separated
/// by an empty line. The last flushed frame is kept for inspection.
pub struct TextSurface<W: Write> {
    out: W,
    width: u16,
    height: u16,
    cells: Vec<TextCell>,
    last: Vec<TextCell>,
    frames: usize,
    open: bool,
    closes: usize,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            out,
            width,
            height,
            cells: vec![TextCell::default(); len],
            last: vec![TextCell::default(); len],
            frames: 0,
            open: false,
            closes: 0,
        }
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Rows of the last flushed frame, trailing blanks trimmed.
    pub fn frame_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .last
            .chunks(usize::from(self.width.max(1)))
            .map(|row| {
                let text: String = row.iter().map(|c| c.ch).collect();
                text.trim_end().to_string()
            })
            .collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }

    /// Cell of the last flushed frame.
    pub fn cell(&self, x: u16, y: u16) -> Option<TextCell> {
        self.index(x, y).map(|i| self.last[i])
    }

    /// Number of frames flushed so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// How many times an open surface was closed.
    pub fn closes(&self) -> usize {
        self.closes
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Surface for TextSurface<W> {
    fn init(&mut self) -> io::Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.closes += 1;
            let _ = self.out.flush();
        }
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = TextCell { ch, fg, bg };
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let blank = vec![TextCell::default(); self.cells.len()];
        self.last = std::mem::replace(&mut self.cells, blank);
        self.frames += 1;

        for line in self.frame_lines() {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_writes_trimmed_rows() {
        let mut surface = TextSurface::new(Vec::new(), 10, 4);
        surface.init().unwrap();
        surface.set_cell(1, 0, 'a', Color::Reset, Color::Reset);
        surface.set_cell(2, 1, 'b', Color::Reset, Color::Yellow);
        surface.flush().unwrap();

        assert_eq!(surface.frame_lines(), vec![" a", "  b"]);
        assert_eq!(String::from_utf8_lossy(surface.get_ref()), " a\n  b\n\n");
        assert_eq!(surface.cell(2, 1).map(|c| c.bg), Some(Color::Yellow));
    }

    #[test]
    fn next_frame_starts_blank() {
        let mut surface = TextSurface::new(Vec::new(), 4, 2);
        surface.set_cell(0, 0, 'x', Color::Reset, Color::Reset);
        surface.flush().unwrap();
        surface.flush().unwrap();
        assert!(surface.frame_lines().is_empty());
        assert_eq!(surface.frames(), 2);
    }

    #[test]
    fn out_of_bounds_cells_are_ignored() {
        let mut surface = TextSurface::new(Vec::new(), 2, 1);
        surface.set_cell(5, 0, 'x', Color::Reset, Color::Reset);
        surface.set_cell(0, 3, 'y', Color::Reset, Color::Reset);
        surface.flush().unwrap();
        assert!(surface.frame_lines().is_empty());
        assert_eq!(surface.cell(5, 0), None);
    }

    #[test]
    fn close_counts_only_open_surfaces() {
        let mut surface = TextSurface::new(Vec::new(), 1, 1);
        surface.close();
        assert_eq!(surface.closes(), 0);
        surface.init().unwrap();
        surface.close();
        surface.close();
        assert_eq!(surface.closes(), 1);
        assert!(!surface.is_open());
    }

    #[test]
    fn terminal_flush_before_init_fails() {
        let mut surface = TerminalSurface::new();
        assert!(surface.flush().is_err());
        surface.close();
    }
}
