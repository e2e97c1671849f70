//! Selection — visible pattern, playing line, and the edit cursor.

use super::keybindings::Direction;
use crate::pattern::Pattern;

/// Cursor cell: `row` is the line offset, `col` the track index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

/// What the view shows and where the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Index of the visible pattern.
    pub pattern: usize,
    /// Line being played, if any.
    pub line: Option<usize>,
    pub cursor: Cursor,
}

impl Selection {
    /// Move the cursor one step, clamped to the pattern.
    ///
    /// Rows span `0..max_track_len`, columns `0..track_count`. A move that
    /// would leave the grid does nothing. Returns whether the cursor moved.
    pub fn move_cursor(&mut self, direction: Direction, pattern: &Pattern) -> bool {
        let rows = pattern.max_track_len();
        let cols = pattern.track_count();
        let Cursor { row, col } = self.cursor;

        let next = match direction {
            Direction::Up if row > 0 => Cursor { row: row - 1, col },
            Direction::Down if row + 1 < rows => Cursor { row: row + 1, col },
            Direction::Left if col > 0 => Cursor { row, col: col - 1 },
            Direction::Right if col + 1 < cols => Cursor { row, col: col + 1 },
            _ => return false,
        };
        self.cursor = next;
        true
    }

    /// Pull the cursor back inside `pattern` (after switching patterns).
    pub fn clamp_cursor(&mut self, pattern: &Pattern) {
        self.cursor.row = self.cursor.row.min(pattern.max_track_len().saturating_sub(1));
        self.cursor.col = self.cursor.col.min(pattern.track_count().saturating_sub(1));
    }

    /// Show pattern `index` if it exists in a table of `len` patterns.
    pub fn select_pattern(&mut self, index: usize, len: usize) -> bool {
        if index >= len || index == self.pattern {
            return false;
        }
        self.pattern = index;
        true
    }

    /// Follow playback to `(pattern, line)`.
    pub fn follow(&mut self, pattern: usize, line: usize) {
        self.pattern = pattern;
        self.line = Some(line);
    }

    /// Drop the playing-line highlight.
    pub fn reset_line(&mut self) -> bool {
        self.line.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Event, Track};

    /// Three tracks, longest has five events.
    fn grid() -> Pattern {
        Pattern::new(vec![
            Track::new(vec![Event::bare(1, 1); 5]),
            Track::new(vec![Event::bare(2, 2); 3]),
            Track::new(vec![Event::bare(3, 3)]),
        ])
    }

    #[test]
    fn cursor_stays_inside_grid() {
        let pattern = grid();
        let mut sel = Selection::default();

        assert!(!sel.move_cursor(Direction::Up, &pattern));
        assert!(!sel.move_cursor(Direction::Left, &pattern));
        assert_eq!(sel.cursor, Cursor { row: 0, col: 0 });

        for _ in 0..10 {
            sel.move_cursor(Direction::Down, &pattern);
            sel.move_cursor(Direction::Right, &pattern);
        }
        assert_eq!(sel.cursor, Cursor { row: 4, col: 2 });
        assert!(!sel.move_cursor(Direction::Down, &pattern));
        assert!(!sel.move_cursor(Direction::Right, &pattern));
    }

    #[test]
    fn empty_pattern_never_moves() {
        let pattern = Pattern::default();
        let mut sel = Selection::default();
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert!(!sel.move_cursor(dir, &pattern));
        }
    }

    #[test]
    fn clamp_after_pattern_switch() {
        let mut sel = Selection {
            cursor: Cursor { row: 4, col: 2 },
            ..Selection::default()
        };
        let small = Pattern::new(vec![Track::new(vec![Event::bare(1, 1); 2])]);
        sel.clamp_cursor(&small);
        assert_eq!(sel.cursor, Cursor { row: 1, col: 0 });
    }

    #[test]
    fn select_pattern_bounds() {
        let mut sel = Selection::default();
        assert!(sel.select_pattern(1, 2));
        assert!(!sel.select_pattern(2, 2));
        assert!(!sel.select_pattern(1, 2));
        assert_eq!(sel.pattern, 1);
    }

    #[test]
    fn follow_and_reset() {
        let mut sel = Selection::default();
        sel.follow(1, 3);
        assert_eq!((sel.pattern, sel.line), (1, Some(3)));
        assert!(sel.reset_line());
        assert!(!sel.reset_line());
        assert_eq!(sel.line, None);
    }
}
