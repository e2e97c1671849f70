//! Key bindings — maps key events to controller actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::mode::Mode;

/// Cursor movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Controller actions triggered by key events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Leave the controller loop.
    Quit,
    /// Start or stop playback.
    TogglePlayback,
    /// Switch between Browsing and Editing.
    ToggleEdit,
    /// Move the edit cursor.
    Move(Direction),
    /// Start typing a value for the cursor cell.
    BeginCapture,
    /// Append a character to the capture buffer.
    CaptureInsert(char),
    /// Delete the last character of the capture buffer.
    CaptureBackspace,
    /// Write the capture buffer into the cursor cell.
    CaptureCommit,
    /// Leave capture without changing the cell.
    CaptureCancel,
    /// Replace the cursor cell with the empty event.
    ClearCell,
    PrevPattern,
    NextPattern,
    TempoUp,
    TempoDown,
    /// Cycle to the next theme.
    CycleTheme,
}

/// Map a key event to an action for the current mode.
///
/// `edit_key` toggles Editing; it takes precedence over the other
/// single-character bindings outside capture.
pub fn map_key(key: KeyEvent, mode: Mode, edit_key: char) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C quits from anywhere (raw mode swallows SIGINT)
    if ctrl {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    if mode == Mode::Capture {
        return match key.code {
            KeyCode::Enter => Some(Action::CaptureCommit),
            KeyCode::Esc => Some(Action::CaptureCancel),
            KeyCode::Backspace => Some(Action::CaptureBackspace),
            KeyCode::Char(c) => Some(Action::CaptureInsert(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => return Some(Action::Quit),
        KeyCode::Char(' ') => return Some(Action::TogglePlayback),
        KeyCode::Char(c) if c == edit_key => return Some(Action::ToggleEdit),
        _ => {}
    }

    if mode == Mode::Editing {
        match key.code {
            KeyCode::Up => return Some(Action::Move(Direction::Up)),
            KeyCode::Down => return Some(Action::Move(Direction::Down)),
            KeyCode::Left => return Some(Action::Move(Direction::Left)),
            KeyCode::Right => return Some(Action::Move(Direction::Right)),
            KeyCode::Enter => return Some(Action::BeginCapture),
            KeyCode::Delete | KeyCode::Backspace => return Some(Action::ClearCell),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('[') | KeyCode::PageUp => Some(Action::PrevPattern),
        KeyCode::Char(']') | KeyCode::PageDown => Some(Action::NextPattern),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::TempoUp),
        KeyCode::Char('-') => Some(Action::TempoDown),
        KeyCode::Char('t') => Some(Action::CycleTheme),
        _ => None,
    }
}

/// One-line key reference for the message row.
pub fn hints(mode: Mode, edit_key: char) -> String {
    match mode {
        Mode::Browsing => format!(
            "space play/stop  {edit_key} edit  [ ] pattern  +/- tempo  t theme  esc quit"
        ),
        Mode::Editing => format!(
            "arrows move  enter input  del clear  {edit_key} browse  space play  esc quit"
        ),
        Mode::Capture => "type: note velocity  enter commit  esc cancel".to_string(),
    }
}
