//! Controller mode — what the keyboard currently drives.

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Transport and navigation between patterns.
    #[default]
    Browsing,
    /// Cursor over the pattern grid.
    Editing,
    /// Typing a value for the cell under the cursor.
    Capture,
}

impl Mode {
    /// Switch between Browsing and Editing. Capture is left unchanged.
    pub fn toggle_edit(self) -> Self {
        match self {
            Self::Browsing => Self::Editing,
            Self::Editing => Self::Browsing,
            Self::Capture => Self::Capture,
        }
    }

    /// Whether the edit cursor is shown.
    pub fn shows_cursor(self) -> bool {
        matches!(self, Self::Editing | Self::Capture)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Browsing => "BROWSE",
            Self::Editing => "EDIT",
            Self::Capture => "INPUT",
        }
    }
}
