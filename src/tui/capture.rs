//! Input capture — the text typed for a cell, and its parser.

use std::fmt;

pub use crate::pattern::MAX_VALUE;

/// Why typed cell input was rejected. The cell keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Not exactly two whitespace-separated fields.
    FieldCount(usize),
    /// A field is not a non-negative integer.
    NotANumber(String),
    /// A field is above [`MAX_VALUE`].
    OutOfRange { field: &'static str, value: u32 },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount(n) => write!(f, "expected 'note velocity', got {n} field(s)"),
            Self::NotANumber(s) => write!(f, "'{s}' is not a number"),
            Self::OutOfRange { field, value } => {
                write!(f, "{field} {value} out of range 0-{MAX_VALUE}")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Parse `"note velocity"`.
///
/// Returns `Ok(None)` for blank input, which means "leave the cell alone".
pub fn parse_cell(input: &str) -> Result<Option<(u8, u8)>, InputError> {
    let fields: Vec<&str> = input.split_whitespace().collect();
    match fields.as_slice() {
        [] => Ok(None),
        [note, velocity] => Ok(Some((
            parse_field("note", note)?,
            parse_field("velocity", velocity)?,
        ))),
        other => Err(InputError::FieldCount(other.len())),
    }
}

fn parse_field(field: &'static str, text: &str) -> Result<u8, InputError> {
    let value: u32 = text
        .parse()
        .map_err(|_| InputError::NotANumber(text.to_string()))?;
    if value > u32::from(MAX_VALUE) {
        return Err(InputError::OutOfRange { field, value });
    }
    Ok(value as u8)
}

/// Text buffer for the cell being typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    buffer: String,
}

impl Capture {
    pub fn insert(&mut self, c: char) {
        self.buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Take the buffer, leaving it empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
