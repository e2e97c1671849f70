//! Error types for configuration, pattern loading, and terminal setup.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// A fatal error reported to the caller before (or while) the UI runs.
#[derive(Debug)]
pub enum TrackerError {
    /// Tempo must be a positive number of beats per minute.
    InvalidTempo(u32),
    /// A file could not be read or written.
    Io { path: PathBuf, source: io::Error },
    /// The pattern file was readable but not a valid pattern document.
    PatternFile { path: PathBuf, message: String },
    /// The config file was readable but not a valid config document.
    Config { path: PathBuf, message: String },
    /// A track refers to a generator that the pattern file does not define.
    UnknownGenerator(String),
    /// A generator could not be created (device missing, bad address, ...).
    Generator { name: String, message: String },
    /// The render surface failed to initialise or flush.
    Terminal(io::Error),
    /// A worker thread could not be started.
    Thread(io::Error),
}

impl TrackerError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn generator(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Generator {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTempo(bpm) => write!(f, "invalid tempo {bpm}: must be at least 1 BPM"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::PatternFile { path, message } => {
                write!(f, "{}: invalid pattern file: {message}", path.display())
            }
            Self::Config { path, message } => {
                write!(f, "{}: invalid config: {message}", path.display())
            }
            Self::UnknownGenerator(name) => write!(f, "unknown generator '{name}'"),
            Self::Generator { name, message } => write!(f, "generator '{name}': {message}"),
            Self::Terminal(e) => write!(f, "terminal: {e}"),
            Self::Thread(e) => write!(f, "could not start thread: {e}"),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Terminal(e) | Self::Thread(e) => Some(e),
            _ => None,
        }
    }
}
