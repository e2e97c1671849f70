//! Status bar — transport, tempo, position, mode, and fault count.

use super::mode::Mode;

/// Snapshot of everything the status row shows.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub bpm: u32,
    pub is_playing: bool,
    pub pattern: usize,
    pub pattern_count: usize,
    pub line: Option<usize>,
    pub mode: Mode,
    pub faults: u64,
}

impl StatusInfo {
    pub fn playback_display(&self) -> &str {
        if self.is_playing {
            "PLAY"
        } else {
            "STOP"
        }
    }

    /// "PAT 1/3" (one-based).
    pub fn pattern_display(&self) -> String {
        if self.pattern_count == 0 {
            return "PAT -/0".to_string();
        }
        format!("PAT {}/{}", self.pattern + 1, self.pattern_count)
    }

    /// "LINE 4" (one-based), "LINE -" when not playing.
    pub fn line_display(&self) -> String {
        match self.line {
            Some(line) => format!("LINE {}", line + 1),
            None => "LINE -".to_string(),
        }
    }

    /// Full status row text.
    pub fn render(&self) -> String {
        let mut text = format!(
            " {}  {} BPM  {}  {}  {}",
            self.playback_display(),
            self.bpm,
            self.pattern_display(),
            self.line_display(),
            self.mode.label(),
        );
        if self.faults > 0 {
            text.push_str(&format!("  FAULTS {}", self.faults));
        }
        text
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self {
            bpm: 120,
            is_playing: false,
            pattern: 0,
            pattern_count: 0,
            line: None,
            mode: Mode::Browsing,
            faults: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_status() {
        let status = StatusInfo {
            pattern_count: 2,
            ..Default::default()
        };
        assert_eq!(status.render(), " STOP  120 BPM  PAT 1/2  LINE -  BROWSE");
    }

    #[test]
    fn playing_status_with_faults() {
        let status = StatusInfo {
            bpm: 90,
            is_playing: true,
            pattern: 1,
            pattern_count: 2,
            line: Some(3),
            mode: Mode::Browsing,
            faults: 2,
        };
        assert_eq!(
            status.render(),
            " PLAY  90 BPM  PAT 2/2  LINE 4  BROWSE  FAULTS 2"
        );
    }

    #[test]
    fn empty_table() {
        let status = StatusInfo::default();
        assert_eq!(status.pattern_display(), "PAT -/0");
    }
}
