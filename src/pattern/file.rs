//! Pattern file — YAML load of a song (generators + pattern table).
//!
//! The whole file is read and validated before anything else happens; any
//! problem is a [`TrackerError`] for the caller to report.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Event, Pattern, PatternTable, Track, MAX_VALUE};
use crate::error::TrackerError;
use crate::generator::{GeneratorBank, GeneratorSpec};

/// On-disk representation of a song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<u32>,
    #[serde(default)]
    pub generators: BTreeMap<String, GeneratorSpec>,
    pub patterns: Vec<PatternDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDef {
    pub tracks: Vec<TrackDef>,
}

/// One track: every event is played by `generator`. `None` cells are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default)]
    pub events: Vec<Option<(u8, u8)>>,
}

/// A loaded song, ready to hand to the controller.
pub struct Song {
    pub table: PatternTable,
    pub tempo: Option<u32>,
    pub generators: GeneratorBank,
}

impl PatternFile {
    /// Parse a YAML document.
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// First note or velocity above [`MAX_VALUE`], as a readable location.
    pub fn check_ranges(&self) -> Result<(), String> {
        for (p, def) in self.patterns.iter().enumerate() {
            for (t, track) in def.tracks.iter().enumerate() {
                for (i, cell) in track.events.iter().enumerate() {
                    let Some((note, velocity)) = cell else {
                        continue;
                    };
                    for (field, value) in [("note", note), ("velocity", velocity)] {
                        if *value > MAX_VALUE {
                            return Err(format!(
                                "pattern {p} track {t} event {i}: \
                                 {field} {value} out of range 0-{MAX_VALUE}"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Build a pattern table, resolving generator names against `bank`.
    ///
    /// Call [`PatternFile::check_ranges`] first; values are copied as they are.
    pub fn to_table(&self, bank: &GeneratorBank) -> Result<PatternTable, TrackerError> {
        let mut patterns = Vec::with_capacity(self.patterns.len());
        for def in &self.patterns {
            let mut tracks = Vec::with_capacity(def.tracks.len());
            for track_def in &def.tracks {
                let generator = match &track_def.generator {
                    Some(name) => Some(bank.resolve(name)?),
                    None => None,
                };
                let events = track_def
                    .events
                    .iter()
                    .map(|cell| match cell {
                        Some((note, velocity)) => Event {
                            note: *note,
                            velocity: *velocity,
                            generator: generator.clone(),
                        },
                        None => Event::empty(),
                    })
                    .collect();
                tracks.push(Track { events, generator });
            }
            patterns.push(Pattern::new(tracks));
        }
        Ok(PatternTable::new(patterns))
    }
}

/// Read, parse, and build a song from `path`.
pub fn load_song(path: &Path) -> Result<Song, TrackerError> {
    let content = std::fs::read_to_string(path).map_err(|e| TrackerError::io(path, e))?;
    let file = PatternFile::parse(&content).map_err(|e| TrackerError::PatternFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if file.tempo == Some(0) {
        return Err(TrackerError::InvalidTempo(0));
    }
    file.check_ranges().map_err(|message| TrackerError::PatternFile {
        path: path.to_path_buf(),
        message,
    })?;

    let generators = GeneratorBank::from_specs(&file.generators)?;
    let table = file.to_table(&generators)?;
    tracing::info!(
        path = %path.display(),
        patterns = table.len(),
        generators = generators.len(),
        "loaded song"
    );

    Ok(Song {
        table,
        tempo: file.tempo,
        generators,
    })
}
