//! Pattern model — events, tracks, lines, patterns, and the pattern table.
//!
//! A [`Pattern`] is a set of [`Track`]s played in lock-step. Reading it
//! "row by row" yields [`Line`]s: one event per track at the same offset.
//! Lines are derived on every call and never cached, so an edited track is
//! reflected by the next call to [`Pattern::line`] or [`Pattern::lines`].

pub mod file;

pub use file::{load_song, PatternFile, Song};

use std::fmt;
use std::sync::Arc;

use crate::generator::Generator;

/// Highest value a note or velocity may take (7-bit MIDI).
pub const MAX_VALUE: u8 = 127;

/// A musical event: a note/velocity pair bound to an optional generator.
///
/// `Event::default()` is the empty event used to pad short tracks.
#[derive(Clone, Default)]
pub struct Event {
    pub note: u8,
    pub velocity: u8,
    pub generator: Option<Arc<dyn Generator>>,
}

impl Event {
    /// Create an event played by `generator`.
    pub fn new(note: u8, velocity: u8, generator: Arc<dyn Generator>) -> Self {
        Self {
            note,
            velocity,
            generator: Some(generator),
        }
    }

    /// Create an event with no generator attached.
    pub fn bare(note: u8, velocity: u8) -> Self {
        Self {
            note,
            velocity,
            generator: None,
        }
    }

    /// The empty (padding) event.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the zero-value padding event.
    pub fn is_empty(&self) -> bool {
        self.note == 0 && self.velocity == 0 && self.generator.is_none()
    }

    /// Name of the bound generator, if any.
    pub fn generator_name(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.name())
    }
}

/// Generators compare by identity: two generators are the same only if they are one object.
fn same_generator(a: &Option<Arc<dyn Generator>>, b: &Option<Arc<dyn Generator>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
        }
        _ => false,
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.note == other.note
            && self.velocity == other.velocity
            && same_generator(&self.generator, &other.generator)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("note", &self.note)
            .field("velocity", &self.velocity)
            .field("generator", &self.generator_name())
            .finish()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.note, self.velocity)
    }
}

/// A cross-section of a pattern: one event per track at one time offset.
pub type Line = Vec<Event>;

/// A series of events played through time by one instrument.
///
/// `generator` is the instrument declared for the whole track. It outlives
/// the events, so a track whose cells are all empty still knows what plays it.
#[derive(Clone, Default)]
pub struct Track {
    pub events: Vec<Event>,
    pub generator: Option<Arc<dyn Generator>>,
}

impl Track {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            generator: None,
        }
    }

    /// A track played by `generator`, including cells written later.
    pub fn with_generator(events: Vec<Event>, generator: Arc<dyn Generator>) -> Self {
        Self {
            events,
            generator: Some(generator),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<&Event> {
        self.events.get(offset)
    }

    /// The track's declared generator, else the generator of its first event that has one.
    pub fn instrument(&self) -> Option<Arc<dyn Generator>> {
        self.generator
            .clone()
            .or_else(|| self.events.iter().find_map(|e| e.generator.clone()))
    }

    /// Write `event` at `offset`, padding with empty events if the track is shorter.
    pub fn set(&mut self, offset: usize, event: Event) {
        if offset >= self.events.len() {
            self.events.resize(offset + 1, Event::empty());
        }
        self.events[offset] = event;
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.events == other.events && same_generator(&self.generator, &other.generator)
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("events", &self.events)
            .field("generator", &self.generator.as_deref().map(|g| g.name()))
            .finish()
    }
}

/// A set of tracks played concurrently through time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    pub tracks: Vec<Track>,
}

impl Pattern {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Number of tracks (columns).
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Length of the longest track; 0 for a pattern with no events.
    pub fn max_track_len(&self) -> usize {
        self.tracks.iter().map(Track::len).max().unwrap_or(0)
    }

    /// The events of every track at `offset`.
    ///
    /// Tracks shorter than `offset + 1` contribute the empty event, so the
    /// returned line always has one entry per track.
    pub fn line(&self, offset: usize) -> Line {
        self.tracks
            .iter()
            .map(|track| track.get(offset).cloned().unwrap_or_default())
            .collect()
    }

    /// All lines of the pattern in time order.
    pub fn lines(&self) -> Vec<Line> {
        (0..self.max_track_len()).map(|i| self.line(i)).collect()
    }

    /// The event stored at `(track, offset)`, if the track is long enough.
    pub fn event(&self, track: usize, offset: usize) -> Option<&Event> {
        self.tracks.get(track)?.get(offset)
    }

    /// Insert or overwrite the event at `(track, offset)`.
    ///
    /// Returns `false` when `track` does not exist.
    pub fn set_event(&mut self, track: usize, offset: usize, event: Event) -> bool {
        match self.tracks.get_mut(track) {
            Some(t) => {
                t.set(offset, event);
                true
            }
            None => false,
        }
    }

    /// Replace the event at `(track, offset)` with the empty event.
    ///
    /// Never shortens the track. Returns `false` if there was nothing stored.
    pub fn clear_event(&mut self, track: usize, offset: usize) -> bool {
        match self
            .tracks
            .get_mut(track)
            .and_then(|t| t.events.get_mut(offset))
        {
            Some(event) => {
                *event = Event::empty();
                true
            }
            None => false,
        }
    }
}

/// Patterns played one after another: a song.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternTable {
    pub patterns: Vec<Pattern>,
}

impl PatternTable {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Pattern> {
        self.patterns.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Number of lines (ticks) a full pass over the table produces.
    pub fn total_lines(&self) -> usize {
        self.patterns.iter().map(Pattern::max_track_len).sum()
    }
}
