//! Player — walks a pattern table at a tempo on its own thread.
//!
//! Each `play()` starts a *run*: a thread that, for every line of every
//! pattern, posts a tick, dispatches the line's events, and then waits one
//! beat or until stopped. Runs are numbered so the UI can ignore events from
//! a run it has already stopped.

pub mod dispatch;

pub use dispatch::{quiet_dispatch_panics, Dispatcher};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::TrackerError;
use crate::pattern::PatternTable;
use crate::tui::event::{post, UiEvent, UiSender};

/// Name given to the run thread.
pub const PLAYER_THREAD: &str = "trkr-player";

/// Default in-flight dispatch bound.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Absolute playback position carried by every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub run: u64,
    pub pattern: usize,
    pub line: usize,
}

/// Length of one beat at `bpm` beats per minute.
pub fn beat_duration(bpm: u32) -> Result<Duration, TrackerError> {
    if bpm == 0 {
        return Err(TrackerError::InvalidTempo(bpm));
    }
    Ok(Duration::from_nanos(60_000_000_000 / u64::from(bpm)))
}

struct Run {
    id: u64,
    stop_tx: mpsc::SyncSender<()>,
    active: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// The tempo-driven scheduler.
pub struct Player {
    bpm: u32,
    table: Arc<PatternTable>,
    events: Option<UiSender>,
    dispatcher: Dispatcher,
    run: Option<Run>,
    next_run: u64,
}

impl Player {
    /// Create a stopped player. Fails for tempo 0.
    pub fn new(
        bpm: u32,
        table: Arc<PatternTable>,
        events: Option<UiSender>,
        max_in_flight: usize,
    ) -> Result<Self, TrackerError> {
        beat_duration(bpm)?;
        let dispatcher = Dispatcher::new(max_in_flight, events.clone());
        Ok(Self {
            bpm,
            table,
            events,
            dispatcher,
            run: None,
            next_run: 1,
        })
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Change the tempo. Takes effect from the next run.
    pub fn set_bpm(&mut self, bpm: u32) -> Result<(), TrackerError> {
        beat_duration(bpm)?;
        self.bpm = bpm;
        Ok(())
    }

    pub fn beat_duration(&self) -> Duration {
        Duration::from_nanos(60_000_000_000 / u64::from(self.bpm))
    }

    /// Replace the snapshot used by the next run.
    pub fn load(&mut self, table: Arc<PatternTable>) {
        self.table = table;
    }

    pub fn table(&self) -> &Arc<PatternTable> {
        &self.table
    }

    /// Whether a run is in progress and has not been asked to stop.
    pub fn is_playing(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| run.active.load(Ordering::Acquire))
    }

    /// Id of the most recently started run, if any.
    pub fn current_run(&self) -> Option<u64> {
        self.run.as_ref().map(|run| run.id)
    }

    /// Start when stopped, stop when playing.
    pub fn toggle_playback(&mut self) -> Result<(), TrackerError> {
        if self.is_playing() {
            self.stop();
            Ok(())
        } else {
            self.play().map(|_| ())
        }
    }

    /// Start a new run over the current snapshot. Returns its id.
    ///
    /// Any previous run is asked to stop first.
    pub fn play(&mut self) -> Result<u64, TrackerError> {
        self.stop();

        let id = self.next_run;
        self.next_run += 1;
        let beat = self.beat_duration();
        let (stop_tx, stop_rx) = mpsc::sync_channel::<()>(1);
        let active = Arc::new(AtomicBool::new(true));

        let table = self.table.clone();
        let events = self.events.clone();
        let dispatcher = self.dispatcher.clone();
        let flag = active.clone();

        let thread = thread::Builder::new()
            .name(PLAYER_THREAD.to_string())
            .spawn(move || {
                tracing::info!(run = id, ?beat, patterns = table.len(), "playback started");
                run_table(id, &table, beat, &stop_rx, events.as_ref(), &dispatcher);
                flag.store(false, Ordering::Release);
                tracing::info!(run = id, "playback stopped");
                if let Some(tx) = &events {
                    post(tx, UiEvent::Stopped { run: id });
                }
            })
            .map_err(TrackerError::Thread)?;

        self.run = Some(Run {
            id,
            stop_tx,
            active,
            thread: Some(thread),
        });
        Ok(id)
    }

    /// Ask the current run to stop. No effect when stopped.
    pub fn stop(&mut self) {
        let Some(run) = &self.run else {
            return;
        };
        if run.active.swap(false, Ordering::AcqRel) {
            // Capacity 1: a second request while the first is pending is dropped.
            let _ = run.stop_tx.try_send(());
        }
    }

    /// Block until the current run thread has finished.
    pub fn wait(&mut self) {
        if let Some(handle) = self.run.as_mut().and_then(|run| run.thread.take()) {
            if handle.join().is_err() {
                tracing::error!("player thread panicked");
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of a run: tick, dispatch, wait, for every line in traversal order.
fn run_table(
    id: u64,
    table: &PatternTable,
    beat: Duration,
    stop_rx: &mpsc::Receiver<()>,
    events: Option<&UiSender>,
    dispatcher: &Dispatcher,
) {
    for (pattern_index, pattern) in table.iter().enumerate() {
        for (line_index, line) in pattern.lines().into_iter().enumerate() {
            // A dropped tick is harmless: the next one carries an absolute position.
            if let Some(tx) = events {
                post(
                    tx,
                    UiEvent::Tick(Position {
                        run: id,
                        pattern: pattern_index,
                        line: line_index,
                    }),
                );
            }

            for event in line {
                if event.is_empty() {
                    continue;
                }
                if let Some(generator) = event.generator.clone() {
                    dispatcher.dispatch(generator, event);
                }
            }

            match stop_rx.recv_timeout(beat) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Event, Pattern, Track};
    use crate::tui::event::ui_channel;

    fn one_line_table() -> Arc<PatternTable> {
        Arc::new(PatternTable::new(vec![Pattern::new(vec![Track::new(vec![
            Event::bare(60, 100),
        ])])]))
    }

    #[test]
    fn beat_duration_at_common_tempos() {
        assert_eq!(beat_duration(120).unwrap().as_nanos(), 500_000_000);
        assert_eq!(beat_duration(60).unwrap().as_nanos(), 1_000_000_000);
        assert_eq!(beat_duration(1).unwrap().as_nanos(), 60_000_000_000);
    }

    #[test]
    fn zero_tempo_is_rejected() {
        assert!(matches!(beat_duration(0), Err(TrackerError::InvalidTempo(0))));
        assert!(Player::new(0, one_line_table(), None, 4).is_err());

        let mut player = Player::new(120, one_line_table(), None, 4).unwrap();
        assert!(player.set_bpm(0).is_err());
        assert_eq!(player.bpm(), 120);
    }

    #[test]
    fn new_player_is_stopped() {
        let player = Player::new(120, one_line_table(), None, 4).unwrap();
        assert!(!player.is_playing());
        assert_eq!(player.current_run(), None);
    }

    #[test]
    fn stop_when_stopped_is_noop() {
        let mut player = Player::new(120, one_line_table(), None, 4).unwrap();
        player.stop();
        player.stop();
        assert!(!player.is_playing());
    }

    #[test]
    fn run_ids_increase() {
        let mut player = Player::new(6000, one_line_table(), None, 4).unwrap();
        let first = player.play().unwrap();
        player.wait();
        let second = player.play().unwrap();
        player.wait();
        assert!(second > first);
        assert_eq!(player.current_run(), Some(second));
    }

    #[test]
    fn exhausted_run_posts_stopped() {
        let (tx, rx) = ui_channel(16);
        let mut player = Player::new(6000, one_line_table(), Some(tx), 4).unwrap();
        let run = player.play().unwrap();
        player.wait();
        assert!(!player.is_playing());

        let events = rx.drain();
        assert_eq!(
            events,
            vec![
                UiEvent::Tick(Position {
                    run,
                    pattern: 0,
                    line: 0
                }),
                UiEvent::Stopped { run },
            ]
        );
    }

    #[test]
    fn empty_table_stops_immediately() {
        let (tx, rx) = ui_channel(4);
        let mut player = Player::new(120, Arc::new(PatternTable::default()), Some(tx), 4).unwrap();
        let run = player.play().unwrap();
        player.wait();
        assert_eq!(rx.drain(), vec![UiEvent::Stopped { run }]);
    }
}
