//! Terminal UI — the controller loop, its modes, and the pattern view.
//!
//! The [`Controller`] owns the pattern table, the player, and the render
//! surface. It waits on one [`UiEvent`] queue fed by the keyboard poller, the
//! player, and dispatch threads, and re-renders the whole frame after every
//! event that changes what is visible. It is the only code that mutates the
//! table or touches the surface.

pub mod capture;
pub mod event;
pub mod fault_log;
pub mod input;
pub mod keybindings;
pub mod mode;
pub mod selection;
pub mod status;
pub mod surface;
pub mod theme;
pub mod view;

pub use capture::{parse_cell, Capture, InputError};
pub use event::{ui_channel, UiEvent, UiReceiver, UiSender};
pub use fault_log::FaultLog;
pub use input::InputPoller;
pub use keybindings::{map_key, Action, Direction};
pub use mode::Mode;
pub use selection::{Cursor, Selection};
pub use status::StatusInfo;
pub use surface::{Surface, TerminalSurface, TextSurface};
pub use theme::Theme;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, ViewConfig};
use crate::error::TrackerError;
use crate::pattern::{Event, Pattern, PatternTable, Track};
use crate::player::{quiet_dispatch_panics, Player};

/// Lowest tempo reachable with the tempo keys.
pub const MIN_BPM: u32 = 1;
/// Highest tempo reachable with the tempo keys.
pub const MAX_BPM: u32 = 999;

/// How the controller loop starts and ends.
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Start playback before the first frame.
    pub autoplay: bool,
    /// Leave the loop when the current run ends.
    pub quit_when_stopped: bool,
    /// Leave the loop after this long.
    pub display_for: Option<Duration>,
    /// Read keys from the terminal once the surface is up.
    pub keyboard: bool,
}

/// The UI controller: a finite-state dispatcher over [`UiEvent`]s.
pub struct Controller<S: Surface> {
    table: PatternTable,
    selection: Selection,
    mode: Mode,
    capture: Capture,
    player: Player,
    surface: S,
    surface_open: bool,
    theme: Theme,
    available_themes: Vec<Theme>,
    view: ViewConfig,
    edit_key: char,
    message: Option<String>,
    /// The message came from a generator fault.
    message_is_fault: bool,
    fault_log: FaultLog,
    tx: UiSender,
    rx: UiReceiver,
    /// Table edited since the player's snapshot was taken.
    dirty: bool,
    should_quit: bool,
    options: ControllerOptions,
    input: Option<InputPoller>,
}

impl<S: Surface> Controller<S> {
    /// Build a controller. Fails for tempo 0.
    pub fn new(
        table: PatternTable,
        bpm: u32,
        config: &Config,
        theme: Theme,
        surface: S,
        options: ControllerOptions,
    ) -> Result<Self, TrackerError> {
        let (tx, rx) = ui_channel(event::UI_QUEUE_CAPACITY);
        let player = Player::new(
            bpm,
            Arc::new(table.clone()),
            Some(tx.clone()),
            config.max_in_flight,
        )?;

        let mut available_themes = theme::builtin::all_builtins();
        if !available_themes.iter().any(|t| t.name == theme.name) {
            available_themes.insert(0, theme.clone());
        }

        Ok(Self {
            table,
            selection: Selection::default(),
            mode: Mode::Browsing,
            capture: Capture::default(),
            player,
            surface,
            surface_open: false,
            theme,
            available_themes,
            view: config.view.clone(),
            edit_key: config.edit_key,
            message: None,
            message_is_fault: false,
            fault_log: FaultLog::default(),
            tx,
            rx,
            dirty: false,
            should_quit: false,
            options,
            input: None,
        })
    }

    /// A handle for posting events into the controller's queue.
    pub fn sender(&self) -> UiSender {
        self.tx.clone()
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn fault_log(&self) -> &FaultLog {
        &self.fault_log
    }

    /// Last status message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Text typed so far in Input-Capture.
    pub fn capture_text(&self) -> &str {
        self.capture.text()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the event loop until quit, then release everything.
    pub fn run(&mut self) -> Result<(), TrackerError> {
        self.surface.init().map_err(TrackerError::Terminal)?;
        self.surface_open = true;
        // After init, so the surface's own panic hook stays underneath.
        quiet_dispatch_panics();
        tracing::info!(patterns = self.table.len(), bpm = self.player.bpm(), "controller started");

        let result = self.event_loop();
        self.shutdown();
        tracing::info!("controller stopped");
        result
    }

    fn event_loop(&mut self) -> Result<(), TrackerError> {
        if self.options.keyboard && self.input.is_none() {
            let poller = InputPoller::start(self.tx.clone()).map_err(TrackerError::Thread)?;
            self.input = Some(poller);
        }
        if self.options.autoplay {
            self.start_playback();
        }
        self.redraw()?;

        let deadline = self.options.display_for.map(|d| Instant::now() + d);
        while !self.should_quit {
            let event = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        tracing::info!("display time elapsed");
                        break;
                    }
                    self.rx.recv_timeout(deadline - now)
                }
                None => Some(self.rx.recv().unwrap_or(UiEvent::Quit)),
            };
            let Some(event) = event else {
                continue;
            };
            if self.handle_event(event) {
                self.redraw()?;
            }
        }
        Ok(())
    }

    /// Stop playback, stop the keyboard poller, and close the surface once.
    pub fn shutdown(&mut self) {
        self.player.stop();
        if let Some(mut input) = self.input.take() {
            input.stop();
        }
        if self.surface_open {
            self.surface.close();
            self.surface_open = false;
        }
    }

    /// Apply one event. Returns whether the frame must be redrawn.
    pub fn handle_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Key(key) => {
                let Some(action) = map_key(key, self.mode, self.edit_key) else {
                    return false;
                };
                self.message = None;
                self.message_is_fault = false;
                self.handle_action(action);
                true
            }
            UiEvent::Tick(position) => {
                if self.player.current_run() != Some(position.run) || !self.player.is_playing() {
                    return false;
                }
                self.selection.follow(position.pattern, position.line);
                true
            }
            UiEvent::Stopped { run } => {
                if self.player.current_run() != Some(run) {
                    return false;
                }
                self.selection.reset_line();
                if self.options.quit_when_stopped {
                    self.should_quit = true;
                }
                true
            }
            UiEvent::Fault { generator, message } => {
                self.message = Some(format!("fault in {generator}: {message}"));
                self.message_is_fault = true;
                self.fault_log.push(generator, message);
                true
            }
            UiEvent::Redraw => true,
            UiEvent::Quit => {
                self.should_quit = true;
                false
            }
        }
    }

    /// Apply one key action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePlayback => {
                if self.mode == Mode::Editing {
                    self.mode = Mode::Browsing;
                }
                if self.player.is_playing() {
                    self.stop_playback();
                } else {
                    self.start_playback();
                }
            }
            Action::ToggleEdit => {
                let next = self.mode.toggle_edit();
                if next == Mode::Editing && self.mode != Mode::Editing {
                    if self.player.is_playing() {
                        self.stop_playback();
                    }
                    if let Some(pattern) = self.table.get(self.selection.pattern) {
                        self.selection.clamp_cursor(pattern);
                    }
                }
                self.mode = next;
            }
            Action::Move(direction) => {
                if self.mode != Mode::Editing {
                    return;
                }
                if let Some(pattern) = self.table.get(self.selection.pattern) {
                    self.selection.move_cursor(direction, pattern);
                }
            }
            Action::BeginCapture => {
                let has_tracks = self
                    .table
                    .get(self.selection.pattern)
                    .is_some_and(|p| p.track_count() > 0);
                if self.mode == Mode::Editing && has_tracks {
                    self.capture.clear();
                    self.mode = Mode::Capture;
                }
            }
            Action::CaptureInsert(c) => self.capture.insert(c),
            Action::CaptureBackspace => self.capture.backspace(),
            Action::CaptureCancel => {
                self.capture.clear();
                self.mode = Mode::Editing;
            }
            Action::CaptureCommit => self.commit_capture(),
            Action::ClearCell => {
                if self.mode != Mode::Editing {
                    return;
                }
                let Cursor { row, col } = self.selection.cursor;
                let cleared = self
                    .table
                    .get_mut(self.selection.pattern)
                    .is_some_and(|p| p.clear_event(col, row));
                if cleared {
                    self.table_edited();
                }
            }
            Action::PrevPattern => {
                let index = self.selection.pattern.saturating_sub(1);
                self.switch_pattern(index);
            }
            Action::NextPattern => {
                let index = self.selection.pattern + 1;
                self.switch_pattern(index);
            }
            Action::TempoUp => self.change_tempo(1),
            Action::TempoDown => self.change_tempo(-1),
            Action::CycleTheme => {
                self.theme = theme::cycle_theme(&self.theme, &self.available_themes);
                self.message = Some(format!("theme: {}", self.theme.name));
            }
        }
    }

    fn commit_capture(&mut self) {
        let text = self.capture.take();
        self.mode = Mode::Editing;

        let (note, velocity) = match parse_cell(&text) {
            Ok(Some(values)) => values,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(input = %text, "rejected cell input: {e}");
                self.message = Some(format!("invalid input: {e}"));
                return;
            }
        };

        let Cursor { row, col } = self.selection.cursor;
        let Some(pattern) = self.table.get_mut(self.selection.pattern) else {
            return;
        };
        let generator = pattern
            .event(col, row)
            .and_then(|e| e.generator.clone())
            .or_else(|| pattern.tracks.get(col).and_then(Track::instrument));
        let event = Event {
            note,
            velocity,
            generator,
        };
        if pattern.set_event(col, row, event) {
            tracing::debug!(
                pattern = self.selection.pattern,
                track = col,
                line = row,
                note,
                velocity,
                "cell written"
            );
            self.table_edited();
        }
    }

    fn table_edited(&mut self) {
        self.dirty = true;
        event::post(&self.tx, UiEvent::Redraw);
    }

    fn switch_pattern(&mut self, index: usize) {
        if self.player.is_playing() {
            self.message = Some("stop playback to change pattern".to_string());
            return;
        }
        if self.selection.select_pattern(index, self.table.len()) {
            if let Some(pattern) = self.table.get(index) {
                self.selection.clamp_cursor(pattern);
            }
        }
    }

    fn change_tempo(&mut self, delta: i64) {
        let bpm = (i64::from(self.player.bpm()) + delta)
            .clamp(i64::from(MIN_BPM), i64::from(MAX_BPM));
        let bpm = u32::try_from(bpm).unwrap_or(MIN_BPM);
        if bpm == self.player.bpm() {
            return;
        }
        if let Err(e) = self.player.set_bpm(bpm) {
            self.message = Some(e.to_string());
            return;
        }
        if self.player.is_playing() {
            self.message = Some(format!("tempo {bpm} BPM from next play"));
        }
    }

    fn start_playback(&mut self) {
        if self.dirty {
            self.player.load(Arc::new(self.table.clone()));
            self.dirty = false;
        }
        self.selection.reset_line();
        if let Err(e) = self.player.play() {
            tracing::error!("could not start playback: {e}");
            self.message = Some(e.to_string());
        }
    }

    fn stop_playback(&mut self) {
        self.player.stop();
        self.selection.reset_line();
    }

    fn status(&self) -> StatusInfo {
        StatusInfo {
            bpm: self.player.bpm(),
            is_playing: self.player.is_playing(),
            pattern: self.selection.pattern,
            pattern_count: self.table.len(),
            line: self.selection.line,
            mode: self.mode,
            faults: self.fault_log.total(),
        }
    }

    fn message_row(&self) -> String {
        if self.mode == Mode::Capture {
            return format!("note velocity: {}_", self.capture.text());
        }
        match &self.message {
            Some(message) => message.clone(),
            None => keybindings::hints(self.mode, self.edit_key),
        }
    }

    /// Render the current state as one full frame.
    pub fn redraw(&mut self) -> Result<(), TrackerError> {
        let status = self.status().render();
        let message = self.message_row();
        let pattern: Option<&Pattern> = self.table.get(self.selection.pattern);
        let scene = view::Scene {
            pattern,
            playing_line: self.selection.line,
            cursor: self.mode.shows_cursor().then_some(self.selection.cursor),
            status,
            message_is_fault: self.message_is_fault && self.mode != Mode::Capture,
            message,
            theme: &self.theme,
            config: &self.view,
        };
        view::render(&mut self.surface, &scene).map_err(TrackerError::Terminal)
    }
}

impl<S: Surface> Drop for Controller<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn table() -> PatternTable {
        PatternTable::new(vec![
            Pattern::new(vec![
                Track::new(vec![Event::bare(60, 100); 5]),
                Track::new(vec![Event::bare(62, 90); 3]),
                Track::new(vec![Event::bare(64, 80)]),
            ]),
            Pattern::new(vec![Track::new(vec![Event::bare(1, 1); 2])]),
        ])
    }

    fn controller() -> Controller<TextSurface<Vec<u8>>> {
        Controller::new(
            table(),
            120,
            &Config::default(),
            theme::builtin::default(),
            TextSurface::new(Vec::new(), 80, 20),
            ControllerOptions::default(),
        )
        .unwrap()
    }

    fn type_text(c: &mut Controller<TextSurface<Vec<u8>>>, text: &str) {
        for ch in text.chars() {
            c.handle_event(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn starts_browsing() {
        let c = controller();
        assert_eq!(c.mode(), Mode::Browsing);
        assert!(!c.player().is_playing());
        assert!(!c.should_quit());
    }

    #[test]
    fn edit_key_toggles_editing() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        assert_eq!(c.mode(), Mode::Editing);
        c.handle_event(key(KeyCode::Char('e')));
        assert_eq!(c.mode(), Mode::Browsing);
    }

    #[test]
    fn edit_key_is_typed_while_capturing() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        c.handle_event(key(KeyCode::Enter));
        c.handle_event(key(KeyCode::Char('e')));
        assert_eq!(c.mode(), Mode::Capture);
        assert_eq!(c.capture_text(), "e");
    }

    #[test]
    fn arrows_ignored_while_browsing() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Down));
        assert_eq!(c.selection().cursor, Cursor::default());
    }

    #[test]
    fn commit_keeps_cell_generator_slot() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        c.handle_event(key(KeyCode::Right));
        c.handle_event(key(KeyCode::Enter));
        assert_eq!(c.mode(), Mode::Capture);
        type_text(&mut c, "70 55");
        assert_eq!(c.capture_text(), "70 55");
        c.handle_event(key(KeyCode::Enter));

        assert_eq!(c.mode(), Mode::Editing);
        let event = c.table().get(0).unwrap().event(1, 0).unwrap();
        assert_eq!((event.note, event.velocity), (70, 55));
    }

    #[test]
    fn malformed_input_keeps_cell() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        c.handle_event(key(KeyCode::Enter));
        type_text(&mut c, "sixty 1");
        c.handle_event(key(KeyCode::Enter));

        assert_eq!(c.mode(), Mode::Editing);
        assert!(c.message().unwrap_or_default().contains("invalid input"));
        let event = c.table().get(0).unwrap().event(0, 0).unwrap();
        assert_eq!((event.note, event.velocity), (60, 100));
    }

    #[test]
    fn escape_in_capture_cancels() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        c.handle_event(key(KeyCode::Enter));
        type_text(&mut c, "1 1");
        c.handle_event(key(KeyCode::Esc));

        assert_eq!(c.mode(), Mode::Editing);
        assert!(!c.should_quit());
        let event = c.table().get(0).unwrap().event(0, 0).unwrap();
        assert_eq!(event.note, 60);
    }

    #[test]
    fn clear_cell_empties_event() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        c.handle_event(key(KeyCode::Delete));
        assert!(c.table().get(0).unwrap().event(0, 0).unwrap().is_empty());
        assert_eq!(c.table().get(0).unwrap().tracks[0].len(), 5);
    }

    #[test]
    fn pattern_switch_clamps_cursor() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        for _ in 0..4 {
            c.handle_event(key(KeyCode::Down));
            c.handle_event(key(KeyCode::Right));
        }
        assert_eq!(c.selection().cursor, Cursor { row: 4, col: 2 });

        c.handle_event(key(KeyCode::Char(']')));
        assert_eq!(c.selection().pattern, 1);
        assert_eq!(c.selection().cursor, Cursor { row: 1, col: 0 });

        c.handle_event(key(KeyCode::Char(']')));
        assert_eq!(c.selection().pattern, 1);
        c.handle_event(key(KeyCode::Char('[')));
        assert_eq!(c.selection().pattern, 0);
    }

    #[test]
    fn tempo_keys_clamp() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('+')));
        assert_eq!(c.player().bpm(), 121);
        c.handle_event(key(KeyCode::Char('-')));
        c.handle_event(key(KeyCode::Char('-')));
        assert_eq!(c.player().bpm(), 119);
    }

    #[test]
    fn theme_key_cycles() {
        let mut c = controller();
        let before = c.theme().name.clone();
        c.handle_event(key(KeyCode::Char('t')));
        assert_ne!(c.theme().name, before);
    }

    #[test]
    fn fault_event_is_logged() {
        let mut c = controller();
        assert!(c.handle_event(UiEvent::Fault {
            generator: "lead".into(),
            message: "boom".into(),
        }));
        assert_eq!(c.fault_log().total(), 1);
        assert_eq!(c.message(), Some("fault in lead: boom"));
    }

    #[test]
    fn quit_event_sets_flag() {
        let mut c = controller();
        assert!(!c.handle_event(UiEvent::Quit));
        assert!(c.should_quit());
    }

    #[test]
    fn redraw_renders_cursor_in_editing() {
        let mut c = controller();
        c.handle_event(key(KeyCode::Char('e')));
        c.redraw().unwrap();
        let cell = c.surface().cell(4, 2).unwrap();
        assert_eq!(cell.bg, c.theme().cursor);
        assert!(c
            .surface()
            .frame_lines()
            .iter()
            .any(|l| l.contains("EDIT")));
    }
}
