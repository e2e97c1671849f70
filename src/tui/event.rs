//! UI event queue — the single channel the controller loop waits on.
//!
//! Keyboard input, player ticks, fault reports, redraw requests, and quit
//! requests all arrive here as [`UiEvent`]s. The queue is bounded; producers
//! that must not block (the player) use `try_send`.

use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::player::Position;

/// Default queue capacity.
pub const UI_QUEUE_CAPACITY: usize = 1024;

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A key press from the keyboard poller.
    Key(KeyEvent),
    /// The player advanced to a new line.
    Tick(Position),
    /// A playback run ended (table exhausted or stop requested).
    Stopped { run: u64 },
    /// A generator failed while playing an event.
    Fault { generator: String, message: String },
    /// Re-render without any other state change.
    Redraw,
    /// Leave the controller loop.
    Quit,
}

/// Sender half, cloned into every producer thread.
pub type UiSender = mpsc::SyncSender<UiEvent>;

/// Post without blocking. Returns `false` if the event was not queued.
pub fn post(tx: &UiSender, event: UiEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            tracing::debug!(?event, "ui queue full, event dropped");
            false
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

/// Receiver half, held by the controller loop.
pub struct UiReceiver {
    rx: mpsc::Receiver<UiEvent>,
}

impl UiReceiver {
    /// Block until the next event. `None` once every sender is gone.
    pub fn recv(&self) -> Option<UiEvent> {
        self.rx.recv().ok()
    }

    /// Block for at most `timeout`. `Quit` when every sender is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<UiEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(UiEvent::Quit),
        }
    }

    /// Non-blocking poll for the next event.
    pub fn poll(&self) -> Option<UiEvent> {
        self.rx.try_recv().ok()
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Create a bounded UI queue.
pub fn ui_channel(capacity: usize) -> (UiSender, UiReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (tx, UiReceiver { rx })
}
