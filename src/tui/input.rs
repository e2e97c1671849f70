//! Keyboard poller — reads crossterm key events on a dedicated thread.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::TrySendError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};

use super::event::{post, UiEvent, UiSender};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Forwards key presses into the UI queue until stopped.
pub struct InputPoller {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputPoller {
    /// Start polling the terminal for key presses.
    pub fn start(sender: UiSender) -> io::Result<Self> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();

        let thread = thread::Builder::new()
            .name("trkr-input".to_string())
            .spawn(move || {
                while !stop_clone.load(Ordering::Relaxed) {
                    match event::poll(POLL_INTERVAL) {
                        Ok(false) => continue,
                        Ok(true) => {}
                        Err(e) => {
                            tracing::error!("keyboard poll failed: {e}");
                            break;
                        }
                    }
                    match event::read() {
                        Ok(terminal_event) => {
                            if !route(&sender, terminal_event, &stop_clone) {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!("keyboard read failed: {e}");
                            break;
                        }
                    }
                }
                tracing::debug!("keyboard poller stopped");
            })?;

        Ok(Self {
            stop_flag,
            thread: Some(thread),
        })
    }

    /// Stop the poller and wait for its thread.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Turn one terminal event into UI events. Returns `false` when the poller should exit.
fn route(sender: &UiSender, terminal_event: CrosstermEvent, stop: &AtomicBool) -> bool {
    match terminal_event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            forward(sender, UiEvent::Key(key), stop)
        }
        CrosstermEvent::Resize(..) => {
            post(sender, UiEvent::Redraw);
            true
        }
        _ => true,
    }
}

/// Queue a key without dropping it, giving up only when stopped or disconnected.
fn forward(sender: &UiSender, event: UiEvent, stop: &AtomicBool) -> bool {
    let mut pending = event;
    loop {
        match sender.try_send(pending) {
            Ok(()) => return true,
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(event)) => {
                if stop.load(Ordering::Relaxed) {
                    return false;
                }
                pending = event;
                thread::sleep(Duration::from_millis(5));
            }
        }
    }
}

impl Drop for InputPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
