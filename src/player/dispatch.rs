//! Supervised event dispatch — one thread per generator call.
//!
//! Each call runs under `catch_unwind`; a panicking generator becomes a
//! [`UiEvent::Fault`] and an `error!` log line, never a dead player. The
//! number of calls in flight is bounded; excess events are dropped.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;

use crate::generator::Generator;
use crate::pattern::Event;
use crate::tui::event::{post, UiEvent, UiSender};

/// Name given to every dispatch thread.
pub const DISPATCH_THREAD: &str = "trkr-play";

/// Spawns and supervises generator calls.
#[derive(Clone)]
pub struct Dispatcher {
    in_flight: Arc<AtomicUsize>,
    limit: usize,
    faults: Option<UiSender>,
}

/// Decrements the in-flight count when the dispatch thread ends, even by panic.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Dispatcher {
    /// Create a dispatcher allowing at most `limit` concurrent calls (minimum 1).
    pub fn new(limit: usize, faults: Option<UiSender>) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            limit: limit.max(1),
            faults,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Play `event` on `generator` without waiting for it.
    ///
    /// Returns `false` if the event was dropped (limit reached or the
    /// thread could not be spawned).
    pub fn dispatch(&self, generator: Arc<dyn Generator>, event: Event) -> bool {
        let previous = self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlight(self.in_flight.clone());
        if previous >= self.limit {
            tracing::warn!(
                generator = generator.name(),
                limit = self.limit,
                "dispatch limit reached, event dropped"
            );
            return false;
        }

        let faults = self.faults.clone();
        let spawned = thread::Builder::new()
            .name(DISPATCH_THREAD.to_string())
            .spawn(move || {
                let _guard = guard;
                let result = panic::catch_unwind(AssertUnwindSafe(|| generator.play(&event)));
                if let Err(payload) = result {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(generator = generator.name(), "generator fault: {message}");
                    if let Some(tx) = faults {
                        post(
                            &tx,
                            UiEvent::Fault {
                                generator: generator.name().to_string(),
                                message,
                            },
                        );
                    }
                }
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("could not spawn dispatch thread: {e}");
                false
            }
        }
    }
}

/// Extract the text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Route panics on dispatch threads to the log instead of stderr.
///
/// Panics elsewhere still reach the previously installed hook. Install this
/// after the terminal is initialised so the terminal's own hook is kept for
/// real crashes.
pub fn quiet_dispatch_panics() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if thread::current().name() == Some(DISPATCH_THREAD) {
                tracing::debug!("dispatch thread panicked: {info}");
            } else {
                previous(info);
            }
        }));
    });
}
