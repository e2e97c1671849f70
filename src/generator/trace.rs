//! Trace generator — logs each event instead of making sound.

use std::sync::atomic::{AtomicU64, Ordering};

use super::Generator;
use crate::pattern::Event;

pub struct TraceGenerator {
    name: String,
    played: AtomicU64,
}

impl TraceGenerator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            played: AtomicU64::new(0),
        }
    }

    /// Number of events played so far.
    pub fn played(&self) -> u64 {
        self.played.load(Ordering::Relaxed)
    }
}

impl Generator for TraceGenerator {
    fn play(&self, event: &Event) {
        self.played.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            generator = %self.name,
            note = event.note,
            velocity = event.velocity,
            "play"
        );
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_plays() {
        let g = TraceGenerator::new("log");
        g.play(&Event::bare(60, 100));
        g.play(&Event::bare(62, 100));
        assert_eq!(g.played(), 2);
        assert_eq!(g.name(), "log");
    }
}
