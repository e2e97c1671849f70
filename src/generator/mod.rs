//! Generators — the capabilities that make sound when an event is played.
//!
//! The player never knows what a generator does; it only calls
//! [`Generator::play`] on a dispatch thread and moves on. Concrete
//! generators are built once from the pattern file into a [`GeneratorBank`].

pub mod midi;
pub mod osc;
pub mod trace;

pub use midi::MidiGenerator;
pub use osc::OscGenerator;
pub use trace::TraceGenerator;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::pattern::Event;

/// A device that can play an [`Event`].
///
/// Fire-and-forget: there is no return value and no completion signal.
pub trait Generator: Send + Sync {
    /// Play one event. May block; it runs on its own dispatch thread.
    fn play(&self, event: &Event);

    /// Human-readable name, unique within a [`GeneratorBank`].
    fn name(&self) -> &str;
}

/// How to build a generator, as written in the pattern file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeneratorSpec {
    /// MIDI output port (first port, or the first whose name contains `port`).
    Midi {
        #[serde(default)]
        port: Option<String>,
        #[serde(default)]
        channel: u8,
        #[serde(default = "default_gate_ms")]
        gate_ms: u64,
    },
    /// OSC messages over UDP.
    Osc {
        target: String,
        #[serde(default)]
        address: Option<String>,
    },
    /// Log every event; makes no sound.
    Trace,
}

fn default_gate_ms() -> u64 {
    200
}

impl GeneratorSpec {
    /// Build the generator described by this spec under `name`.
    pub fn build(&self, name: &str) -> Result<Arc<dyn Generator>, TrackerError> {
        let generator: Arc<dyn Generator> = match self {
            Self::Midi {
                port,
                channel,
                gate_ms,
            } => Arc::new(
                MidiGenerator::connect(
                    name,
                    port.as_deref(),
                    *channel,
                    Duration::from_millis(*gate_ms),
                )
                .map_err(|e| TrackerError::generator(name, e))?,
            ),
            Self::Osc { target, address } => {
                let address = address.clone().unwrap_or_else(|| format!("/trkr/{name}"));
                Arc::new(
                    OscGenerator::connect(name, target, &address)
                        .map_err(|e| TrackerError::generator(name, e))?,
                )
            }
            Self::Trace => Arc::new(TraceGenerator::new(name)),
        };
        Ok(generator)
    }
}

/// Named generators available to a song.
#[derive(Clone, Default)]
pub struct GeneratorBank {
    generators: BTreeMap<String, Arc<dyn Generator>>,
}

impl GeneratorBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every generator in `specs`. The first failure aborts.
    pub fn from_specs(specs: &BTreeMap<String, GeneratorSpec>) -> Result<Self, TrackerError> {
        let mut bank = Self::new();
        for (name, spec) in specs {
            bank.insert(spec.build(name)?);
        }
        Ok(bank)
    }

    /// Add a generator under its own name, replacing any previous one.
    pub fn insert(&mut self, generator: Arc<dyn Generator>) {
        self.generators
            .insert(generator.name().to_string(), generator);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Generator>> {
        self.generators.get(name).cloned()
    }

    /// Look up a generator, failing with [`TrackerError::UnknownGenerator`].
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Generator>, TrackerError> {
        self.get(name)
            .ok_or_else(|| TrackerError::UnknownGenerator(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}
