//! trkr — a terminal step-sequenced pattern editor and player.

pub mod config;
pub mod error;
pub mod generator;
pub mod pattern;
pub mod player;
pub mod tui;

pub use config::Config;
pub use error::TrackerError;
