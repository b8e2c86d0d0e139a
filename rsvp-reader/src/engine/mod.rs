//! Word presentation engine
//!
//! Owns the playback state, drives the repeating tick through an injected
//! scheduler and pushes each word to the display collaborator.

mod core;
mod state;

#[cfg(test)]
mod tests;

pub use self::core::{EngineConfig, ReaderEngine};
pub use state::{
    tick_period, PlaybackState, RateBounds, RateChange, ReaderSnapshot, StartOutcome,
};
