//! Playback engine: one audio source at a time, driven by commands and
//! reporting progress back through subscribed event channels.

mod player;
mod source;
mod thread;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use player::RodioEngine;
pub use types::*;

use std::sync::mpsc::Receiver;

use crate::catalog::Track;

/// A single native playback resource bound to at most one track.
pub trait PlaybackEngine {
    /// Make `track` the active source at position 0 without starting it.
    /// Events produced by this source carry the returned id.
    fn load(&mut self, track: &Track) -> LoadId;
    /// Start or resume; no-op when already playing.
    fn play(&mut self);
    fn pause(&mut self);
    /// Jump to `seconds`, clamped to the source's duration when known.
    fn seek(&mut self, seconds: f64);
    /// Output volume as a fraction in `[0, 1]`.
    fn set_volume(&mut self, fraction: f32);
    /// Register for `TimeUpdate`/`Ended` events.
    fn subscribe(&mut self) -> Receiver<EngineEvent>;
}
