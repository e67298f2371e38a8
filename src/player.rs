//! Player controller: the single owner of playback state.
//!
//! `Player` wires the catalog, a `PlaybackEngine` and a `KeyValueStore`
//! together and is the only writer of persisted state.

mod controller;
mod model;

pub use controller::*;
pub use model::*;
