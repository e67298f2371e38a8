//! Key-value persistence for the last played track, position and volume.
//!
//! Each field is stored under its own key and read back independently; any
//! value that cannot be parsed is treated as if it had never been saved.

mod state;
mod store;

pub use state::*;
pub use store::*;
