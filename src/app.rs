//! Application module: the view model the terminal UI renders.
//!
//! `App` holds the playlist items built from the catalog at startup plus
//! the cursor state used to browse and activate them.

mod model;
mod playlists;

pub use model::*;
pub use playlists::*;

#[cfg(test)]
mod tests;
