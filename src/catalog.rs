//! Track catalog and curated playlists.
//!
//! The catalog is validated once at construction and is read-only
//! afterwards: every playlist entry is guaranteed to resolve to a track.

mod builtin;
mod load;
mod model;

pub use model::*;
