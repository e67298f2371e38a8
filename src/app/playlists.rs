use std::path::PathBuf;

use crate::catalog::{Catalog, TrackId};

/// One entry of a rendered playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistItem {
    pub track_id: TrackId,
    /// Catalog position handed to `Player::select_track` on activation.
    pub catalog_index: usize,
    pub title: String,
    pub artist: String,
    pub artwork: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistView {
    pub name: String,
    pub items: Vec<PlaylistItem>,
}

/// Build one view per playlist, one item per referenced track, in playlist
/// order. The catalog guarantees every reference resolves.
pub fn build_playlist_views(catalog: &Catalog) -> Vec<PlaylistView> {
    catalog
        .playlists()
        .iter()
        .map(|p| PlaylistView {
            name: p.name.clone(),
            items: p
                .track_ids
                .iter()
                .filter_map(|&id| {
                    let track = catalog.find_track_by_id(id).ok()?;
                    let index = catalog.index_of_track(id).ok()?;
                    Some(PlaylistItem {
                        track_id: id,
                        catalog_index: index,
                        title: track.title.clone(),
                        artist: track.artist.clone(),
                        artwork: track.artwork.clone(),
                    })
                })
                .collect(),
        })
        .collect()
}
