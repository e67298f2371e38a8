use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Stable track identifier as stored in playlists and the state file.
pub type TrackId = u32;

/// One playable song with its metadata and media locations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub audio: PathBuf,
    pub artwork: PathBuf,
}

/// A named, ordered list of track ids. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(rename = "tracks")]
    pub track_ids: Vec<TrackId>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog contains no tracks")]
    Empty,
    #[error("duplicate track id {0}")]
    DuplicateId(TrackId),
    #[error("duplicate playlist name {0:?}")]
    DuplicatePlaylist(String),
    #[error("playlist {playlist:?} references unknown track id {id}")]
    UnknownTrack { playlist: String, id: TrackId },
    #[error("no track with id {0}")]
    NotFound(TrackId),
    #[error("track index {index} out of range (catalog has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The full track set plus its playlists.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
    playlists: Vec<Playlist>,
}

impl Catalog {
    /// Build a catalog, rejecting empty track lists, duplicate ids and
    /// playlist entries that do not resolve.
    pub fn new(tracks: Vec<Track>, playlists: Vec<Playlist>) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = HashSet::with_capacity(tracks.len());
        for t in &tracks {
            if !ids.insert(t.id) {
                return Err(CatalogError::DuplicateId(t.id));
            }
        }

        let mut names = HashSet::with_capacity(playlists.len());
        for p in &playlists {
            if !names.insert(p.name.as_str()) {
                return Err(CatalogError::DuplicatePlaylist(p.name.clone()));
            }
            if let Some(&id) = p.track_ids.iter().find(|id| !ids.contains(id)) {
                return Err(CatalogError::UnknownTrack {
                    playlist: p.name.clone(),
                    id,
                });
            }
        }

        Ok(Self { tracks, playlists })
    }

    pub fn find_track_by_id(&self, id: TrackId) -> Result<&Track, CatalogError> {
        self.tracks
            .iter()
            .find(|t| t.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    /// Resolve a track id to its position in the catalog.
    pub fn index_of_track(&self, id: TrackId) -> Result<usize, CatalogError> {
        self.tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    pub fn track_at(&self, index: usize) -> Result<&Track, CatalogError> {
        self.tracks.get(index).ok_or(CatalogError::IndexOutOfRange {
            index,
            len: self.tracks.len(),
        })
    }

    /// Number of tracks; never zero.
    // `new` rejects empty catalogs, so there is no `is_empty`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Resolve relative audio and artwork paths against `root`.
    pub fn with_media_root(mut self, root: &Path) -> Self {
        for t in &mut self.tracks {
            if t.audio.is_relative() {
                t.audio = root.join(&t.audio);
            }
            if t.artwork.is_relative() {
                t.artwork = root.join(&t.artwork);
            }
        }
        self
    }
}
