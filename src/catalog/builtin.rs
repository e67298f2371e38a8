use std::path::PathBuf;

use super::model::{Catalog, Playlist, Track, TrackId};

const BUILTIN_TRACKS: [(TrackId, &str, &str); 6] = [
    (0, "Forest Lullaby", "Lesfm"),
    (1, "Lost in the City", "Cosmo Sheldrake"),
    (2, "Ambient Gold", "Alex Productions"),
    (3, "The Wanderer", "Bonobo"),
    (4, "Sunset Drive", "Tycho"),
    (5, "Midnight City", "M83"),
];

impl Catalog {
    /// The default catalog shipped with the player: six tracks under
    /// `assets/` and the `focus` and `spotify` playlists.
    pub fn builtin() -> Self {
        let tracks = BUILTIN_TRACKS
            .iter()
            .map(|&(id, title, artist)| Track {
                id,
                title: title.to_string(),
                artist: artist.to_string(),
                audio: PathBuf::from(format!("assets/audio/song{}.mp3", id + 1)),
                artwork: PathBuf::from(format!("assets/images/art{}.png", id + 1)),
            })
            .collect();

        let playlists = vec![
            Playlist {
                name: "focus".to_string(),
                track_ids: vec![0, 2],
            },
            Playlist {
                name: "spotify".to_string(),
                track_ids: vec![1, 3, 4, 5],
            },
        ];

        // Static data; validated by `builtin_catalog_is_consistent`.
        Self::new(tracks, playlists).unwrap_or_else(|e| panic!("builtin catalog is invalid: {e}"))
    }
}
