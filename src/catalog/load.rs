use std::path::Path;

use serde::Deserialize;

use super::model::{Catalog, CatalogError, Playlist, Track};

/// On-disk catalog layout.
///
/// ```toml
/// [[tracks]]
/// id = 0
/// title = "Forest Lullaby"
/// artist = "Lesfm"
/// audio = "audio/song1.mp3"
/// artwork = "images/art1.png"
///
/// [[playlists]]
/// name = "focus"
/// tracks = [0, 2]
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    tracks: Vec<Track>,
    #[serde(default)]
    playlists: Vec<Playlist>,
}

impl Catalog {
    /// Parse and validate a catalog from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::new(file.tracks, file.playlists)
    }

    /// Load a catalog file. Relative media paths are resolved against the
    /// directory containing the file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&text)?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(catalog.with_media_root(root))
    }
}
