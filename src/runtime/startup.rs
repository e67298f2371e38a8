use std::env;
use std::path::PathBuf;

use crate::catalog::{Catalog, CatalogError};
use crate::config;
use crate::persist::{FileStore, KeyValueStore, MemoryStore};

/// Load the configured catalog, or the built-in one. Any inconsistency in
/// the catalog is returned so startup fails before the UI comes up.
pub fn load_catalog(settings: &config::Settings) -> Result<Catalog, CatalogError> {
    if let Some(path) = &settings.catalog.path {
        let catalog = Catalog::load(path)?;
        tracing::info!(path = %path.display(), tracks = catalog.len(), "catalog loaded");
        return Ok(catalog);
    }

    Ok(Catalog::builtin().with_media_root(&media_root(settings)))
}

/// Base directory for the built-in catalog's relative media paths.
fn media_root(settings: &config::Settings) -> PathBuf {
    if let Some(root) = &settings.catalog.media_root {
        return root.clone();
    }
    env::current_dir().unwrap_or_else(|e| {
        tracing::warn!("cannot determine working directory, using \".\": {e}");
        PathBuf::from(".")
    })
}

/// Open the persistent state store; falls back to memory when no state
/// directory can be determined.
pub fn open_store(settings: &config::Settings) -> Box<dyn KeyValueStore> {
    match settings.state_path() {
        Some(path) => {
            let store = FileStore::open(path);
            tracing::info!(path = %store.path().display(), "playback state file");
            Box::new(store)
        }
        None => {
            tracing::warn!("no state directory available; playback state will not be remembered");
            Box::new(MemoryStore::new())
        }
    }
}
