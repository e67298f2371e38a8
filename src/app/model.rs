//! Application model: playlist views and the browsing cursor.

use crate::catalog::{Catalog, CatalogError};
use crate::engine::PlaybackEngine;
use crate::persist::KeyValueStore;
use crate::player::Player;

use super::playlists::{PlaylistItem, PlaylistView, build_playlist_views};

/// The main application model.
pub struct App {
    pub playlists: Vec<PlaylistView>,
    /// Index of the playlist pane that has keyboard focus.
    pub focused: usize,
    /// Cursor row per playlist.
    cursors: Vec<usize>,
    pub details_window: bool,
}

impl App {
    /// Create a new `App`, rendering every playlist of `catalog` once.
    pub fn new(catalog: &Catalog) -> Self {
        let playlists = build_playlist_views(catalog);
        let cursors = vec![0; playlists.len()];
        Self {
            playlists,
            focused: 0,
            cursors,
            details_window: false,
        }
    }

    pub fn toggle_details_window(&mut self) {
        self.details_window = !self.details_window;
    }

    /// Cursor row of playlist `playlist`.
    pub fn cursor(&self, playlist: usize) -> usize {
        self.cursors.get(playlist).copied().unwrap_or(0)
    }

    /// The item under the cursor in the focused playlist.
    pub fn selected_item(&self) -> Option<&PlaylistItem> {
        self.playlists
            .get(self.focused)
            .and_then(|p| p.items.get(self.cursor(self.focused)))
    }

    /// Move focus to the next playlist pane, wrapping around.
    pub fn focus_next_playlist(&mut self) {
        if !self.playlists.is_empty() {
            self.focused = (self.focused + 1) % self.playlists.len();
        }
    }

    /// Move focus to the previous playlist pane, wrapping around.
    pub fn focus_prev_playlist(&mut self) {
        if !self.playlists.is_empty() {
            let len = self.playlists.len();
            self.focused = (self.focused + len - 1) % len;
        }
    }

    /// Move the cursor down in the focused playlist. Wraps to the top.
    pub fn next(&mut self) {
        let len = self.focused_len();
        if len > 0 {
            self.cursors[self.focused] = (self.cursors[self.focused] + 1) % len;
        }
    }

    /// Move the cursor up in the focused playlist. Wraps to the bottom.
    pub fn prev(&mut self) {
        let len = self.focused_len();
        if len > 0 {
            self.cursors[self.focused] = (self.cursors[self.focused] + len - 1) % len;
        }
    }

    /// Focus `playlist` and put its cursor on `row`. Returns false when the
    /// position does not exist.
    pub fn select(&mut self, playlist: usize, row: usize) -> bool {
        match self.playlists.get(playlist) {
            Some(p) if row < p.items.len() => {
                self.focused = playlist;
                self.cursors[playlist] = row;
                true
            }
            _ => false,
        }
    }

    /// Play the item under the cursor: select its track, then start it.
    pub fn activate_selected<E, S>(&self, player: &mut Player<E, S>) -> Result<(), CatalogError>
    where
        E: PlaybackEngine,
        S: KeyValueStore,
    {
        let Some(item) = self.selected_item() else {
            return Ok(());
        };
        player.select_track(item.catalog_index)?;
        player.play();
        Ok(())
    }

    fn focused_len(&self) -> usize {
        self.playlists
            .get(self.focused)
            .map_or(0, |p| p.items.len())
    }
}
