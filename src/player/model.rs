//! Player state types.

/// Coarse playback state, as shown in the UI and over MPRIS.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing has been loaded yet.
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Transient controller state. Never persisted as-is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerState {
    /// Position in the catalog (not a track id). Always valid.
    pub current_index: usize,
    pub is_playing: bool,
}

/// Map a pointer `offset` cells into a control `width` cells wide onto
/// `[0, 1]`. The first cell is 0 and the last is 1. `None` for an empty
/// control.
pub fn pointer_fraction(offset: u16, width: u16) -> Option<f64> {
    if width == 0 {
        return None;
    }
    let span = f64::from(width.saturating_sub(1).max(1));
    Some((f64::from(offset) / span).min(1.0))
}
