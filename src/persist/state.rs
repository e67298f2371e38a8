use crate::catalog::TrackId;

use super::store::{KeyValueStore, StoreError};

pub const KEY_CURRENT_SONG: &str = "currentSong";
pub const KEY_CURRENT_TIME: &str = "currentTime";
pub const KEY_VOLUME: &str = "volume";

/// Snapshot of what the previous session left behind.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PersistedState {
    pub last_track_id: Option<TrackId>,
    pub last_position_secs: Option<f64>,
    pub last_volume: Option<f32>,
}

impl PersistedState {
    /// Read all three fields. Each one is parsed on its own; missing,
    /// malformed, non-finite or out-of-range values come back as `None`.
    pub fn read(store: &impl KeyValueStore) -> Self {
        Self {
            last_track_id: store
                .get(KEY_CURRENT_SONG)
                .and_then(|v| parse_track_id(&v)),
            last_position_secs: store
                .get(KEY_CURRENT_TIME)
                .and_then(|v| parse_position(&v)),
            last_volume: store.get(KEY_VOLUME).and_then(|v| parse_volume(&v)),
        }
    }
}

fn parse_track_id(raw: &str) -> Option<TrackId> {
    serde_json::from_str::<Option<TrackId>>(raw).ok().flatten()
}

fn parse_position(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|s| s.is_finite())
}

fn parse_volume(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
}

pub fn save_track_id(store: &mut impl KeyValueStore, id: TrackId) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(&id)?;
    store.set(KEY_CURRENT_SONG, &encoded)
}

pub fn save_position(store: &mut impl KeyValueStore, secs: f64) -> Result<(), StoreError> {
    store.set(KEY_CURRENT_TIME, &secs.to_string())
}

pub fn save_volume(store: &mut impl KeyValueStore, volume: f32) -> Result<(), StoreError> {
    store.set(KEY_VOLUME, &volume.to_string())
}
