use std::sync::mpsc::Receiver;

use crate::catalog::{Catalog, CatalogError, Track};
use crate::engine::{EngineEvent, LoadId, PlaybackEngine};
use crate::persist::{
    KeyValueStore, PersistedState, StoreError, save_position, save_track_id, save_volume,
};

use super::model::{PlaybackState, PlayerState, pointer_fraction};

/// The player controller.
pub struct Player<E: PlaybackEngine, S: KeyValueStore> {
    catalog: Catalog,
    engine: E,
    store: S,
    events: Receiver<EngineEvent>,

    state: PlayerState,
    /// Source currently loaded in the engine; `None` until the first load.
    active_load: Option<LoadId>,

    elapsed: f64,
    duration: Option<f64>,
    progress: f64,
    volume: f32,
}

fn log_store_result(what: &str, result: Result<(), StoreError>) {
    if let Err(e) = result {
        tracing::warn!("failed to persist {what}: {e}");
    }
}

impl<E: PlaybackEngine, S: KeyValueStore> Player<E, S> {
    /// Create a controller and subscribe to the engine's events.
    pub fn new(catalog: Catalog, mut engine: E, store: S) -> Self {
        let events = engine.subscribe();
        Self {
            catalog,
            engine,
            store,
            events,
            state: PlayerState::default(),
            active_load: None,
            elapsed: 0.0,
            duration: None,
            progress: 0.0,
            volume: 1.0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn playback(&self) -> PlaybackState {
        match (self.active_load, self.state.is_playing) {
            (None, _) => PlaybackState::Stopped,
            (Some(_), true) => PlaybackState::Playing,
            (Some(_), false) => PlaybackState::Paused,
        }
    }

    pub fn current_track(&self) -> &Track {
        &self.catalog.tracks()[self.state.current_index]
    }

    /// Elapsed seconds of the loaded track, as last reported by the engine.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Progress fraction in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Progress on the 0-100 scale used by the progress bar.
    pub fn progress_percent(&self) -> u16 {
        (self.progress() * 100.0).round() as u16
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn volume_percent(&self) -> u16 {
        (self.volume() * 100.0).round() as u16
    }

    /// Load the track at `index` without starting it and remember its id.
    pub fn select_track(&mut self, index: usize) -> Result<(), CatalogError> {
        let track = self.catalog.track_at(index)?;
        let id = track.id;
        let load = self.engine.load(track);
        tracing::debug!(index, id, ?load, "track selected");

        self.active_load = Some(load);
        self.state.current_index = index;
        self.state.is_playing = false;
        self.elapsed = 0.0;
        self.duration = None;
        self.progress = 0.0;

        log_store_result("track id", save_track_id(&mut self.store, id));
        Ok(())
    }

    /// Start or resume playback, loading the first track if nothing was
    /// ever loaded.
    pub fn play(&mut self) {
        if self.active_load.is_none() {
            if let Err(e) = self.select_track(0) {
                tracing::error!("cannot start playback: {e}");
                return;
            }
        }
        self.engine.play();
        self.state.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.engine.pause();
        self.state.is_playing = false;
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    fn select_and_play(&mut self, index: usize) {
        match self.select_track(index) {
            Ok(()) => self.play(),
            Err(e) => tracing::error!("cannot switch track: {e}"),
        }
    }

    /// Advance to the next catalog entry, wrapping from last to first.
    pub fn next(&mut self) {
        let len = self.catalog.len();
        self.select_and_play((self.state.current_index + 1) % len);
    }

    /// Step back one catalog entry, wrapping from first to last.
    pub fn previous(&mut self) {
        let len = self.catalog.len();
        self.select_and_play((self.state.current_index + len - 1) % len);
    }

    /// Record a position report. Persists `current_time` on every call.
    pub fn on_time_update(&mut self, current_time: f64, duration: Option<f64>) {
        let fraction = duration.map_or(f64::NAN, |d| current_time / d);
        self.progress = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.elapsed = current_time;
        self.duration = duration.filter(|d| d.is_finite());

        log_store_result("position", save_position(&mut self.store, current_time));
    }

    pub fn on_ended(&mut self) {
        tracing::debug!(index = self.state.current_index, "track ended");
        self.next();
    }

    /// Drain pending engine events. Events from a source that has since
    /// been replaced are dropped.
    pub fn pump_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if Some(event.load()) != self.active_load {
                tracing::trace!(?event, "dropping event from a previous source");
                continue;
            }
            match event {
                EngineEvent::TimeUpdate {
                    current_time,
                    duration,
                    ..
                } => self.on_time_update(current_time, duration),
                EngineEvent::Ended { .. } => self.on_ended(),
            }
        }
    }

    /// Seek to `fraction` of the track. Does nothing while the length is
    /// unknown.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let Some(duration) = self.duration.filter(|d| *d > 0.0) else {
            return;
        };
        self.engine.seek(fraction.clamp(0.0, 1.0) * duration);
    }

    /// Seek from a pointer position `offset` cells into a control `width`
    /// cells wide.
    pub fn seek_to_pointer(&mut self, offset: u16, width: u16) {
        if let Some(fraction) = pointer_fraction(offset, width) {
            self.seek_to_fraction(fraction);
        }
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta_secs: f64) {
        if self.active_load.is_none() || !delta_secs.is_finite() {
            return;
        }
        let mut target = (self.elapsed + delta_secs).max(0.0);
        if let Some(d) = self.duration {
            target = target.min(d);
        }
        self.engine.seek(target);
    }

    pub fn set_volume(&mut self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }
        let v = fraction.clamp(0.0, 1.0);
        self.volume = v;
        self.engine.set_volume(v);
        log_store_result("volume", save_volume(&mut self.store, v));
    }

    /// Set the volume from the 0-100 slider scale.
    pub fn set_volume_percent(&mut self, percent: u16) {
        self.set_volume(f32::from(percent.min(100)) / 100.0);
    }

    pub fn adjust_volume_percent(&mut self, delta: i16) {
        let target = (i32::from(self.volume_percent()) + i32::from(delta)).clamp(0, 100);
        self.set_volume_percent(target as u16);
    }

    /// Apply what the previous session saved. Invalid or missing fields are
    /// skipped; playback is never started.
    pub fn restore_from_persistence(&mut self) {
        let saved = PersistedState::read(&self.store);
        tracing::debug!(?saved, "restoring player state");

        if let Some(id) = saved.last_track_id {
            match self.catalog.index_of_track(id) {
                Ok(index) => {
                    if self.select_track(index).is_ok() {
                        if let Some(pos) = saved.last_position_secs {
                            self.engine.seek(pos);
                            self.elapsed = pos.max(0.0);
                        }
                    }
                }
                Err(e) => tracing::info!("not restoring saved track: {e}"),
            }
        }

        if let Some(v) = saved.last_volume {
            self.volume = v;
            self.engine.set_volume(v);
        }
    }
}
