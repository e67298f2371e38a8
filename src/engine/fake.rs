//! Recording engine used by controller tests.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::catalog::{Track, TrackId};

use super::PlaybackEngine;
use super::types::{EngineEvent, LoadId};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(TrackId),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
}

#[derive(Default)]
pub struct FakeEngine {
    pub calls: Vec<Call>,
    pub last_load: LoadId,
    subscribers: Vec<Sender<EngineEvent>>,
}

impl FakeEngine {
    pub fn emit(&mut self, event: EngineEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, track: &Track) -> LoadId {
        self.last_load = self.last_load.next();
        self.calls.push(Call::Load(track.id));
        self.last_load
    }

    fn play(&mut self) {
        self.calls.push(Call::Play);
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        self.calls.push(Call::Seek(seconds));
    }

    fn set_volume(&mut self, fraction: f32) {
        self.calls.push(Call::SetVolume(fraction));
    }

    fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }
}
