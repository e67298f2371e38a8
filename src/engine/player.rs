use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::catalog::Track;

use super::PlaybackEngine;
use super::thread::spawn_engine_thread;
use super::types::{EngineCmd, EngineEvent, LoadId};

/// `rodio`-backed engine. All audio work happens on a dedicated thread;
/// this handle only sends commands to it.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    last_load: LoadId,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let join = spawn_engine_thread(rx);
        Self {
            tx,
            last_load: LoadId::default(),
            join: Some(join),
        }
    }

    fn send(&self, cmd: EngineCmd) {
        if self.tx.send(cmd).is_err() {
            tracing::warn!("audio thread is gone; command dropped");
        }
    }

    /// Fade out, stop the audio thread and wait for it to exit.
    pub fn shutdown(&mut self, fade_out: Duration) {
        self.send(EngineCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        if let Some(h) = self.join.take() {
            if h.join().is_err() {
                tracing::error!("audio thread panicked");
            }
        }
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, track: &Track) -> LoadId {
        self.last_load = self.last_load.next();
        self.send(EngineCmd::Load {
            load: self.last_load,
            path: track.audio.clone(),
        });
        self.last_load
    }

    fn play(&mut self) {
        self.send(EngineCmd::Play);
    }

    fn pause(&mut self) {
        self.send(EngineCmd::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        self.send(EngineCmd::Seek(Duration::from_secs_f64(seconds.max(0.0))));
    }

    fn set_volume(&mut self, fraction: f32) {
        self.send(EngineCmd::SetVolume(fraction));
    }

    fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = mpsc::channel();
        self.send(EngineCmd::Subscribe(tx));
        rx
    }
}
