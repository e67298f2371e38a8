//! Small types shared between the engine handle and its audio thread.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Identifies one `load` call. Increases with every load.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadId(u64);

impl LoadId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Notifications emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Periodic position report while playing, and once after a load or seek.
    TimeUpdate {
        load: LoadId,
        current_time: f64,
        /// `None` until the source's length is known.
        duration: Option<f64>,
    },
    /// The source played to its end.
    Ended { load: LoadId },
}

impl EngineEvent {
    pub fn load(&self) -> LoadId {
        match self {
            Self::TimeUpdate { load, .. } | Self::Ended { load } => *load,
        }
    }
}

#[derive(Debug)]
pub(super) enum EngineCmd {
    Load { load: LoadId, path: PathBuf },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Subscribe(Sender<EngineEvent>),
    /// Stop the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
