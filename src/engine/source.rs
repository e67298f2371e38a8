//! Opening and decoding track files into paused `rodio` sinks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

#[derive(Debug, thiserror::Error)]
pub(super) enum SourceError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        source: rodio::decoder::DecoderError,
    },
}

/// Read the track length from the file's tags/properties.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|f| f.properties().duration())
        .filter(|d| !d.is_zero())
}

/// Create a paused `Sink` for the file at `path` that starts at `start_at`.
///
/// Also returns the decoder's own idea of the total length, which is used
/// when the tags carry none.
pub(super) fn open_paused_sink(
    mixer: &Mixer,
    path: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| SourceError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(mixer);
    sink.set_volume(volume);
    // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
    sink.append(decoder.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}
