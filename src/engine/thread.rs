use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::source::{open_paused_sink, probe_duration};
use super::types::{EngineCmd, EngineEvent, LoadId};

const TICK: Duration = Duration::from_millis(250);

/// Everything the audio thread knows about the active source.
struct Deck {
    // Keeps the device open; sinks are attached to `mixer`.
    _stream: Option<OutputStream>,
    mixer: Option<Mixer>,
    subscribers: Vec<Sender<EngineEvent>>,

    load: LoadId,
    path: Option<PathBuf>,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: f32,
    playing: bool,

    // Position = `base` plus time since `started_at` while playing.
    base: Duration,
    started_at: Option<Instant>,
}

impl Deck {
    fn new(stream: Option<OutputStream>) -> Self {
        let mixer = stream.as_ref().map(|s| s.mixer().clone());
        Self {
            _stream: stream,
            mixer,
            subscribers: Vec::new(),
            load: LoadId::default(),
            path: None,
            sink: None,
            duration: None,
            volume: 1.0,
            playing: false,
            base: Duration::ZERO,
            started_at: None,
        }
    }

    fn emit(&mut self, event: EngineEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn position(&self) -> Duration {
        let pos = self.base + self.started_at.map_or(Duration::ZERO, |st| st.elapsed());
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn emit_time_update(&mut self) {
        let event = EngineEvent::TimeUpdate {
            load: self.load,
            current_time: self.position().as_secs_f64(),
            duration: self.duration.map(|d| d.as_secs_f64()),
        };
        self.emit(event);
    }

    /// Replace the current sink with a fresh paused one at `start_at`.
    /// Returns the decoder-reported length on success.
    fn rebuild_sink(&mut self, start_at: Duration) -> Option<Option<Duration>> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let (Some(mixer), Some(path)) = (self.mixer.as_ref(), self.path.as_ref()) else {
            return None;
        };
        match open_paused_sink(mixer, path, start_at, self.volume) {
            Ok((sink, total)) => {
                self.sink = Some(sink);
                Some(total)
            }
            Err(e) => {
                tracing::warn!("playback source unavailable: {e}");
                None
            }
        }
    }

    fn load(&mut self, load: LoadId, path: PathBuf) {
        self.load = load;
        self.path = Some(path);
        self.playing = false;
        self.base = Duration::ZERO;
        self.started_at = None;
        self.duration = self.path.as_deref().and_then(probe_duration);

        match self.rebuild_sink(Duration::ZERO) {
            Some(total) => {
                if self.duration.is_none() {
                    self.duration = total;
                }
                tracing::debug!(?load, duration = ?self.duration, "source loaded");
                self.emit_time_update();
            }
            None => tracing::debug!(?load, "source loaded without a playable sink"),
        }
    }

    fn play(&mut self) {
        if self.playing {
            return;
        }
        let Some(sink) = self.sink.as_ref() else {
            tracing::warn!(load = ?self.load, "play requested with no playable source");
            return;
        };
        sink.play();
        self.playing = true;
        self.started_at = Some(Instant::now());
    }

    fn pause(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        self.base = self.position();
        self.started_at = None;
        self.playing = false;
    }

    fn seek(&mut self, target: Duration) {
        if self.sink.is_none() {
            return;
        }
        let target = match self.duration {
            Some(d) => target.min(d),
            None => target,
        };

        if self.rebuild_sink(target).is_none() {
            self.playing = false;
            self.started_at = None;
            return;
        }
        self.base = target;
        if self.playing {
            if let Some(sink) = self.sink.as_ref() {
                sink.play();
            }
            self.started_at = Some(Instant::now());
        }
        self.emit_time_update();
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume);
        }
    }

    /// Periodic work: report progress and detect the end of the source.
    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let finished = self.sink.as_ref().is_some_and(|s| s.empty());
        if finished {
            self.base = self.duration.unwrap_or_else(|| self.position());
            self.started_at = None;
            self.playing = false;
            self.emit_time_update();
            let load = self.load;
            self.emit(EngineEvent::Ended { load });
        } else {
            self.emit_time_update();
        }
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if self.playing && fade_out_ms > 0 {
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                sink.set_volume(self.volume * (1.0 - t));
                thread::sleep(Duration::from_millis(step_ms));
            }
        }
        sink.stop();
    }

    /// Apply one command. Returns false once the thread should exit.
    fn handle(&mut self, cmd: EngineCmd) -> bool {
        match cmd {
            EngineCmd::Load { load, path } => self.load(load, path),
            EngineCmd::Play => self.play(),
            EngineCmd::Pause => self.pause(),
            EngineCmd::Seek(target) => self.seek(target),
            EngineCmd::SetVolume(v) => self.set_volume(v),
            EngineCmd::Subscribe(tx) => self.subscribers.push(tx),
            EngineCmd::Quit { fade_out_ms } => {
                self.fade_out(fade_out_ms);
                return false;
            }
        }
        true
    }
}

/// Serve commands until quit or disconnect, ticking every `TICK` no matter
/// how busy the command channel is.
fn run_deck(deck: &mut Deck, rx: &Receiver<EngineCmd>) {
    let mut next_tick = Instant::now() + TICK;
    loop {
        match rx.recv_timeout(next_tick.saturating_duration_since(Instant::now())) {
            Ok(cmd) => {
                if !deck.handle(cmd) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        if now >= next_tick {
            deck.tick();
            next_tick = now + TICK;
        }
    }
}

pub(super) fn spawn_engine_thread(rx: Receiver<EngineCmd>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut s) => {
                // rodio logs to stderr when the stream is dropped, which
                // would scribble over the terminal UI.
                s.log_on_drop(false);
                Some(s)
            }
            Err(e) => {
                tracing::error!("no audio output device, playback disabled: {e}");
                None
            }
        };

        let mut deck = Deck::new(stream);
        run_deck(&mut deck, &rx);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::source::SineWave;
    use std::path::Path;
    use std::sync::mpsc;

    fn deck_with_subscriber() -> (Deck, Receiver<EngineEvent>) {
        let mut deck = Deck::new(None);
        let (tx, rx) = mpsc::channel();
        deck.subscribers.push(tx);
        (deck, rx)
    }

    /// A sink with no device behind it. It only reports empty once its
    /// queue has nothing left.
    fn detached_sink(endless: bool) -> Sink {
        let (sink, _queue) = Sink::new();
        if endless {
            sink.append(SineWave::new(440.0));
        }
        sink
    }

    /// 16-bit mono PCM silence at 8 kHz.
    fn write_silent_wav(path: &Path, secs: u32) {
        let rate: u32 = 8000;
        let data_len = rate * secs * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&rate.to_le_bytes());
        bytes.extend_from_slice(&(rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn position_holds_while_paused_and_clamps_to_duration() {
        let mut deck = Deck::new(None);
        deck.base = Duration::from_secs(30);
        assert_eq!(deck.position(), Duration::from_secs(30));
        deck.duration = Some(Duration::from_secs(20));
        assert_eq!(deck.position(), Duration::from_secs(20));
    }

    #[test]
    fn load_without_output_resets_and_stays_quiet() {
        let (mut deck, rx) = deck_with_subscriber();
        deck.base = Duration::from_secs(9);
        deck.playing = true;

        let load = LoadId::default().next();
        deck.load(load, PathBuf::from("/nonexistent/track.mp3"));
        assert_eq!(deck.load, load);
        assert!(!deck.playing);
        assert_eq!(deck.position(), Duration::ZERO);
        assert!(deck.sink.is_none());
        assert!(rx.try_recv().is_err());

        // Nothing to play or seek.
        deck.play();
        deck.seek(Duration::from_secs(5));
        assert!(!deck.playing);
        assert_eq!(deck.base, Duration::ZERO);
    }

    #[test]
    fn time_update_reports_current_load() {
        let (mut deck, rx) = deck_with_subscriber();
        deck.load = LoadId::default().next().next();
        deck.base = Duration::from_millis(1500);
        deck.duration = Some(Duration::from_secs(3));
        deck.emit_time_update();
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::TimeUpdate {
                load: deck.load,
                current_time: 1.5,
                duration: Some(3.0),
            }
        );
    }

    #[test]
    fn finished_source_reports_end_once() {
        let (mut deck, rx) = deck_with_subscriber();
        let load = LoadId::default().next();
        deck.load = load;
        deck.sink = Some(detached_sink(false));
        deck.duration = Some(Duration::from_secs(3));
        deck.playing = true;
        deck.started_at = Some(Instant::now());

        deck.tick();
        let events: Vec<EngineEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                EngineEvent::TimeUpdate {
                    load,
                    current_time: 3.0,
                    duration: Some(3.0),
                },
                EngineEvent::Ended { load },
            ]
        );
        assert!(!deck.playing);

        deck.tick();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn pause_freezes_position() {
        let mut deck = Deck::new(None);
        deck.sink = Some(detached_sink(true));
        deck.playing = true;
        deck.base = Duration::from_secs(4);
        deck.started_at = Instant::now().checked_sub(Duration::from_secs(2));

        deck.pause();
        let held = deck.position();
        assert!(held >= Duration::from_secs(6));
        assert!(!deck.playing);
        assert!(deck.sink.as_ref().unwrap().is_paused());

        thread::sleep(Duration::from_millis(20));
        assert_eq!(deck.position(), held);
    }

    #[test]
    fn seek_past_the_end_clamps_and_reports_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_silent_wav(&path, 2);

        let (mixer, _output) = rodio::mixer::mixer(1, 8000);
        let (tx, rx) = mpsc::channel();
        let mut deck = Deck {
            mixer: Some(mixer),
            ..Deck::new(None)
        };
        deck.subscribers.push(tx);

        let load = LoadId::default().next();
        deck.load(load, path);
        let total = match rx.try_recv().unwrap() {
            EngineEvent::TimeUpdate {
                current_time,
                duration: Some(total),
                ..
            } => {
                assert_eq!(current_time, 0.0);
                total
            }
            other => panic!("unexpected event after load: {other:?}"),
        };
        assert!((total - 2.0).abs() < 0.05, "duration {total}");

        deck.seek(Duration::from_secs(10));
        assert_eq!(Some(deck.position()), deck.duration);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![EngineEvent::TimeUpdate {
                load,
                current_time: total,
                duration: Some(total),
            }]
        );
    }

    #[test]
    fn ticks_keep_coming_while_commands_stream_in() {
        let (mut deck, events) = deck_with_subscriber();
        deck.sink = Some(detached_sink(true));
        deck.playing = true;
        deck.started_at = Some(Instant::now());

        // A volume drag: one command every 50 ms for 800 ms.
        let (tx, rx) = mpsc::channel();
        let sender = thread::spawn(move || {
            for _ in 0..16 {
                if tx.send(EngineCmd::SetVolume(0.5)).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(50));
            }
        });

        run_deck(&mut deck, &rx);
        sender.join().unwrap();

        let updates = events
            .try_iter()
            .filter(|e| matches!(e, EngineEvent::TimeUpdate { .. }))
            .count();
        assert!(updates >= 2, "only {updates} time updates during the drag");
        assert_eq!(deck.volume, 0.5);
    }

    #[test]
    fn quit_command_stops_the_loop() {
        let mut deck = Deck::new(None);
        let (tx, rx) = mpsc::channel();
        tx.send(EngineCmd::Quit { fade_out_ms: 0 }).unwrap();
        run_deck(&mut deck, &rx);
        // The sender is still alive; returning means Quit was honoured.
        drop(tx);
    }

    #[test]
    fn closed_subscribers_are_dropped() {
        let (mut deck, rx) = deck_with_subscriber();
        drop(rx);
        deck.emit(EngineEvent::Ended {
            load: LoadId::default(),
        });
        assert!(deck.subscribers.is_empty());
    }

    #[test]
    fn volume_is_clamped() {
        let mut deck = Deck::new(None);
        deck.set_volume(1.7);
        assert_eq!(deck.volume, 1.0);
        deck.set_volume(-0.2);
        assert_eq!(deck.volume, 0.0);
    }
}
