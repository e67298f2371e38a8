use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::engine::PlaybackEngine;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::persist::KeyValueStore;
use crate::player::{PlaybackState, Player};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui::{self, Hit, Hitboxes};

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Last-known current index as emitted to MPRIS.
    pub last_mpris_index: Option<usize>,
    /// Last-known playback state as emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
    /// Clickable regions from the most recent frame.
    pub hitboxes: Hitboxes,
}

impl EventLoopState {
    pub fn new<E: PlaybackEngine, S: KeyValueStore>(player: &Player<E, S>) -> Self {
        Self {
            last_mpris_index: Some(player.state().current_index),
            last_mpris_playback: player.playback(),
            hitboxes: Hitboxes::default(),
        }
    }
}

/// Main terminal event loop: drains engine events, draws, and dispatches
/// keyboard, mouse and MPRIS input. Returns `Ok(())` when shutdown is
/// requested.
pub fn run<E, S>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player<E, S>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>>
where
    E: PlaybackEngine,
    S: KeyValueStore,
{
    loop {
        player.pump_events();

        // Auto-advance and media keys change playback outside of this loop's
        // input handling, so compare against what MPRIS last saw.
        let index = Some(player.state().current_index);
        if index != state.last_mpris_index || player.playback() != state.last_mpris_playback {
            update_mpris(mpris, player);
            state.last_mpris_index = index;
            state.last_mpris_playback = player.playback();
        }

        terminal.draw(|f| {
            state.hitboxes = ui::draw(f, app, player, &settings.ui, &settings.controls);
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, player) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, settings, app, player) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, &state.hitboxes, app, player),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Apply a command from MPRIS. Returns true when the app should quit.
pub(crate) fn handle_control_cmd<E: PlaybackEngine, S: KeyValueStore>(
    cmd: ControlCmd,
    player: &mut Player<E, S>,
) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => player.play(),
        // There is no stopped state to go back to once a track is loaded.
        ControlCmd::Pause | ControlCmd::Stop => player.pause(),
        ControlCmd::PlayPause => player.toggle_play_pause(),
        ControlCmd::Next => player.next(),
        ControlCmd::Prev => player.previous(),
    }
    false
}

/// Returns true when the app should quit.
pub(crate) fn handle_key_event<E: PlaybackEngine, S: KeyValueStore>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player<E, S>,
) -> bool {
    let step = i16::try_from(settings.controls.volume_step).unwrap_or(i16::MAX);
    let scrub = settings.controls.scrub_seconds as f64;

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('p') | KeyCode::Char(' ') => player.toggle_play_pause(),
        KeyCode::Char('l') => player.next(),
        KeyCode::Char('h') => player.previous(),
        KeyCode::Char('L') => player.seek_by(scrub),
        KeyCode::Char('H') => player.seek_by(-scrub),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Tab => app.focus_next_playlist(),
        KeyCode::BackTab => app.focus_prev_playlist(),
        KeyCode::Char('+') | KeyCode::Char('=') => player.adjust_volume_percent(step),
        KeyCode::Char('-') => player.adjust_volume_percent(-step),
        KeyCode::Char('K') => app.toggle_details_window(),
        KeyCode::Enter => {
            if let Err(e) = app.activate_selected(player) {
                tracing::warn!("cannot play selected item: {e}");
            }
        }
        _ => {}
    }
    false
}

pub(crate) fn handle_mouse_event<E: PlaybackEngine, S: KeyValueStore>(
    mouse: MouseEvent,
    hitboxes: &Hitboxes,
    app: &mut App,
    player: &mut Player<E, S>,
) {
    let dragging = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => false,
        MouseEventKind::Drag(MouseButton::Left) => true,
        _ => return,
    };

    match hitboxes.hit(mouse.column, mouse.row) {
        Some(Hit::Progress { offset, width }) => player.seek_to_pointer(offset, width),
        Some(Hit::Volume { percent }) => player.set_volume_percent(percent),
        Some(Hit::Playlist { playlist, row }) if !dragging => {
            if app.select(playlist, row) {
                if let Err(e) = app.activate_selected(player) {
                    tracing::warn!("cannot play clicked item: {e}");
                }
            }
        }
        _ => {}
    }
}
