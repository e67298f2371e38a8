use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::engine::RodioEngine;
use crate::mpris::ControlCmd;
use crate::player::Player;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_problem) = settings::load_settings();
    logging::init(&settings);
    if let Some(problem) = settings_problem {
        tracing::warn!("{problem}");
    }

    let catalog = startup::load_catalog(&settings)?;
    let store = startup::open_store(&settings);

    let mut player = Player::new(catalog, RodioEngine::spawn(), store);
    player.restore_from_persistence();
    let mut app = App::new(player.catalog());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &player);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new(&player);
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut player,
        &mpris,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player
        .engine_mut()
        .shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
    tracing::info!("exiting");

    run_result
}
