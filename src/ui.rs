//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. Every
//! frame is a pure projection of the `App` view model and the `Player`
//! state; `draw` reports where the clickable controls ended up.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::engine::PlaybackEngine;
use crate::persist::KeyValueStore;
use crate::player::{PlaybackState, Player, pointer_fraction};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("tab".to_string(), "switch playlist".to_string());
    map.insert("enter".to_string(), "play selected song".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L and +/- are filled dynamically from config.
    map.insert("K".to_string(), "details".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating configured step sizes.
fn controls_text(controls: &ControlsSettings) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "tab", "enter", "space/p", "h/l", "H/L", "+/-", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!("[+/-] volume -/+{}%", controls.volume_step)),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `m:ss`. Non-finite or negative input renders as `0:00`.
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(elapsed: f64, total: Option<f64>, ui: &UiSettings) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_time(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_time(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    parts.push(format!("-{}", format_time(t - elapsed)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Play/pause affordance: shows the action the toggle will perform.
fn play_pause_icon(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "⏸",
        PlaybackState::Paused | PlaybackState::Stopped => "▶",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Screen area of one rendered playlist, for mouse hit testing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListHitbox {
    pub area: Rect,
    /// First visible row after scrolling.
    pub offset: usize,
}

/// Where the clickable controls were drawn in the last frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Hitboxes {
    pub progress: Rect,
    pub volume: Rect,
    pub playlists: Vec<ListHitbox>,
}

/// What a mouse click at a screen cell landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Seek bar: pointer offset into a control `width` cells wide.
    Progress { offset: u16, width: u16 },
    /// Volume bar, already converted to the 0-100 scale.
    Volume { percent: u16 },
    Playlist { playlist: usize, row: usize },
}

impl Hitboxes {
    pub fn hit(&self, column: u16, row: u16) -> Option<Hit> {
        let pos = Position::new(column, row);
        if self.progress.contains(pos) {
            return Some(Hit::Progress {
                offset: column - self.progress.x,
                width: self.progress.width,
            });
        }
        if self.volume.contains(pos) {
            let fraction = pointer_fraction(column - self.volume.x, self.volume.width)?;
            let percent = (fraction * 100.0).round() as u16;
            return Some(Hit::Volume { percent });
        }
        self.playlists
            .iter()
            .enumerate()
            .find(|(_, h)| h.area.contains(pos))
            .map(|(playlist, h)| Hit::Playlist {
                playlist,
                row: h.offset + usize::from(row - h.area.y),
            })
    }
}

fn padded_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame` using `app` and `player`
/// state and settings.
pub fn draw<E, S>(
    frame: &mut Frame,
    app: &App,
    player: &Player<E, S>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> Hitboxes
where
    E: PlaybackEngine,
    S: KeyValueStore,
{
    let mut hitboxes = Hitboxes::default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let playback = player.playback();
    let track = player.current_track();
    let state_text = match playback {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    };
    let time = now_playing_time_text(player.elapsed(), player.duration(), ui_settings);
    let now_playing = vec![
        Line::from(format!("{}  {}", play_pause_icon(playback), track.title)).bold(),
        Line::from(track.artist.clone()),
        Line::from(format!("art: {}", track.artwork.display())).dim(),
        Line::from(match time {
            Some(t) => format!("{state_text} [{t}]"),
            None => state_text.to_string(),
        }),
    ];
    let now_playing_par = Paragraph::new(now_playing)
        .block(padded_block(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing_par, chunks[1]);

    // Seek bar
    let progress_block = Block::default().borders(Borders::ALL).title(" progress ");
    hitboxes.progress = progress_block.inner(chunks[2]);
    let progress = Gauge::default()
        .block(progress_block)
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .percent(player.progress_percent().min(100))
        .label(format!(
            "{} / {}",
            format_time(player.elapsed()),
            player.duration().map_or_else(|| "-:--".to_string(), format_time)
        ));
    frame.render_widget(progress, chunks[2]);

    // Playlists, side by side
    let count = app.playlists.len().max(1) as u32;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..count).map(|_| Constraint::Ratio(1, count)))
        .split(chunks[3]);

    let current_index = player.state().current_index;
    for (pi, (view, area)) in app.playlists.iter().zip(columns.iter()).enumerate() {
        let focused = pi == app.focused;
        let items: Vec<ListItem> = view
            .items
            .iter()
            .map(|item| {
                let marker = if playback != PlaybackState::Stopped
                    && item.catalog_index == current_index
                {
                    "♪ "
                } else {
                    "  "
                };
                ListItem::new(format!("{marker}{} - {}", item.title, item.artist))
            })
            .collect();

        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", view.name));
        if focused {
            block = block.border_style(Style::default().add_modifier(Modifier::BOLD));
        }
        let inner = block.inner(*area);

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if focused && !view.items.is_empty() {
            state.select(Some(app.cursor(pi)));
        }
        frame.render_stateful_widget(list, *area, &mut state);

        hitboxes.playlists.push(ListHitbox {
            area: inner,
            offset: state.offset(),
        });
    }

    // Overlay details popup (keeps the lists visible under it)
    if app.details_window {
        let popup_area = centered_rect_sized(72, 9, chunks[3]);
        frame.render_widget(Clear, popup_area);

        let details = match app.selected_item() {
            Some(item) => {
                let audio = player
                    .catalog()
                    .track_at(item.catalog_index)
                    .map(|t| t.audio.display().to_string())
                    .unwrap_or_default();
                format!(
                    "Id: {}\nTitle: {}\nArtist: {}\nAudio: {}\nArtwork: {}",
                    item.track_id,
                    item.title,
                    item.artist,
                    audio,
                    item.artwork.display()
                )
            }
            None => "No track selected".to_string(),
        };
        let details_par = Paragraph::new(details)
            .block(padded_block(" details (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(details_par, popup_area);
    }

    // Volume
    let volume_block = Block::default().borders(Borders::ALL).title(" volume ");
    hitboxes.volume = volume_block.inner(chunks[4]);
    let volume = Gauge::default()
        .block(volume_block)
        .percent(player.volume_percent().min(100))
        .label(format!("{}%", player.volume_percent()));
    frame.render_widget(volume, chunks[4]);

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);

    hitboxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::engine::fake::FakeEngine;
    use crate::persist::MemoryStore;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn format_time_pads_seconds_only() {
        assert_eq!(format_time(125.7), "2:05");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-4.0), "0:00");
    }

    #[test]
    fn time_text_follows_configured_fields() {
        let mut ui = UiSettings::default();
        assert_eq!(
            now_playing_time_text(65.0, Some(200.0), &ui).as_deref(),
            Some("1:05 / 3:20")
        );
        assert_eq!(now_playing_time_text(65.0, None, &ui).as_deref(), Some("1:05"));

        ui.now_playing_time_fields = vec![TimeField::Remaining];
        assert_eq!(
            now_playing_time_text(65.0, Some(200.0), &ui).as_deref(),
            Some("-2:15")
        );
        assert_eq!(now_playing_time_text(65.0, None, &ui), None);
    }

    #[test]
    fn icon_reflects_toggle_action() {
        assert_eq!(play_pause_icon(PlaybackState::Playing), "⏸");
        assert_eq!(play_pause_icon(PlaybackState::Paused), "▶");
        assert_eq!(play_pause_icon(PlaybackState::Stopped), "▶");
    }

    #[test]
    fn hit_maps_cells_to_controls() {
        let hb = Hitboxes {
            progress: Rect::new(1, 10, 40, 1),
            volume: Rect::new(1, 20, 101, 1),
            playlists: vec![
                ListHitbox {
                    area: Rect::new(1, 14, 20, 4),
                    offset: 0,
                },
                ListHitbox {
                    area: Rect::new(22, 14, 20, 4),
                    offset: 2,
                },
            ],
        };
        assert_eq!(
            hb.hit(31, 10),
            Some(Hit::Progress {
                offset: 30,
                width: 40
            })
        );
        assert_eq!(hb.hit(51, 20), Some(Hit::Volume { percent: 50 }));
        assert_eq!(hb.hit(101, 20), Some(Hit::Volume { percent: 100 }));
        assert_eq!(
            hb.hit(25, 15),
            Some(Hit::Playlist {
                playlist: 1,
                row: 3
            })
        );
        assert_eq!(hb.hit(0, 0), None);
    }

    #[test]
    fn both_bars_reach_their_end_on_the_last_cell() {
        let hb = Hitboxes {
            progress: Rect::new(0, 0, 21, 1),
            volume: Rect::new(0, 1, 21, 1),
            playlists: Vec::new(),
        };
        let Some(Hit::Progress { offset, width }) = hb.hit(20, 0) else {
            panic!("expected a progress hit");
        };
        assert_eq!(pointer_fraction(offset, width), Some(1.0));
        assert_eq!(hb.hit(20, 1), Some(Hit::Volume { percent: 100 }));
        assert_eq!(hb.hit(10, 1), Some(Hit::Volume { percent: 50 }));
    }

    #[test]
    fn draw_shows_selected_track_and_playlists() {
        let catalog = Catalog::builtin();
        let app = App::new(&catalog);
        let mut player = Player::new(catalog, FakeEngine::default(), MemoryStore::new());
        player.select_track(3).unwrap();
        player.on_time_update(125.7, Some(300.0));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let mut hitboxes = Hitboxes::default();
        terminal
            .draw(|f| {
                hitboxes = draw(
                    f,
                    &app,
                    &player,
                    &UiSettings::default(),
                    &ControlsSettings::default(),
                )
            })
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("The Wanderer"));
        assert!(screen.contains("Bonobo"));
        assert!(screen.contains("art4.png"));
        assert!(screen.contains("2:05 / 5:00"));
        assert!(screen.contains(" focus "));
        assert!(screen.contains(" spotify "));

        assert_eq!(hitboxes.playlists.len(), 2);
        assert!(hitboxes.progress.width > 0);
        assert!(hitboxes.volume.width > 0);
    }
}
