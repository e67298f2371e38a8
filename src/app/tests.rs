use super::*;
use crate::catalog::{Catalog, Playlist, Track};
use crate::engine::fake::{Call, FakeEngine};
use crate::persist::{KEY_CURRENT_SONG, KeyValueStore, MemoryStore};
use crate::player::{PlaybackState, Player};
use std::path::PathBuf;

fn t(id: u32, title: &str) -> Track {
    Track {
        id,
        title: title.into(),
        artist: format!("{title} band"),
        audio: PathBuf::from(format!("{id}.mp3")),
        artwork: PathBuf::from(format!("{id}.png")),
    }
}

#[test]
fn views_follow_playlist_order_and_resolve_catalog_indices() {
    let catalog = Catalog::new(
        vec![t(7, "Seven"), t(3, "Three"), t(5, "Five")],
        vec![
            Playlist {
                name: "mix".into(),
                track_ids: vec![5, 7, 5],
            },
            Playlist {
                name: "empty".into(),
                track_ids: vec![],
            },
        ],
    )
    .unwrap();

    let views = build_playlist_views(&catalog);
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].name, "mix");
    let indices: Vec<usize> = views[0].items.iter().map(|i| i.catalog_index).collect();
    assert_eq!(indices, vec![2, 0, 2]);
    assert_eq!(views[0].items[1].title, "Seven");
    assert_eq!(views[0].items[1].artist, "Seven band");
    assert_eq!(views[0].items[1].artwork, PathBuf::from("7.png"));
    assert!(views[1].items.is_empty());
}

#[test]
fn cursor_wraps_within_focused_playlist() {
    let app_catalog = Catalog::builtin();
    let mut app = App::new(&app_catalog);
    assert_eq!(app.selected_item().unwrap().track_id, 0);

    app.next();
    assert_eq!(app.selected_item().unwrap().track_id, 2);
    app.next();
    assert_eq!(app.selected_item().unwrap().track_id, 0);
    app.prev();
    assert_eq!(app.selected_item().unwrap().track_id, 2);

    app.focus_next_playlist();
    assert_eq!(app.focused, 1);
    assert_eq!(app.selected_item().unwrap().track_id, 1);
    app.prev();
    assert_eq!(app.selected_item().unwrap().track_id, 5);

    // Cursor positions are kept per playlist.
    app.focus_prev_playlist();
    assert_eq!(app.selected_item().unwrap().track_id, 2);
}

#[test]
fn select_rejects_missing_rows() {
    let catalog = Catalog::builtin();
    let mut app = App::new(&catalog);
    assert!(app.select(1, 3));
    assert_eq!(app.focused, 1);
    assert_eq!(app.cursor(1), 3);
    assert!(!app.select(0, 2));
    assert!(!app.select(9, 0));
    assert_eq!(app.focused, 1);
}

#[test]
fn activating_focus_item_selects_and_plays_it() {
    let catalog = Catalog::builtin();
    let mut app = App::new(&catalog);
    let mut player = Player::new(catalog, FakeEngine::default(), MemoryStore::new());

    assert!(app.select(0, 1));
    app.activate_selected(&mut player).unwrap();

    let expected = player.catalog().index_of_track(2).unwrap();
    assert_eq!(player.state().current_index, expected);
    assert_eq!(player.playback(), PlaybackState::Playing);
    assert_eq!(player.store().get(KEY_CURRENT_SONG).as_deref(), Some("2"));
    assert_eq!(
        player.engine_mut().take_calls(),
        vec![Call::Load(2), Call::Play]
    );
}

#[test]
fn details_window_toggles() {
    let catalog = Catalog::builtin();
    let mut app = App::new(&catalog);
    assert!(!app.details_window);
    app.toggle_details_window();
    assert!(app.details_window);
}
