use crate::engine::PlaybackEngine;
use crate::mpris::MprisHandle;
use crate::persist::KeyValueStore;
use crate::player::{PlaybackState, Player};

pub fn update_mpris<E: PlaybackEngine, S: KeyValueStore>(
    mpris: &MprisHandle,
    player: &Player<E, S>,
) {
    let playback = player.playback();
    let track = match playback {
        PlaybackState::Stopped => None,
        PlaybackState::Playing | PlaybackState::Paused => Some(player.current_track()),
    };
    mpris.set_track_metadata(track);
    mpris.set_playback(playback);
}
