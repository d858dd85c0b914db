//! The music director: exploration/combat crossfade.
//!
//! Mode flips run a fade sequence on the timed-sequence runner (cancelling
//! the previous fade's handle), and this system integrates each track's
//! volume toward its target every tick. Actual playback is a presentation
//! concern; the core only models the mix.

use bevy_ecs::{entity::Entity, resource::Resource, system::{Res, ResMut}};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing::debug;

use crate::constants::MUSIC_FADE_SECS;
use crate::sequence::{Effect, Sequence, SequenceHandle, Sequencer, Wait};
use crate::systems::components::{DeltaTime, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum MusicTrack {
    Exploration,
    Combat,
}

#[derive(Debug, Clone, Copy)]
pub struct TrackState {
    pub volume: f32,
    pub target: f32,
    rate: f32,
    pub playing: bool,
}

impl TrackState {
    fn silent() -> Self {
        TrackState {
            volume: 0.0,
            target: 0.0,
            rate: 0.0,
            playing: false,
        }
    }
}

#[derive(Resource)]
pub struct MusicDirector {
    pub exploration: TrackState,
    pub combat: TrackState,
    /// Entity that owns fade sequences on the runner.
    channel: Entity,
    fade: Option<SequenceHandle>,
    in_combat: bool,
}

impl MusicDirector {
    /// Exploration plays from session start, matching the arena's opening.
    pub fn new(channel: Entity) -> Self {
        MusicDirector {
            exploration: TrackState {
                volume: 1.0,
                target: 1.0,
                rate: 0.0,
                playing: true,
            },
            combat: TrackState::silent(),
            channel,
            fade: None,
            in_combat: false,
        }
    }

    fn track_mut(&mut self, track: MusicTrack) -> &mut TrackState {
        match track {
            MusicTrack::Exploration => &mut self.exploration,
            MusicTrack::Combat => &mut self.combat,
        }
    }

    pub fn set_target(&mut self, track: MusicTrack, volume: f32, fade_secs: f32) {
        let state = self.track_mut(track);
        state.target = volume;
        state.rate = (state.volume - volume).abs() / fade_secs.max(f32::EPSILON);
        if volume > 0.0 {
            state.playing = true;
        }
    }
}

fn crossfade(up: MusicTrack, down: MusicTrack) -> Sequence {
    Sequence::new()
        .step(
            Effect::MusicTarget {
                track: up,
                volume: 1.0,
                fade_secs: MUSIC_FADE_SECS,
            },
            Wait::Instant,
        )
        .step(
            Effect::MusicTarget {
                track: down,
                volume: 0.0,
                fade_secs: MUSIC_FADE_SECS,
            },
            Wait::Seconds(MUSIC_FADE_SECS),
        )
}

/// Flips the crossfade on combat changes and integrates track volumes.
pub fn music_system(
    dt: Res<DeltaTime>,
    game_state: Res<GameState>,
    mut sequencer: ResMut<Sequencer>,
    mut director: ResMut<MusicDirector>,
) {
    if game_state.combat != director.in_combat {
        director.in_combat = game_state.combat;
        if let Some(previous) = director.fade.take() {
            sequencer.cancel(previous);
        }
        let (up, down) = if director.in_combat {
            (MusicTrack::Combat, MusicTrack::Exploration)
        } else {
            (MusicTrack::Exploration, MusicTrack::Combat)
        };
        debug!(combat = director.in_combat, "Music crossfade");
        let channel = director.channel;
        director.fade = Some(sequencer.run(channel, crossfade(up, down)));
    }

    for track in MusicTrack::iter() {
        let state = director.track_mut(track);
        let delta = state.target - state.volume;
        if delta.abs() <= f32::EPSILON {
            if state.target == 0.0 {
                state.playing = false;
            }
            continue;
        }
        let step = state.rate * dt.seconds;
        state.volume += delta.clamp(-step, step);
    }
}
