//! Sound cue dispatch.
//!
//! Device output is not handled here: a cue "sounds" when its clip was loaded
//! and audio is not muted, and the front end decides how to voice it.

use std::collections::HashMap;

use crate::assets::{GameAssets, SoundAsset};
use crate::entities::SoundCue;

pub struct AudioManager {
    clips: HashMap<SoundCue, SoundAsset>,
    music: Option<SoundAsset>,
    music_playing: bool,
    muted: bool,
}

impl AudioManager {
    /// `assets` is `None` when the game runs without its asset directory;
    /// every cue is then silent.
    pub fn new(assets: Option<&GameAssets>, muted: bool) -> Self {
        let mut clips = HashMap::new();
        let mut music = None;
        if let Some(a) = assets {
            clips.insert(SoundCue::Reveal, a.swoosh.clone());
            clips.insert(SoundCue::Explosion, a.explosion.clone());
            clips.insert(SoundCue::Shoot, a.shooting.clone());
            clips.insert(SoundCue::PowerUp, a.swoosh.clone());
            music = a.music.clone();
        }
        if clips.is_empty() {
            log::warn!("no sound clips loaded - audio disabled");
        }
        Self {
            clips,
            music,
            music_playing: false,
            muted,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Muting also stops the music; unmuting lets `start_music` resume it.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted && self.music_playing {
            log::info!("music stopped");
            self.music_playing = false;
        }
    }

    /// Returns `true` if the cue sounded.
    pub fn play(&mut self, cue: SoundCue) -> bool {
        if self.muted {
            return false;
        }
        match self.clips.get(&cue) {
            Some(clip) => {
                log::debug!("play {:?} ({}, {:?})", cue, clip.path.display(), clip.duration);
                true
            }
            None => false,
        }
    }

    /// Start the looping background track.  Idempotent.
    pub fn start_music(&mut self) -> bool {
        if self.music_playing || self.muted {
            return self.music_playing;
        }
        if let Some(track) = &self.music {
            log::info!("background music: {}", track.path.display());
            self.music_playing = true;
        }
        self.music_playing
    }

    pub fn music_playing(&self) -> bool {
        self.music_playing
    }
}
