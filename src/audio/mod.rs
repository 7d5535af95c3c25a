//=========================================================================
// Audio Manager
//=========================================================================
//
// Catalog lookups, per-kind channels, volume rules and ambient fades.
//
// Architecture:
//   Scene ── AudioCommand ──> MessageBus ──> Game ──> AudioManager::apply
//                                                        │
//                                         AudioCatalog ──┤
//                                                        └──> AudioSink
//
// One channel per kind; starting a sound replaces whatever that channel
// was playing. Fades are stepped by `update(dt)` on game time.
//
//=========================================================================

//=== Module Declarations =================================================

mod catalog;
mod sink;

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::config::AudioSettings;

//=== Public API ==========================================================

pub use catalog::AudioCatalog;
pub use sink::{AudioEvent, AudioSink, LogSink, RecordingSink};

/// Ambient fade granularity.
const FADE_STEP_MS: f64 = 50.0;

//=== AudioKind ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioKind {
    Ambient,
    Foley,
    Ui,
    Voice,
    Music,
}

impl AudioKind {
    pub const ALL: [AudioKind; 5] = [
        AudioKind::Ambient,
        AudioKind::Foley,
        AudioKind::Ui,
        AudioKind::Voice,
        AudioKind::Music,
    ];
}

impl fmt::Display for AudioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioKind::Ambient => "ambient",
            AudioKind::Foley => "foley",
            AudioKind::Ui => "ui",
            AudioKind::Voice => "voice",
            AudioKind::Music => "music",
        };
        f.write_str(name)
    }
}

//=== AudioCommand ========================================================

/// Requests scenes push on the message bus.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    PlayAmbient { sound: String, fade_in_ms: u32 },
    StopAmbient { fade_out_ms: u32 },
    PlayMusic { sound: String, looped: bool },
    StopMusic { fade_out_ms: u32 },
    PlayUi(String),
    PlayFoley(String),
    PlayVoice(String),
}

//=== Channel State =======================================================

#[derive(Debug, Clone, Default)]
struct Channel {
    sound: Option<String>,
    looped: bool,
    /// Per-play volume before the master/kind multipliers.
    gain: f64,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    elapsed_ms: f64,
    duration_ms: f64,
    step: u32,
}

//=== AudioManager ========================================================

pub struct AudioManager {
    catalog: AudioCatalog,
    settings: AudioSettings,
    channels: BTreeMap<AudioKind, Channel>,
    current_ambient: Option<String>,
    ambient_fade: Option<Fade>,
    paused: bool,
    sink: Box<dyn AudioSink>,
}

impl AudioManager {
    /// Scans the catalog from `settings.audio_path`.
    pub fn new(settings: &AudioSettings, sink: Box<dyn AudioSink>) -> Self {
        Self::with_catalog(AudioCatalog::scan(settings), settings, sink)
    }

    pub fn with_catalog(catalog: AudioCatalog, settings: &AudioSettings, sink: Box<dyn AudioSink>) -> Self {
        Self {
            catalog,
            settings: settings.clone(),
            channels: AudioKind::ALL.iter().map(|kind| (*kind, Channel::default())).collect(),
            current_ambient: None,
            ambient_fade: None,
            paused: false,
            sink,
        }
    }

    //--- Playback ---------------------------------------------------------

    /// Starts `sound` on the channel for `kind`.
    ///
    /// Returns `false` and logs when the id is not in the catalog.
    pub fn play_sound(&mut self, sound: &str, kind: AudioKind, volume: f64, looped: bool) -> bool {
        if !self.catalog.contains(sound) {
            warn!(target: "audio", "Sound not found: {}", sound);
            return false;
        }

        let gain = volume.clamp(0.0, 1.0);
        let effective = gain * self.kind_volume(kind);
        let channel = self.channel_mut(kind);
        channel.sound = Some(sound.to_string());
        channel.looped = looped;
        channel.gain = gain;

        self.sink.play(kind, sound, effective, looped);
        true
    }

    /// Loops `sound` on the ambient channel with a linear fade-in.
    ///
    /// Already playing that ambient is a successful no-op.
    pub fn play_ambient(&mut self, sound: &str, fade_in_ms: u32) -> bool {
        if self.current_ambient.as_deref() == Some(sound) {
            return true;
        }

        self.stop_ambient(fade_in_ms);

        if !self.play_sound(sound, AudioKind::Ambient, 1.0, true) {
            return false;
        }
        self.current_ambient = Some(sound.to_string());

        if fade_in_ms > 0 {
            self.sink.set_volume(AudioKind::Ambient, 0.0);
            self.ambient_fade = Some(Fade {
                elapsed_ms: 0.0,
                duration_ms: f64::from(fade_in_ms),
                step: 0,
            });
        }
        true
    }

    pub fn stop_ambient(&mut self, fade_out_ms: u32) {
        if self.current_ambient.take().is_some() {
            self.ambient_fade = None;
            self.stop_channel(AudioKind::Ambient, fade_out_ms);
        }
    }

    pub fn play_foley(&mut self, sound: &str, volume: f64) -> bool {
        self.play_sound(sound, AudioKind::Foley, volume, false)
    }

    pub fn play_ui(&mut self, sound: &str, volume: f64) -> bool {
        self.play_sound(sound, AudioKind::Ui, volume, false)
    }

    pub fn play_voice(&mut self, sound: &str, volume: f64) -> bool {
        self.play_sound(sound, AudioKind::Voice, volume, false)
    }

    /// Starts music unless that track is already playing.
    pub fn play_music(&mut self, sound: &str, looped: bool) -> bool {
        if self.now_playing(AudioKind::Music) == Some(sound) {
            return true;
        }
        self.play_sound(sound, AudioKind::Music, 1.0, looped)
    }

    pub fn stop_music(&mut self, fade_out_ms: u32) {
        self.stop_channel(AudioKind::Music, fade_out_ms);
    }

    pub fn pause_all(&mut self) {
        if !self.paused {
            self.paused = true;
            self.sink.pause_all();
        }
    }

    pub fn resume_all(&mut self) {
        if self.paused {
            self.paused = false;
            self.sink.resume_all();
        }
    }

    pub fn stop_all(&mut self) {
        self.current_ambient = None;
        self.ambient_fade = None;
        for kind in AudioKind::ALL {
            self.stop_channel(kind, 0);
        }
    }

    /// Executes one bus command.
    pub fn apply(&mut self, command: AudioCommand) {
        debug!(target: "audio", "Audio command: {:?}", command);
        match command {
            AudioCommand::PlayAmbient { sound, fade_in_ms } => {
                self.play_ambient(&sound, fade_in_ms);
            }
            AudioCommand::StopAmbient { fade_out_ms } => self.stop_ambient(fade_out_ms),
            AudioCommand::PlayMusic { sound, looped } => {
                self.play_music(&sound, looped);
            }
            AudioCommand::StopMusic { fade_out_ms } => self.stop_music(fade_out_ms),
            AudioCommand::PlayUi(sound) => {
                self.play_ui(&sound, 1.0);
            }
            AudioCommand::PlayFoley(sound) => {
                self.play_foley(&sound, 1.0);
            }
            AudioCommand::PlayVoice(sound) => {
                self.play_voice(&sound, 1.0);
            }
        }
    }

    //--- Fades ------------------------------------------------------------

    /// Advances the ambient fade by `dt` seconds of game time.
    pub fn update(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        let Some(mut fade) = self.ambient_fade else {
            return;
        };

        fade.elapsed_ms += dt * 1000.0;
        let steps = (fade.duration_ms / FADE_STEP_MS).ceil().max(1.0) as u32;
        let step = ((fade.elapsed_ms / FADE_STEP_MS) as u32).min(steps);

        if step != fade.step {
            fade.step = step;
            let target = self.effective_volume(AudioKind::Ambient);
            self.sink
                .set_volume(AudioKind::Ambient, target * f64::from(step) / f64::from(steps));
        }

        self.ambient_fade = (step < steps).then_some(fade);
    }

    pub fn is_fading(&self) -> bool {
        self.ambient_fade.is_some()
    }

    //--- Volume -----------------------------------------------------------

    /// Master volume times the configured volume for `kind`.
    pub fn kind_volume(&self, kind: AudioKind) -> f64 {
        let kind_volume = match kind {
            AudioKind::Ambient => self.settings.ambient_volume,
            AudioKind::Foley | AudioKind::Ui => self.settings.sfx_volume,
            AudioKind::Voice => self.settings.voice_volume,
            AudioKind::Music => self.settings.music_volume,
        };
        self.settings.master_volume * kind_volume
    }

    pub fn set_master_volume(&mut self, volume: f64) {
        self.settings.master_volume = volume.clamp(0.0, 1.0);
        self.refresh_volumes();
    }

    /// Foley and Ui share the sfx volume.
    pub fn set_kind_volume(&mut self, kind: AudioKind, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        match kind {
            AudioKind::Ambient => self.settings.ambient_volume = volume,
            AudioKind::Foley | AudioKind::Ui => self.settings.sfx_volume = volume,
            AudioKind::Voice => self.settings.voice_volume = volume,
            AudioKind::Music => self.settings.music_volume = volume,
        }
        self.refresh_volumes();
    }

    //--- Queries ----------------------------------------------------------

    pub fn catalog(&self) -> &AudioCatalog {
        &self.catalog
    }

    /// Sorted catalog ids.
    pub fn loaded_sounds(&self) -> Vec<String> {
        self.catalog.ids()
    }

    pub fn now_playing(&self, kind: AudioKind) -> Option<&str> {
        self.channels.get(&kind).and_then(|channel| channel.sound.as_deref())
    }

    pub fn current_ambient(&self) -> Option<&str> {
        self.current_ambient.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    //--- Internal Helpers -------------------------------------------------

    fn channel_mut(&mut self, kind: AudioKind) -> &mut Channel {
        self.channels.entry(kind).or_default()
    }

    fn effective_volume(&self, kind: AudioKind) -> f64 {
        let gain = self.channels.get(&kind).map_or(1.0, |channel| channel.gain);
        gain * self.kind_volume(kind)
    }

    fn stop_channel(&mut self, kind: AudioKind, fade_out_ms: u32) {
        let channel = self.channel_mut(kind);
        if channel.sound.take().is_some() {
            channel.looped = false;
            self.sink.stop(kind, fade_out_ms);
        }
    }

    fn refresh_volumes(&mut self) {
        let playing: Vec<AudioKind> = self
            .channels
            .iter()
            .filter(|(_, channel)| channel.sound.is_some())
            .map(|(kind, _)| *kind)
            .collect();

        for kind in playing {
            if kind == AudioKind::Ambient && self.ambient_fade.is_some() {
                continue;
            }
            let volume = self.effective_volume(kind);
            self.sink.set_volume(kind, volume);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
