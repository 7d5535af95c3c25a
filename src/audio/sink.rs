//=========================================================================
// Audio Sinks
//=========================================================================
//
// Where playback cues end up. The manager decides what plays and at
// which volume; a sink only carries the result out.
//
// - LogSink: default, logs every cue under the `audio` target
// - RecordingSink: keeps cues in memory for assertions
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use serde::Serialize;

//=== Internal Dependencies ===============================================

use super::AudioKind;

//=== AudioSink ===========================================================

pub trait AudioSink {
    fn play(&mut self, kind: AudioKind, sound: &str, volume: f64, looped: bool);
    fn stop(&mut self, kind: AudioKind, fade_out_ms: u32);
    fn set_volume(&mut self, kind: AudioKind, volume: f64);
    fn pause_all(&mut self);
    fn resume_all(&mut self);
}

//=== LogSink =============================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, kind: AudioKind, sound: &str, volume: f64, looped: bool) {
        info!(
            target: "audio",
            "play {} on {:?} (volume {:.2}{})",
            sound,
            kind,
            volume,
            if looped { ", looped" } else { "" }
        );
    }

    fn stop(&mut self, kind: AudioKind, fade_out_ms: u32) {
        info!(target: "audio", "stop {:?} (fade {} ms)", kind, fade_out_ms);
    }

    fn set_volume(&mut self, kind: AudioKind, volume: f64) {
        debug!(target: "audio", "volume {:?} = {:.2}", kind, volume);
    }

    fn pause_all(&mut self) {
        info!(target: "audio", "pause all");
    }

    fn resume_all(&mut self) {
        info!(target: "audio", "resume all");
    }
}

//=== RecordingSink =======================================================

/// One cue received by a [`RecordingSink`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum AudioEvent {
    Play {
        kind: AudioKind,
        sound: String,
        volume: f64,
        looped: bool,
    },
    Stop {
        kind: AudioKind,
        fade_out_ms: u32,
    },
    SetVolume {
        kind: AudioKind,
        volume: f64,
    },
    PauseAll,
    ResumeAll,
}

/// Clones share one event log, so a test can keep a handle while the
/// manager owns the boxed sink.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<AudioEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AudioEvent> {
        self.events.borrow().clone()
    }

    /// Sounds started so far, in order.
    pub fn played(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                AudioEvent::Play { sound, .. } => Some(sound.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: AudioEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, kind: AudioKind, sound: &str, volume: f64, looped: bool) {
        self.record(AudioEvent::Play {
            kind,
            sound: sound.to_string(),
            volume,
            looped,
        });
    }

    fn stop(&mut self, kind: AudioKind, fade_out_ms: u32) {
        self.record(AudioEvent::Stop { kind, fade_out_ms });
    }

    fn set_volume(&mut self, kind: AudioKind, volume: f64) {
        self.record(AudioEvent::SetVolume { kind, volume });
    }

    fn pause_all(&mut self) {
        self.record(AudioEvent::PauseAll);
    }

    fn resume_all(&mut self) {
        self.record(AudioEvent::ResumeAll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_shares_events_between_clones() {
        let handle = RecordingSink::new();
        let mut sink: Box<dyn AudioSink> = Box::new(handle.clone());

        sink.play(AudioKind::Music, "background_main_theme", 0.8, true);
        sink.stop(AudioKind::Music, 1000);
        sink.pause_all();

        assert_eq!(
            handle.events(),
            vec![
                AudioEvent::Play {
                    kind: AudioKind::Music,
                    sound: "background_main_theme".to_string(),
                    volume: 0.8,
                    looped: true,
                },
                AudioEvent::Stop { kind: AudioKind::Music, fade_out_ms: 1000 },
                AudioEvent::PauseAll,
            ]
        );
        assert_eq!(handle.played(), ["background_main_theme"]);
    }

    #[test]
    fn events_serialize_with_cue_tag() {
        let event = AudioEvent::Stop { kind: AudioKind::Ambient, fade_out_ms: 500 };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["cue"], "stop");
        assert_eq!(json["kind"], "ambient");
        assert_eq!(json["fade_out_ms"], 500);
    }
}
