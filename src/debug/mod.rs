//=========================================================================
// Debug Harness
//=========================================================================
//
// Screenshot capture (immediate, delayed, periodic, event-driven) and
// log maintenance.
//
// Architecture:
//   hotkey / transition ─> DebugHarness ─┬─ schedule() ─> pending (game time)
//                                        └─ due_captures(now) ─> names
//   Game ─ compose frame ─> DebugHarness::capture() ─> ScreenshotWriter
//
// The harness never composes frames itself; the runtime owns the scene
// view and hands a finished frame in. Capture failures are logged and
// dropped.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod frame;
pub mod log_rotation;
mod screenshot;

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};

use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::config::DebugSettings;

//=== Public API ==========================================================

pub use frame::{DebugOverlay, FrameSource, Framebuffer};
pub use screenshot::ScreenshotWriter;

//=== Capture Names =======================================================

pub const MANUAL_CAPTURE: &str = "manual_screenshot";
pub const DELAYED_CAPTURE: &str = "manual_delayed";

/// Capture paths remembered by the harness; older ones are only counted.
pub const RECENT_CAPTURES: usize = 64;

pub fn scene_capture(scene: &str) -> String {
    format!("scene_{}", scene)
}

pub fn transition_capture(from: &str, to: &str) -> String {
    format!("event_scene_transition_{}_to_{}", from, to)
}

pub fn loaded_capture(scene: &str) -> String {
    format!("event_scene_loaded_{}", scene)
}

//=== DebugHarness ========================================================

#[derive(Debug, Clone, PartialEq)]
struct PendingCapture {
    name: String,
    due: f64,
}

#[derive(Debug)]
pub struct DebugHarness {
    settings: DebugSettings,
    debug_mode: bool,
    writer: ScreenshotWriter,
    pending: Vec<PendingCapture>,
    /// Game time of the last periodic capture; `None` fires on the next tick.
    last_periodic: Option<f64>,
    periodic_count: u32,
    /// Most recent files, oldest first, at most `RECENT_CAPTURES`.
    captures: Vec<PathBuf>,
    capture_count: u64,
}

impl DebugHarness {
    pub fn new(settings: &DebugSettings) -> Self {
        if settings.debug_mode {
            info!(target: "debug", "Debug mode enabled");
            info!(target: "debug", "Auto screenshot interval: {}s", settings.screenshot_interval);
            info!(
                target: "debug",
                "Event screenshots: {}",
                if settings.auto_screenshot { "enabled" } else { "disabled" }
            );
        }

        Self {
            settings: settings.clone(),
            debug_mode: settings.debug_mode,
            writer: ScreenshotWriter::new(&settings.screenshot_dir),
            pending: Vec::new(),
            last_periodic: None,
            periodic_count: 0,
            captures: Vec::new(),
            capture_count: 0,
        }
    }

    //--- Debug Mode -------------------------------------------------------

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Flips debug mode and returns the new state.
    pub fn toggle_debug(&mut self) -> bool {
        self.debug_mode = !self.debug_mode;
        if self.debug_mode {
            self.last_periodic = None;
        }
        info!(target: "debug", "Debug mode: {}", if self.debug_mode { "ON" } else { "OFF" });
        self.debug_mode
    }

    /// Whether transition captures should be taken.
    pub fn events_enabled(&self) -> bool {
        self.debug_mode && self.settings.auto_screenshot
    }

    //--- Scheduling -------------------------------------------------------

    /// Queues `name` for capture `delay` seconds of game time after `now`.
    pub fn schedule(&mut self, name: impl Into<String>, delay: f64, now: f64) {
        let name = name.into();
        let due = now + delay.max(0.0);
        info!(target: "debug", "Screenshot {} scheduled in {:.2}s", name, delay);
        self.pending.push(PendingCapture { name, due });
    }

    /// Queues the F4 capture with the configured delay.
    pub fn schedule_delayed(&mut self, now: f64) {
        self.schedule(DELAYED_CAPTURE, self.settings.screenshot_delay, now);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Names to capture this tick: expired timers in schedule order, then
    /// the periodic capture when debug mode is on and one is due.
    pub fn due_captures(&mut self, now: f64) -> Vec<String> {
        let mut due = Vec::new();
        self.pending.retain(|capture| {
            if capture.due <= now {
                due.push(capture.name.clone());
                false
            } else {
                true
            }
        });

        if self.debug_mode {
            let interval = self.settings.screenshot_interval.max(0.0);
            let fire = self.last_periodic.map_or(true, |last| now - last >= interval);
            if fire {
                self.periodic_count += 1;
                self.last_periodic = Some(now);
                due.push(format!("debug_auto_{:03}", self.periodic_count));
            }
        }

        due
    }

    //--- Capture ----------------------------------------------------------

    /// Writes one screenshot; failures are logged, never returned.
    pub fn capture(&mut self, name: &str, frame: &Framebuffer, caption: &str) -> Option<PathBuf> {
        match self.writer.write(name, frame, caption) {
            Ok(path) => {
                if self.captures.len() == RECENT_CAPTURES {
                    self.captures.remove(0);
                }
                self.captures.push(path.clone());
                self.capture_count += 1;
                Some(path)
            }
            Err(e) => {
                error!(target: "debug", "Screenshot {} failed: {}", name, e);
                None
            }
        }
    }

    /// The last files written, oldest first.
    pub fn captures(&self) -> &[PathBuf] {
        &self.captures
    }

    /// Files written since startup.
    pub fn capture_count(&self) -> u64 {
        self.capture_count
    }

    pub fn screenshot_dir(&self) -> &Path {
        self.writer.dir()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(dir: &Path) -> DebugSettings {
        DebugSettings {
            screenshot_dir: dir.to_path_buf(),
            ..DebugSettings::default()
        }
    }

    //=====================================================================
    // Timers
    //=====================================================================

    #[test]
    fn delayed_capture_fires_once_after_delay() {
        let dir = TempDir::new().unwrap();
        let mut harness = DebugHarness::new(&settings(dir.path()));

        harness.schedule_delayed(2.0);

        assert!(harness.due_captures(2.5).is_empty());
        assert!(harness.due_captures(2.99).is_empty());
        assert_eq!(harness.due_captures(3.0), [DELAYED_CAPTURE]);
        assert!(harness.due_captures(4.0).is_empty());
        assert_eq!(harness.pending_count(), 0);
    }

    #[test]
    fn timers_fire_in_schedule_order() {
        let dir = TempDir::new().unwrap();
        let mut harness = DebugHarness::new(&settings(dir.path()));

        harness.schedule("b", 0.5, 0.0);
        harness.schedule("a", 0.2, 0.0);
        harness.schedule("c", 5.0, 0.0);

        assert_eq!(harness.due_captures(1.0), ["b", "a"]);
    }

    #[test]
    fn periodic_captures_only_in_debug_mode() {
        let dir = TempDir::new().unwrap();
        let mut harness = DebugHarness::new(&settings(dir.path()));
        assert!(harness.due_captures(100.0).is_empty());

        assert!(harness.toggle_debug());
        assert_eq!(harness.due_captures(100.0), ["debug_auto_001"]);
        assert!(harness.due_captures(104.9).is_empty());
        assert_eq!(harness.due_captures(105.0), ["debug_auto_002"]);

        assert!(!harness.toggle_debug());
        assert!(harness.due_captures(200.0).is_empty());
    }

    #[test]
    fn event_captures_need_debug_and_auto_screenshot() {
        let dir = TempDir::new().unwrap();
        let mut config = settings(dir.path());
        config.auto_screenshot = true;
        let mut harness = DebugHarness::new(&config);

        assert!(!harness.events_enabled());
        harness.toggle_debug();
        assert!(harness.events_enabled());
    }

    //=====================================================================
    // Capture
    //=====================================================================

    #[test]
    fn capture_writes_into_screenshot_dir() {
        let dir = TempDir::new().unwrap();
        let mut harness = DebugHarness::new(&settings(&dir.path().join("debug_screenshots")));

        let path = harness.capture(MANUAL_CAPTURE, &Framebuffer::new(8, 8), "caption").unwrap();

        assert!(path.starts_with(dir.path().join("debug_screenshots")));
        assert_eq!(harness.captures(), [path]);
    }

    #[test]
    fn only_recent_captures_are_kept() {
        let dir = TempDir::new().unwrap();
        let mut harness = DebugHarness::new(&settings(dir.path()));
        let frame = Framebuffer::new(1, 1);

        let paths: Vec<PathBuf> = (0..RECENT_CAPTURES + 3)
            .map(|i| harness.capture(&format!("debug_auto_{:03}", i), &frame, "").unwrap())
            .collect();

        assert_eq!(harness.capture_count(), (RECENT_CAPTURES + 3) as u64);
        assert_eq!(harness.captures(), &paths[3..]);
    }

    #[test]
    fn capture_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();
        let mut harness = DebugHarness::new(&settings(&blocker));

        assert!(harness.capture(MANUAL_CAPTURE, &Framebuffer::new(2, 2), "").is_none());
        assert!(harness.captures().is_empty());
    }

    #[test]
    fn capture_names() {
        assert_eq!(scene_capture("CH0_PHASE_01"), "scene_CH0_PHASE_01");
        assert_eq!(
            transition_capture("CH0_PHASE_01", "CH0_PHASE_02"),
            "event_scene_transition_CH0_PHASE_01_to_CH0_PHASE_02"
        );
        assert_eq!(loaded_capture("CH1_PHASE_01"), "event_scene_loaded_CH1_PHASE_01");
    }
}
