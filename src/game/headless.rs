//=========================================================================
// Headless Driver
//=========================================================================
//
// Runs the game without a window by pushing scripted key taps into the
// platform channel and ticking at a fixed step.
//
// Script syntax (comma separated):
//   enter, space, 1, f2, esc     tap a key, then tick once
//   ctrl+s, shift+f1             tap with modifiers
//   wait                         one second of game time
//   wait:2.5                     2.5 seconds of game time
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::str::FromStr;

use crossbeam_channel::{Sender, TrySendError};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::Game;
use crate::core::input::{InputEvent, KeyCode, Modifiers};
use crate::core::platform_bridge::{PlatformEvent, TickControl};

//=== ScriptStep ==========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStep {
    /// Key tap delivered as one input batch.
    Press(KeyCode, Modifiers),
    /// Seconds of game time to let pass.
    Wait(f64),
}

impl fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptStep::Press(key, mods) if *mods == Modifiers::NONE => write!(f, "{:?}", key),
            ScriptStep::Press(key, mods) => write!(f, "{:?}+{:?}", mods, key),
            ScriptStep::Wait(seconds) => write!(f, "wait {}s", seconds),
        }
    }
}

impl FromStr for ScriptStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = s.trim().to_ascii_lowercase();

        if step == "wait" {
            return Ok(ScriptStep::Wait(1.0));
        }
        if let Some(seconds) = step.strip_prefix("wait:") {
            return seconds
                .parse::<f64>()
                .ok()
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(ScriptStep::Wait)
                .ok_or_else(|| format!("invalid wait: {}", s));
        }

        let mut parts: Vec<&str> = step.split('+').collect();
        let key = parts.pop().unwrap_or_default().parse::<KeyCode>()?;

        let mut mods = Modifiers::NONE;
        for part in parts {
            match part.trim() {
                "ctrl" => mods.ctrl = true,
                "shift" => mods.shift = true,
                "alt" => mods.alt = true,
                other => return Err(format!("unknown modifier: {}", other)),
            }
        }

        Ok(ScriptStep::Press(key, mods))
    }
}

/// Parses a comma separated script. Empty entries are skipped.
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, String> {
    script
        .split(',')
        .filter(|step| !step.trim().is_empty())
        .map(str::parse)
        .collect()
}

//=== HeadlessReport ======================================================

/// Outcome of a headless run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessReport {
    pub ticks: u64,
    pub game_time: f64,
    /// Whether the game asked to stop before the run was over.
    pub exited: bool,
}

//=== HeadlessDriver ======================================================

pub struct HeadlessDriver {
    sender: Sender<PlatformEvent>,
    dt: f64,
    ticks: u64,
}

impl HeadlessDriver {
    pub(crate) fn new(sender: Sender<PlatformEvent>, tps: f64) -> Self {
        Self {
            sender,
            dt: 1.0 / tps,
            ticks: 0,
        }
    }

    /// Plays `script`, then ticks `settle_ticks` more so pending timers
    /// (delayed screenshots, fades) can fire.
    pub fn run(&mut self, game: &mut Game, script: &[ScriptStep], settle_ticks: u64) -> HeadlessReport {
        info!("Headless run: {} steps, {} settle ticks", script.len(), settle_ticks);

        let exited = self.play(game, script) || self.advance(game, settle_ticks);

        let report = HeadlessReport {
            ticks: self.ticks,
            game_time: game.clock().elapsed(),
            exited,
        };
        info!(
            "Headless run finished after {} ticks ({:.2}s game time)",
            report.ticks, report.game_time
        );
        report
    }

    /// Returns `true` if the game exited during the script.
    fn play(&mut self, game: &mut Game, script: &[ScriptStep]) -> bool {
        for step in script {
            debug!("Script step: {}", step);
            let exited = match *step {
                ScriptStep::Press(key, mods) => {
                    self.send(InputEvent::tap(key, mods).to_vec());
                    self.advance(game, 1)
                }
                ScriptStep::Wait(seconds) => {
                    let ticks = (seconds / self.dt).round() as u64;
                    self.advance(game, ticks)
                }
            };
            if exited {
                return true;
            }
        }
        false
    }

    fn advance(&mut self, game: &mut Game, ticks: u64) -> bool {
        for _ in 0..ticks {
            self.ticks += 1;
            if game.tick(self.dt) == TickControl::Exit {
                return true;
            }
            // No window to resize
            game.take_platform_commands();
        }
        false
    }

    fn send(&self, discrete: Vec<InputEvent>) {
        let event = PlatformEvent::Inputs { discrete, continuous: Vec::new() };
        if let Err(TrySendError::Full(_)) = self.sender.try_send(event) {
            warn!("Event channel full, dropping scripted input");
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_waits_and_chords() {
        let steps = parse_script("enter, space,1,ctrl+s,wait,wait:0.5,F4").unwrap();

        assert_eq!(
            steps,
            [
                ScriptStep::Press(KeyCode::Enter, Modifiers::NONE),
                ScriptStep::Press(KeyCode::Space, Modifiers::NONE),
                ScriptStep::Press(KeyCode::Digit1, Modifiers::NONE),
                ScriptStep::Press(KeyCode::KeyS, Modifiers::CTRL),
                ScriptStep::Wait(1.0),
                ScriptStep::Wait(0.5),
                ScriptStep::Press(KeyCode::F4, Modifiers::NONE),
            ]
        );
    }

    #[test]
    fn empty_script_is_empty() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script(" , ").unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_keys_and_modifiers() {
        assert!(parse_script("enter,banana").is_err());
        assert!(parse_script("hyper+s").is_err());
        assert!(parse_script("wait:-1").is_err());
    }
}
