//=========================================================================
// Diagnostics
//=========================================================================
//
// Offline reports behind the `check`, `audio` and `prologue` commands.
// Nothing here opens a window; each report is plain data with a
// `Display` impl so the CLI only has to print it.
//
//   check     config, emotion model, expected assets, scene registry
//   audio     catalog listing plus one test playback
//   prologue  walks the CH0 phases along one choice path
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use log::{info, warn};

//=== Internal Dependencies ===============================================

use crate::audio::{AudioKind, AudioManager, AudioSink};
use crate::config::GameConfig;
use crate::emotion::{EmotionKind, EmotionSystem};
use crate::engine::EngineBuilder;
use crate::game::{FIRST_STORY_SCENE, MENU_SCENE, SETTINGS_SCENE};
use crate::story::Story;

/// Sound played by the audio report.
pub const TEST_SOUND: &str = "environment_gentle-rain";

/// Scenes the registry must contain after startup.
const REQUIRED_SCENES: [&str; 3] = [MENU_SCENE, FIRST_STORY_SCENE, "CH1_PHASE_01"];

/// Asset files the shipped story refers to, relative to the audio root.
const EXPECTED_ASSETS: [(&str, &str); 3] = [
    ("sfx/environment", "gentle-rain.wav"),
    ("sfx/environment", "heavy-rain.wav"),
    ("music/background", "main_theme.wav"),
];

/// Scene id prefix of the prologue chapter.
const PROLOGUE_PREFIX: &str = "CH0_";

//=== Check ===============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CheckItem {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckItem {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self { name, passed, detail: detail.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetStatus {
    pub path: PathBuf,
    pub present: bool,
}

/// Result of the smoke test.
///
/// Missing assets are reported but do not fail the check; the game runs
/// without them and logs the skipped sounds.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub items: Vec<CheckItem>,
    pub assets: Vec<AssetStatus>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.items.iter().all(|item| item.passed)
    }

    pub fn item(&self, name: &str) -> Option<&CheckItem> {
        self.items.iter().find(|item| item.name == name)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Smoke test")?;
        writeln!(f, "{}", "=".repeat(40))?;
        for item in &self.items {
            let mark = if item.passed { "OK  " } else { "FAIL" };
            writeln!(f, "[{}] {}: {}", mark, item.name, item.detail)?;
        }

        writeln!(f)?;
        writeln!(f, "Assets")?;
        for asset in &self.assets {
            let state = if asset.present { "present" } else { "missing" };
            writeln!(f, "  {} {}", state, asset.path.display())?;
        }

        writeln!(f)?;
        if self.passed() {
            write!(f, "All checks passed")
        } else {
            let failed = self.items.iter().filter(|item| !item.passed).count();
            write!(f, "{} check(s) failed", failed)
        }
    }
}

/// Runs the smoke test against `config`.
pub fn check(config: &GameConfig) -> CheckReport {
    info!("Running smoke test");

    let mut items = vec![check_config(config), check_emotions(config)];
    items.extend(check_registry(config));

    let assets = EXPECTED_ASSETS
        .iter()
        .map(|(dir, file)| {
            let path = config.audio.audio_path.join(dir).join(file);
            AssetStatus { present: path.is_file(), path }
        })
        .collect();

    CheckReport { items, assets }
}

fn check_config(config: &GameConfig) -> CheckItem {
    let display = &config.display;
    let valid = display.window_width > 0 && display.window_height > 0 && display.fps > 0;
    CheckItem::new(
        "config",
        valid,
        format!(
            "{}x{} @ {} fps, fullscreen {}, language {}",
            display.window_width, display.window_height, display.fps, display.fullscreen, config.game.language
        ),
    )
}

fn check_emotions(config: &GameConfig) -> CheckItem {
    let mut emotions = EmotionSystem::from_settings(&config.game);
    emotions.update(EmotionKind::Determination, 10.0, 0.0);
    emotions.update(EmotionKind::Anger, -5.0, 0.0);

    let summary = emotions.summary();
    let passed = summary.dominant == Some(EmotionKind::Determination)
        && emotions.value(EmotionKind::Anger) >= config.game.min_emotion_value;
    let dominant = summary.dominant.map_or_else(|| "none".to_string(), |kind| kind.to_string());

    CheckItem::new(
        "emotion",
        passed,
        format!(
            "{} {:.1}, {} {:.1}, dominant {}",
            EmotionKind::Determination,
            emotions.value(EmotionKind::Determination),
            EmotionKind::Anger,
            emotions.value(EmotionKind::Anger),
            dominant
        ),
    )
}

/// Builds a real game (log-only audio) and inspects its registry.
fn check_registry(config: &GameConfig) -> Vec<CheckItem> {
    let engine = EngineBuilder::new().with_config(config.clone()).build();

    match engine {
        Ok(engine) => {
            let manager = engine.game().scene_manager();
            let missing: Vec<&str> = REQUIRED_SCENES
                .into_iter()
                .filter(|id| !manager.contains(id))
                .collect();
            let registry = if missing.is_empty() {
                CheckItem::new("scenes", true, format!("{} scenes registered", manager.len()))
            } else {
                CheckItem::new("scenes", false, format!("missing {}", missing.join(", ")))
            };
            vec![
                registry,
                CheckItem::new(
                    "audio",
                    true,
                    format!("{} sounds in catalog", engine.game().audio().catalog().len()),
                ),
                CheckItem::new("story", true, "all jump targets registered"),
            ]
        }
        Err(e) => {
            warn!("Game failed to start: {}", e);
            vec![CheckItem::new("story", false, e.to_string())]
        }
    }
}

//=== Audio ===============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AudioReport {
    pub audio_root: PathBuf,
    pub sounds: Vec<String>,
    pub test_sound: &'static str,
    pub played: bool,
}

impl fmt::Display for AudioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Audio root: {}", self.audio_root.display())?;
        writeln!(f, "Loaded sounds: {}", self.sounds.len())?;
        for sound in &self.sounds {
            writeln!(f, "  - {}", sound)?;
        }
        if self.played {
            write!(f, "Played {}", self.test_sound)
        } else {
            write!(f, "Sound {} not in catalog", self.test_sound)
        }
    }
}

/// Scans the catalog and plays [`TEST_SOUND`] once through `sink`.
pub fn audio(config: &GameConfig, sink: Box<dyn AudioSink>) -> AudioReport {
    let mut manager = AudioManager::new(&config.audio, sink);
    let played = manager.play_sound(TEST_SOUND, AudioKind::Ambient, 0.5, false);

    AudioReport {
        audio_root: config.audio.audio_path.clone(),
        sounds: manager.loaded_sounds(),
        test_sound: TEST_SOUND,
        played,
    }
}

//=== Prologue ============================================================

/// Choice policy for the prologue walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProloguePath {
    /// Always the first choice.
    #[default]
    Obsession,
    /// Always the second choice.
    Anger,
    /// The third choice, or the first when there are fewer.
    Balanced,
}

impl ProloguePath {
    fn pick(self, choices: usize) -> Option<usize> {
        let index = match self {
            ProloguePath::Obsession => 0,
            ProloguePath::Anger => 1,
            ProloguePath::Balanced if choices > 2 => 2,
            ProloguePath::Balanced => 0,
        };
        (index < choices).then_some(index)
    }
}

impl fmt::Display for ProloguePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProloguePath::Obsession => "执念路径",
            ProloguePath::Anger => "愤怒路径",
            ProloguePath::Balanced => "平衡路径",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Mild,
    Medium,
    Strong,
}

impl Intensity {
    pub fn of(value: f64) -> Self {
        if value > 50.0 {
            Intensity::Strong
        } else if value > 20.0 {
            Intensity::Medium
        } else {
            Intensity::Mild
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Intensity::Mild => "轻微",
            Intensity::Medium => "中等",
            Intensity::Strong => "强烈",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseStep {
    pub scene: String,
    pub title: String,
    /// Chosen choice id per event; `None` for events without choices.
    pub choices: Vec<Option<String>>,
    pub values: BTreeMap<EmotionKind, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionCheck {
    /// Choice or scene id holding the jump.
    pub source: String,
    pub target: String,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrologueReport {
    pub path: ProloguePath,
    pub phases: Vec<PhaseStep>,
    pub final_values: BTreeMap<EmotionKind, f64>,
    pub transitions: Vec<TransitionCheck>,
}

impl PrologueReport {
    pub fn broken_transitions(&self) -> impl Iterator<Item = &TransitionCheck> {
        self.transitions.iter().filter(|check| !check.exists)
    }
}

impl fmt::Display for PrologueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "序章调试: {}", self.path)?;
        writeln!(f, "{}", "=".repeat(40))?;

        for phase in &self.phases {
            writeln!(f, "{} ({})", phase.title, phase.scene)?;
            for (i, choice) in phase.choices.iter().enumerate() {
                writeln!(f, "  事件 {}: {}", i + 1, choice.as_deref().unwrap_or("-"))?;
            }
            writeln!(f, "  {}", format_values(&phase.values))?;
        }

        writeln!(f)?;
        writeln!(f, "最终情感状态")?;
        for (kind, value) in &self.final_values {
            writeln!(f, "  {}: {:.1} ({})", kind, value, Intensity::of(*value))?;
        }

        writeln!(f)?;
        writeln!(f, "场景转换检查")?;
        for check in &self.transitions {
            let mark = if check.exists { "OK  " } else { "FAIL" };
            writeln!(f, "  [{}] {} -> {}", mark, check.source, check.target)?;
        }
        Ok(())
    }
}

fn format_values(values: &BTreeMap<EmotionKind, f64>) -> String {
    values
        .iter()
        .map(|(kind, value)| format!("{} {:.1}", kind, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Replays every prologue phase of `story` with the choices `path` picks.
///
/// Effects are applied at a fixed time, so no decay happens between
/// choices.
pub fn prologue(config: &GameConfig, story: &Story, path: ProloguePath) -> PrologueReport {
    let mut emotions = EmotionSystem::from_settings(&config.game);
    let mut phases = Vec::new();

    for script in story.scenes().iter().filter(|s| s.id.starts_with(PROLOGUE_PREFIX)) {
        let mut choices = Vec::with_capacity(script.events.len());
        for event in &script.events {
            let picked = path.pick(event.choices.len()).map(|index| &event.choices[index]);
            if let Some(choice) = picked {
                emotions.apply_effects(&choice.effects, 0.0);
            }
            choices.push(picked.map(|choice| choice.id.clone()));
        }

        phases.push(PhaseStep {
            scene: script.id.clone(),
            title: script.title.clone(),
            choices,
            values: emotions.summary().values,
        });
    }

    PrologueReport {
        path,
        phases,
        final_values: emotions.summary().values,
        transitions: transition_checks(story),
    }
}

fn transition_checks(story: &Story) -> Vec<TransitionCheck> {
    let exists = |id: &str| story.get(id).is_some() || id == MENU_SCENE || id == SETTINGS_SCENE;
    let mut checks = Vec::new();

    for script in story.scenes() {
        for choice in script.events.iter().flat_map(|event| &event.choices) {
            if let Some(target) = &choice.next_scene {
                checks.push(TransitionCheck {
                    source: choice.id.clone(),
                    target: target.clone(),
                    exists: exists(target),
                });
            }
        }
        if let Some(target) = &script.next_scene {
            checks.push(TransitionCheck {
                source: script.id.clone(),
                target: target.clone(),
                exists: exists(target),
            });
        }
    }
    checks
}

//=========================================================================
// Unit Tests
//=========================================================================
