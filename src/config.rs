//=========================================================================
// Game Configuration
//=========================================================================
//
// TOML-backed settings grouped by subsystem.
//
// Lifecycle:
//   load(path) / load_or_create(path)
//     ├─ missing file  → defaults written to disk
//     ├─ parse failure → warning, defaults (file left untouched)
//     └─ ok            → parsed values, absent fields defaulted
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::error::ConfigError;

/// Default location relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/game_config.toml";

//=== AudioSettings =======================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f64,
    pub music_volume: f64,
    pub sfx_volume: f64,
    pub voice_volume: f64,
    pub ambient_volume: f64,

    pub audio_path: PathBuf,
    pub sfx_path: String,
    pub music_path: String,
    pub voice_path: String,

    pub sample_rate: u32,
    pub bit_depth: u16,
    pub channels: u16,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.8,
            sfx_volume: 0.9,
            voice_volume: 1.0,
            ambient_volume: 0.7,
            audio_path: PathBuf::from("assets/audio"),
            sfx_path: "sfx".to_string(),
            music_path: "music".to_string(),
            voice_path: "voice".to_string(),
            sample_rate: 44_100,
            bit_depth: 16,
            channels: 2,
        }
    }
}

//=== DisplaySettings =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    pub fps: u32,

    pub font_path: PathBuf,
    pub default_font: String,
    pub font_size: u32,
    pub line_spacing: f64,

    /// Multiplier on the base reveal rate of 30 characters per second.
    pub text_speed: f64,
    pub auto_advance: bool,
    /// Seconds a finished passage without choices waits before moving on.
    pub auto_advance_delay: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fullscreen: false,
            vsync: true,
            fps: 60,
            font_path: PathBuf::from("assets/fonts"),
            default_font: "NotoSansSC-Regular.ttf".to_string(),
            font_size: 24,
            line_spacing: 1.2,
            text_speed: 1.0,
            auto_advance: false,
            auto_advance_delay: 3.0,
        }
    }
}

//=== GameSettings ========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub language: String,
    pub save_path: PathBuf,
    pub auto_save: bool,
    /// Minutes of play between automatic saves.
    pub auto_save_interval: u32,

    /// Points lost per minute since the emotion last changed.
    pub emotion_decay_rate: f64,
    pub max_emotion_value: f64,
    pub min_emotion_value: f64,

    pub simulation_time_scale: f64,
    pub max_simulation_days: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            language: "zh_CN".to_string(),
            save_path: PathBuf::from("saves"),
            auto_save: true,
            auto_save_interval: 5,
            emotion_decay_rate: 0.1,
            max_emotion_value: 100.0,
            min_emotion_value: 0.0,
            simulation_time_scale: 1.0,
            max_simulation_days: 1095,
        }
    }
}

//=== DebugSettings =======================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    pub debug_mode: bool,
    /// Event captures around scene transitions (requires debug mode).
    pub auto_screenshot: bool,
    /// Seconds between periodic captures while debug mode is on.
    pub screenshot_interval: f64,
    /// Seconds before the F4 capture fires.
    pub screenshot_delay: f64,
    pub screenshot_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Log files kept by startup rotation; 0 keeps everything.
    pub log_keep: usize,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            debug_mode: false,
            auto_screenshot: false,
            screenshot_interval: 5.0,
            screenshot_delay: 1.0,
            screenshot_dir: PathBuf::from("debug_screenshots"),
            log_dir: PathBuf::from("logs"),
            log_keep: 10,
        }
    }
}

//=== GameConfig ==========================================================

/// Complete game configuration.
///
/// # Examples
///
/// ```
/// use simulate_to_survive::config::GameConfig;
///
/// let config: GameConfig = toml::from_str("[display]\nwindow_width = 800").unwrap();
/// assert_eq!(config.display.window_width, 800);
/// assert_eq!(config.display.window_height, 720);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub audio: AudioSettings,
    pub display: DisplaySettings,
    pub game: GameSettings,
    pub debug: DebugSettings,
}

//=== ConfigSource ========================================================

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No file existed; defaults were written.
    Created,
    /// No file existed and none was written.
    Missing,
    Loaded,
    /// The file did not parse; defaults are in use. Holds the parse error.
    Defaulted(String),
}

impl ConfigSource {
    pub fn log(&self, path: &Path) {
        match self {
            ConfigSource::Created => {
                info!(target: "config", "Created default config at {}", path.display())
            }
            ConfigSource::Missing => {
                info!(target: "config", "No config at {}; using defaults", path.display())
            }
            ConfigSource::Loaded => info!(target: "config", "Loaded config from {}", path.display()),
            ConfigSource::Defaulted(e) => {
                warn!(target: "config", "Invalid config {}: {}; using defaults", path.display(), e)
            }
        }
    }
}

impl GameConfig {
    //--- Loading ----------------------------------------------------------

    /// Loads the config at `path`, creating it with defaults if missing.
    ///
    /// A file that fails to parse is reported and left as is; the game
    /// continues on defaults.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let (config, source) = Self::load(path)?;
        source.log(path);
        Ok(config)
    }

    /// Like [`load_or_create`](Self::load_or_create) but leaves logging to
    /// the caller, for use before the logger is installed.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let path = path.as_ref();
        match Self::read(path)? {
            (config, ConfigSource::Missing) => {
                config.save(path)?;
                Ok((config, ConfigSource::Created))
            }
            loaded => Ok(loaded),
        }
    }

    /// Like [`load`](Self::load) but never writes; a missing file yields
    /// defaults and [`ConfigSource::Missing`].
    pub fn read(path: impl AsRef<Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Missing));
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(match toml::from_str(&text) {
            Ok(config) => (config, ConfigSource::Loaded),
            Err(e) => (Self::default(), ConfigSource::Defaulted(e.to_string())),
        })
    }

    /// Writes the config as pretty TOML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(io_err)
    }

    //--- Path Helpers -----------------------------------------------------

    /// `assets/audio/{category}/{filename}` where category is one of the
    /// configured subdirectories (`sfx`, `music`, `voice`) or any literal.
    pub fn audio_file_path(&self, category: &str, filename: &str) -> PathBuf {
        let sub = match category {
            "sfx" => self.audio.sfx_path.as_str(),
            "music" => self.audio.music_path.as_str(),
            "voice" => self.audio.voice_path.as_str(),
            other => other,
        };
        self.audio.audio_path.join(sub).join(filename)
    }

    pub fn font_path(&self) -> PathBuf {
        self.display.font_path.join(&self.display.default_font)
    }

    pub fn save_path(&self, filename: &str) -> PathBuf {
        self.game.save_path.join(filename)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
