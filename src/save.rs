//=========================================================================
// Save Store
//=========================================================================
//
// Single-slot JSON save at `{save_path}/save_game.json`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::scene::SceneId;
use crate::emotion::EmotionSnapshot;
use crate::error::SaveError;

pub const SAVE_FILE_NAME: &str = "save_game.json";

//=== SaveGame ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub current_scene: SceneId,
    #[serde(default)]
    pub game_data: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub emotions: EmotionSnapshot,
    #[serde(default)]
    pub scene_states: BTreeMap<SceneId, serde_json::Value>,
    /// RFC 3339 local time.
    #[serde(default)]
    pub saved_at: String,
}

//=== SaveStore ===========================================================

#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SAVE_FILE_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `save`, stamping `saved_at` with the current time.
    pub fn save(&self, save: &mut SaveGame) -> Result<PathBuf, SaveError> {
        save.saved_at = chrono::Local::now().to_rfc3339();

        fs::create_dir_all(&self.dir)?;
        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(save)?)?;

        info!("Game saved to {}", path.display());
        Ok(path)
    }

    /// Reads the save, `Ok(None)` when there is none yet.
    pub fn load(&self) -> Result<Option<SaveGame>, SaveError> {
        let text = match fs::read_to_string(self.path()) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No save file found at {}", self.path().display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let save: SaveGame = serde_json::from_str(&text)?;
        info!("Game loaded from {} (saved {})", self.path().display(), save.saved_at);
        Ok(Some(save))
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
