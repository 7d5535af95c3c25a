//=========================================================================
// Audio Catalog
//=========================================================================
//
// Sound ids discovered under the audio root.
//
//   sfx/{environment,foley,ui}/*.wav  → {category}_{stem}
//   music/*.wav                       → music_{stem}
//   music/{subdir}/*.wav              → {subdir}_{stem}
//   voice/*.wav                       → voice_{stem}
//
// Missing directories are skipped. Files are not decoded.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::config::AudioSettings;

const SFX_CATEGORIES: [&str; 3] = ["environment", "foley", "ui"];

//=== AudioCatalog ========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioCatalog {
    sounds: BTreeMap<String, PathBuf>,
}

impl AudioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans the directories named by `settings`.
    pub fn scan(settings: &AudioSettings) -> Self {
        let root = &settings.audio_path;
        let mut catalog = Self::new();

        let sfx = root.join(&settings.sfx_path);
        for category in SFX_CATEGORIES {
            catalog.load_dir(&sfx.join(category), category);
        }

        let music = root.join(&settings.music_path);
        catalog.load_dir(&music, "music");
        for subdir in subdirectories(&music) {
            if let Some(prefix) = subdir.file_name().and_then(|name| name.to_str()) {
                let prefix = prefix.to_string();
                catalog.load_dir(&subdir, &prefix);
            }
        }

        catalog.load_dir(&root.join(&settings.voice_path), "voice");

        debug!(target: "audio", "Audio catalog: {} sounds under {}", catalog.len(), root.display());
        catalog
    }

    /// Adds one entry; a duplicate id keeps the newer path.
    pub fn insert(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) {
        let id = id.into();
        let path = path.into();
        debug!(target: "audio", "Loaded audio: {}", id);
        if let Some(previous) = self.sounds.insert(id.clone(), path) {
            warn!(target: "audio", "Sound id {} also provided by {}", id, previous.display());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sounds.contains_key(id)
    }

    pub fn path(&self, id: &str) -> Option<&Path> {
        self.sounds.get(id).map(PathBuf::as_path)
    }

    /// Sorted ids.
    pub fn ids(&self) -> Vec<String> {
        self.sounds.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn load_dir(&mut self, dir: &Path, prefix: &str) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => {
                debug!(target: "audio", "Skipping missing audio directory {}", dir.display());
                return;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_wav(path))
            .collect();
        files.sort();

        for path in files {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                let id = format!("{}_{}", prefix, stem);
                self.insert(id, path.clone());
            }
        }
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

//=========================================================================
// Unit Tests
//=========================================================================
