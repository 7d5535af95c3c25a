//=========================================================================
// Log Rotation
//=========================================================================
//
// Keep-count retention for `*.log` files in one directory.
//
// Files are ordered newest first by modification time, ties broken by
// name (timestamped names sort newer-last, so descending).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use log::{info, warn};

//=== LogFile =============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl LogFile {
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Modification time as `%Y-%m-%d %H:%M:%S` local time.
    pub fn modified_display(&self) -> String {
        DateTime::<Local>::from(self.modified)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

//=== CleanReport =========================================================

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub kept: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// Files whose removal failed, with the error text.
    pub failed: Vec<(PathBuf, String)>,
}

//=== Operations ==========================================================

/// Lists `*.log` files in `dir`, newest first.
///
/// A missing directory lists as empty.
pub fn list(dir: impl AsRef<Path>) -> io::Result<Vec<LogFile>> {
    let entries = match fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("log") {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        files.push(LogFile {
            path,
            size: metadata.len(),
            modified: metadata.modified()?,
        });
    }

    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
    Ok(files)
}

/// Deletes all but the `keep` newest logs. `keep == 0` deletes every log.
pub fn clean(dir: impl AsRef<Path>, keep: usize) -> io::Result<CleanReport> {
    let dir = dir.as_ref();
    let files = list(dir)?;
    let mut report = CleanReport::default();

    for (i, file) in files.into_iter().enumerate() {
        if keep > 0 && i < keep {
            report.kept.push(file.path);
            continue;
        }
        match fs::remove_file(&file.path) {
            Ok(()) => report.deleted.push(file.path),
            Err(e) => {
                warn!("Failed to delete {}: {}", file.path.display(), e);
                report.failed.push((file.path, e.to_string()));
            }
        }
    }

    if !report.deleted.is_empty() {
        info!(
            "Log rotation in {}: kept {}, deleted {}",
            dir.display(),
            report.kept.len(),
            report.deleted.len()
        );
    }
    Ok(report)
}

//=========================================================================
// Unit Tests
//=========================================================================
