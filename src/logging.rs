//=========================================================================
// Logging
//=========================================================================
//
// env_logger backend writing to stderr and to a per-run log file.
//
//   logs/{app}_{YYYYmmdd_HHMMSS}.log
//
// `RUST_LOG` overrides the default `info` filter. Old logs are rotated
// right after the logger is installed so the rotation itself is logged.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};
use log::{info, warn};

//=== Internal Dependencies ===============================================

use crate::debug::log_rotation;

//=== TeeWriter ===========================================================

/// Duplicates every write to stderr and a file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

//=== Setup ===============================================================

/// Path of a fresh log file for `app` inside `dir`.
pub fn log_file_path(dir: &Path, app: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.log", app, timestamp))
}

/// Installs the global logger and rotates old logs down to `keep`.
///
/// Falls back to stderr only when the log file cannot be created. Returns
/// the log file in use, if any. Calling this twice leaves the first
/// logger in place.
pub fn init(dir: &Path, app: &str, keep: usize) -> Option<PathBuf> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    let file = fs::create_dir_all(dir)
        .and_then(|()| {
            let path = log_file_path(dir, app);
            File::create(&path).map(|file| (path, file))
        });

    let (log_path, file_error) = match file {
        Ok((path, file)) => {
            builder.target(Target::Pipe(Box::new(TeeWriter { file })));
            (Some(path), None)
        }
        Err(e) => (None, Some(e)),
    };

    if builder.try_init().is_err() {
        return None;
    }

    if let Some(e) = file_error {
        warn!("Logging to stderr only, cannot create log file in {}: {}", dir.display(), e);
    }
    if let Some(path) = &log_path {
        info!("Logging to {}", path.display());
    }

    if keep > 0 {
        if let Err(e) = log_rotation::clean(dir, keep) {
            warn!("Log rotation failed in {}: {}", dir.display(), e);
        }
    }

    log_path
}

/// Installs a stderr-only logger, for commands that must not add a log
/// file of their own.
pub fn init_stderr() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

//=========================================================================
// Unit Tests
//=========================================================================
