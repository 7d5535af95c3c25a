//=========================================================================
// Screenshot Writer
//=========================================================================
//
// Writes `{dir}/{name}_{YYYYmmdd_HHMMSS}.png` plus a `.txt` caption.
// A second capture with the same name inside one second gets `_2`, `_3`...
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use log::info;

//=== Internal Dependencies ===============================================

use super::frame::Framebuffer;
use crate::error::CaptureError;

//=== ScreenshotWriter ====================================================

#[derive(Debug, Clone)]
pub struct ScreenshotWriter {
    dir: PathBuf,
}

impl ScreenshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encodes `frame` as PNG and writes `caption` beside it.
    pub fn write(&self, name: &str, frame: &Framebuffer, caption: &str) -> Result<PathBuf, CaptureError> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.write_at(name, &timestamp, frame, caption)
    }

    fn write_at(
        &self,
        name: &str,
        timestamp: &str,
        frame: &Framebuffer,
        caption: &str,
    ) -> Result<PathBuf, CaptureError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.unique_path(&format!("{}_{}", sanitize(name), timestamp));

        let file = BufWriter::new(File::create(&path)?);
        PngEncoder::new(file).write_image(
            frame.as_bytes(),
            frame.width(),
            frame.height(),
            ColorType::Rgba8,
        )?;
        fs::write(path.with_extension("txt"), caption)?;

        info!(target: "debug", "Screenshot saved: {}", path.display());
        Ok(path)
    }

    fn unique_path(&self, stem: &str) -> PathBuf {
        let first = self.dir.join(format!("{}.png", stem));
        if !first.exists() {
            return first;
        }
        (2..)
            .map(|n| self.dir.join(format!("{}_{}.png", stem, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

/// Keeps scene ids and similar names filesystem-safe.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_png_and_caption() {
        let dir = TempDir::new().unwrap();
        let writer = ScreenshotWriter::new(dir.path().join("shots"));
        let frame = Framebuffer::new(4, 3);

        let path = writer.write("manual_screenshot", &frame, "scene: main_menu\n").unwrap();

        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("manual_screenshot_"));
        assert!(file_name.ends_with(".png"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(fs::read_to_string(path.with_extension("txt")).unwrap(), "scene: main_menu\n");
    }

    #[test]
    fn same_second_collisions_get_suffix() {
        let dir = TempDir::new().unwrap();
        let writer = ScreenshotWriter::new(dir.path());
        let frame = Framebuffer::new(2, 2);

        let a = writer.write_at("shot", "20250101_120000", &frame, "").unwrap();
        let b = writer.write_at("shot", "20250101_120000", &frame, "").unwrap();
        let c = writer.write_at("shot", "20250101_120000", &frame, "").unwrap();

        assert!(a.ends_with("shot_20250101_120000.png"));
        assert!(b.ends_with("shot_20250101_120000_2.png"));
        assert!(c.ends_with("shot_20250101_120000_3.png"));
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize("scene_CH0_PHASE_01"), "scene_CH0_PHASE_01");
        assert_eq!(sanitize("a/b c"), "a_b_c");
    }
}
