//=========================================================================
// Frame Composer
//=========================================================================
//
// Software RGBA surface built from the current scene view.
//
// Layout (window pixels):
//   emotion bars   x=20,  y=20+i*30, 200×20
//   text panel     x=50,  y=180, (w-100)×200, one strip per text line
//   choice boxes   SceneView::choice_rect(i, w)
//   debug strip    bottom 70 px while debug mode is on
//
// Text is not rasterised; the caption sidecar carries it instead.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Write as _;

//=== Internal Dependencies ===============================================

use crate::core::scene::{Rect, SceneView};
use crate::emotion::{EmotionKind, EmotionSystem};

//=== Colours =============================================================

type Rgb = [u8; 3];

const BAR_BACKGROUND: Rgb = [50, 50, 50];
const BORDER: Rgb = [200, 200, 200];
const TEXT_STRIP: Rgb = [220, 220, 220];
const CHOICE_FILL: Rgb = [60, 60, 90];
const DEBUG_FILL: Rgb = [0, 0, 0];
const DEBUG_MARK: Rgb = [255, 255, 0];

/// Background colour for a scene's background key.
pub fn background_color(key: Option<&str>) -> Rgb {
    match key {
        Some("morning_fog") => [70, 80, 90],
        Some("evening_courtyard") => [80, 50, 40],
        Some("sunset_hillside") => [110, 50, 40],
        Some("rainy_night") => [15, 20, 35],
        Some("system_interface") => [10, 30, 40],
        Some("menu") => [20, 20, 40],
        _ => [30, 30, 50],
    }
}

//=== DebugOverlay ========================================================

/// Lines shown in the debug strip.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugOverlay {
    pub tps: f64,
    pub scene: String,
    pub loaded_sounds: usize,
}

impl DebugOverlay {
    pub fn lines(&self) -> [String; 3] {
        [
            format!("TPS: {:.1}", self.tps),
            format!("Scene: {}", self.scene),
            format!("Loaded Sounds: {}", self.loaded_sounds),
        ]
    }
}

//=== FrameSource =========================================================

/// Everything a frame is composed from.
#[derive(Debug, Clone, Copy)]
pub struct FrameSource<'a> {
    pub scene: Option<&'a str>,
    pub view: &'a SceneView,
    pub emotions: &'a EmotionSystem,
    pub overlay: Option<&'a DebugOverlay>,
}

impl FrameSource<'_> {
    /// Plain-text rendition written next to each screenshot.
    pub fn caption(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "scene: {}", self.scene.unwrap_or("-"));
        let _ = writeln!(out, "title: {}", self.view.title);
        let _ = writeln!(out, "text_complete: {}", self.view.text_complete);
        out.push_str("---\n");
        out.push_str(&self.view.body);
        if !self.view.body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("---\n");
        for (i, choice) in self.view.choices.iter().enumerate() {
            let _ = writeln!(out, "[{}] {}", i + 1, choice);
        }

        let emotions: Vec<String> = EmotionKind::ALL
            .iter()
            .map(|kind| format!("{} {:.0}", kind.label(), self.emotions.value(*kind)))
            .collect();
        let _ = writeln!(out, "emotions: {}", emotions.join(" | "));

        if let Some(overlay) = self.overlay {
            let _ = writeln!(out, "debug: {}", overlay.lines().join(" | "));
        }
        out
    }
}

//=== Framebuffer =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut frame = Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        };
        frame.fill([0, 0, 0]);
        frame
    }

    /// Draws `source` onto a fresh `width`×`height` surface.
    pub fn compose(source: &FrameSource<'_>, width: u32, height: u32) -> Self {
        let mut frame = Self::new(width, height);
        let view = source.view;

        frame.fill(background_color(view.background.as_deref()));
        frame.draw_text_panel(view);

        for i in 0..view.choices.len() {
            let rect = SceneView::choice_rect(i, width);
            frame.fill_rect(rect, CHOICE_FILL);
            frame.stroke_rect(rect, BORDER);
        }

        frame.draw_emotion_bars(source.emotions);

        if source.overlay.is_some() {
            let strip = Rect { x: 0, y: height as i32 - 70, width, height: 70 };
            frame.fill_rect(strip, DEBUG_FILL);
            frame.fill_rect(Rect { x: 10, y: height as i32 - 60, width: 8, height: 8 }, DEBUG_MARK);
        }

        frame
    }

    //--- Accessors --------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 rows, top to bottom.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    //--- Drawing ----------------------------------------------------------

    pub fn fill(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color[0], color[1], color[2], 255]);
        }
    }

    /// Fills `rect`, clipped to the surface.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let x0 = rect.x.clamp(0, self.width as i32) as usize;
        let y0 = rect.y.clamp(0, self.height as i32) as usize;
        let x1 = (rect.x + rect.width as i32).clamp(0, self.width as i32) as usize;
        let y1 = (rect.y + rect.height as i32).clamp(0, self.height as i32) as usize;

        let stride = self.width as usize * 4;
        for y in y0..y1 {
            let row = &mut self.pixels[y * stride + x0 * 4..y * stride + x1 * 4];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&[color[0], color[1], color[2], 255]);
            }
        }
    }

    /// One-pixel outline.
    pub fn stroke_rect(&mut self, rect: Rect, color: Rgb) {
        let Rect { x, y, width, height } = rect;
        self.fill_rect(Rect { x, y, width, height: 1 }, color);
        self.fill_rect(Rect { x, y: y + height as i32 - 1, width, height: 1 }, color);
        self.fill_rect(Rect { x, y, width: 1, height }, color);
        self.fill_rect(Rect { x: x + width as i32 - 1, y, width: 1, height }, color);
    }

    fn draw_text_panel(&mut self, view: &SceneView) {
        const LINE_HEIGHT: i32 = 28;
        const CHAR_WIDTH: u32 = 12;

        let panel = Rect {
            x: 50,
            y: 180,
            width: self.width.saturating_sub(100),
            height: 200,
        };
        let background = background_color(view.background.as_deref());
        self.fill_rect(panel, background.map(|c| c / 2));

        let max_width = panel.width.saturating_sub(40);
        let max_lines = (panel.height as i32 - 20) / LINE_HEIGHT;
        for (i, line) in view.body.lines().take(max_lines as usize).enumerate() {
            let chars = line.chars().count() as u32;
            if chars == 0 {
                continue;
            }
            let strip = Rect {
                x: panel.x + 20,
                y: panel.y + 20 + i as i32 * LINE_HEIGHT,
                width: (chars * CHAR_WIDTH).min(max_width),
                height: 4,
            };
            self.fill_rect(strip, TEXT_STRIP);
        }
    }

    fn draw_emotion_bars(&mut self, emotions: &EmotionSystem) {
        const BAR_WIDTH: u32 = 200;

        for (i, kind) in EmotionKind::ALL.iter().enumerate() {
            let bar = Rect { x: 20, y: 20 + i as i32 * 30, width: BAR_WIDTH, height: 20 };
            self.fill_rect(bar, BAR_BACKGROUND);

            let fraction = emotions.percentage(*kind).clamp(0.0, 1.0);
            let filled = (f64::from(BAR_WIDTH) * fraction) as u32;
            if filled > 0 {
                self.fill_rect(Rect { width: filled, ..bar }, kind.bar_color());
            }
            self.stroke_rect(bar, BORDER);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> SceneView {
        SceneView {
            title: "晨雾".to_string(),
            body: "第一行\n第二行".to_string(),
            choices: vec!["继续".to_string(), "离开".to_string()],
            text_complete: true,
            background: Some("morning_fog".to_string()),
        }
    }

    #[test]
    fn compose_paints_background_bars_and_choices() {
        let view = view();
        let mut emotions = EmotionSystem::new(0.0, 100.0, 0.0);
        emotions.update(EmotionKind::Obsession, 50.0, 0.0);
        let source = FrameSource { scene: Some("CH0_PHASE_01"), view: &view, emotions: &emotions, overlay: None };

        let frame = Framebuffer::compose(&source, 1280, 720);

        assert_eq!(frame.pixel(1270, 10), Some([70, 80, 90, 255]));
        // Obsession bar half filled
        assert_eq!(frame.pixel(60, 30), Some([255, 100, 100, 255]));
        assert_eq!(frame.pixel(150, 30), Some([50, 50, 50, 255]));
        // Second choice box interior
        assert_eq!(frame.pixel(640, 485), Some([60, 60, 90, 255]));
        assert_eq!(frame.pixel(640, 545), Some([70, 80, 90, 255]));
    }

    #[test]
    fn overlay_adds_debug_strip() {
        let view = SceneView::default();
        let emotions = EmotionSystem::default();
        let overlay = DebugOverlay { tps: 60.0, scene: "main_menu".into(), loaded_sounds: 3 };
        let source = FrameSource { scene: None, view: &view, emotions: &emotions, overlay: Some(&overlay) };

        let frame = Framebuffer::compose(&source, 320, 240);

        assert_eq!(frame.pixel(300, 230), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(300, 100), Some([30, 30, 50, 255]));
        assert_eq!(frame.as_bytes().len(), 320 * 240 * 4);
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut frame = Framebuffer::new(10, 10);
        frame.fill_rect(Rect { x: -5, y: 8, width: 100, height: 100 }, [9, 9, 9]);

        assert_eq!(frame.pixel(0, 9), Some([9, 9, 9, 255]));
        assert_eq!(frame.pixel(9, 7), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(10, 0), None);
    }

    #[test]
    fn caption_lists_text_choices_and_emotions() {
        let view = view();
        let emotions = EmotionSystem::default();
        let overlay = DebugOverlay { tps: 60.0, scene: "CH0_PHASE_01".into(), loaded_sounds: 0 };
        let source = FrameSource {
            scene: Some("CH0_PHASE_01"),
            view: &view,
            emotions: &emotions,
            overlay: Some(&overlay),
        };

        let caption = source.caption();

        assert!(caption.starts_with("scene: CH0_PHASE_01\ntitle: 晨雾\n"));
        assert!(caption.contains("第一行\n第二行\n---\n[1] 继续\n[2] 离开\n"));
        assert!(caption.contains("emotions: 执念 0 | 愤怒 0"));
        assert!(caption.contains("debug: TPS: 60.0 | Scene: CH0_PHASE_01 | Loaded Sounds: 0"));
    }
}
