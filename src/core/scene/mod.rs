//=========================================================================
// Scene System
//=========================================================================
//
// Named scenes with a single current scene and queued transitions.
//
// Architecture:
//   SceneManager
//     ├─ scenes: HashMap<SceneId, Box<dyn Scene>>
//     ├─ current: Option<SceneId>
//     └─ states: BTreeMap<SceneId, serde_json::Value> (exit snapshots)
//
// Flow:
//   update() → Scene::update() → ctx.scene_transitions.push(id)
//   tick boundary → transition(id) → on_exit / snapshot / on_enter
//
//=========================================================================

//=== External Dependencies ===============================================

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::globals::GlobalContext;

//=== Module Declarations =================================================

mod scene_manager;
mod transition_queue;

//=== Public API ==========================================================

pub use scene_manager::SceneManager;
pub use transition_queue::TransitionQueue;

//=== SceneId =============================================================

/// Registry key of a scene (`main_menu`, `CH0_PHASE_01`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SceneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for SceneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

//=== Layout ==============================================================

/// Axis-aligned pixel rectangle on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.width as i32) as f32
            && py < (self.y + self.height as i32) as f32
    }
}

const CHOICE_WIDTH: u32 = 600;
const CHOICE_HEIGHT: u32 = 50;
const CHOICE_TOP: i32 = 400;
const CHOICE_SPACING: i32 = 60;

//=== SceneView ===========================================================

/// What a scene currently shows. Feeds the frame composer, screenshot
/// captions and mouse hit-testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneView {
    pub title: String,
    /// Revealed portion of the current passage.
    pub body: String,
    /// Choices on offer, already filtered by availability.
    pub choices: Vec<String>,
    pub text_complete: bool,
    /// Background key looked up in the composer's palette.
    pub background: Option<String>,
}

impl SceneView {
    /// Box of the `index`-th choice, centred on a surface `surface_width`
    /// pixels wide.
    pub fn choice_rect(index: usize, surface_width: u32) -> Rect {
        Rect {
            x: surface_width as i32 / 2 - CHOICE_WIDTH as i32 / 2,
            y: CHOICE_TOP + index as i32 * CHOICE_SPACING,
            width: CHOICE_WIDTH,
            height: CHOICE_HEIGHT,
        }
    }

    /// Index of the choice box under `(x, y)`, if any.
    pub fn choice_at(&self, x: f32, y: f32, surface_width: u32) -> Option<usize> {
        (0..self.choices.len()).find(|&i| Self::choice_rect(i, surface_width).contains(x, y))
    }
}

//=== Scene Trait =========================================================

/// A registered unit of game content.
///
/// Only `update()` and `view()` are required:
///
/// ```rust
/// use simulate_to_survive::core::globals::GlobalContext;
/// use simulate_to_survive::core::scene::{Scene, SceneView};
///
/// struct Splash;
///
/// impl Scene for Splash {
///     fn update(&mut self, _ctx: &mut GlobalContext) {}
///
///     fn view(&self) -> SceneView {
///         SceneView { title: "splash".into(), ..SceneView::default() }
///     }
/// }
/// ```
pub trait Scene {
    /// Called when the scene becomes current.
    fn on_enter(&mut self, _ctx: &mut GlobalContext) {}

    /// Called when another scene replaces this one.
    fn on_exit(&mut self, _ctx: &mut GlobalContext) {}

    /// Called every tick while current.
    fn update(&mut self, ctx: &mut GlobalContext);

    fn view(&self) -> SceneView;

    /// State recorded when the scene exits. `Null` records nothing.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    /// Reinstates a snapshot taken by [`snapshot`](Self::snapshot).
    fn restore(&mut self, _state: &serde_json::Value) {}

    /// Whether the periodic autosave should run while this scene is current.
    fn autosaves(&self) -> bool {
        false
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_boxes_stack_downward_centred() {
        let first = SceneView::choice_rect(0, 1280);
        let third = SceneView::choice_rect(2, 1280);

        assert_eq!(first, Rect { x: 340, y: 400, width: 600, height: 50 });
        assert_eq!(third.y, 520);
        assert_eq!(third.x, first.x);
    }

    #[test]
    fn choice_hit_testing() {
        let view = SceneView {
            choices: vec!["a".into(), "b".into()],
            ..SceneView::default()
        };

        assert_eq!(view.choice_at(640.0, 425.0, 1280), Some(0));
        assert_eq!(view.choice_at(640.0, 485.0, 1280), Some(1));
        assert_eq!(view.choice_at(640.0, 455.0, 1280), None, "gap between boxes");
        assert_eq!(view.choice_at(640.0, 545.0, 1280), None, "third box not offered");
        assert_eq!(view.choice_at(100.0, 425.0, 1280), None);
    }

    #[test]
    fn scene_id_conversions() {
        let id = SceneId::from("CH0_PHASE_01");
        assert_eq!(id.as_str(), "CH0_PHASE_01");
        assert_eq!(id.to_string(), "CH0_PHASE_01");
        assert_eq!(id, SceneId::new(String::from("CH0_PHASE_01")));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CH0_PHASE_01\"");
    }
}
