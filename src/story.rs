//=========================================================================
// Story Catalog
//=========================================================================
//
// Data model and loader for scripted scenes.
//
// Architecture:
//   prologue.toml ──serde──> Story
//                              └─ SceneScript (CH0_PHASE_01, ...)
//                                   └─ StoryEvent (CH0_E01, ...)
//                                        └─ Choice (effects, next_scene)
//
// The built-in story is embedded at compile time; `Story::load` reads an
// override from disk. `validate()` must pass against the scene registry
// before the game starts.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

//=== Internal Dependencies ===============================================

use crate::emotion::{EmotionKind, EmotionSystem};
use crate::error::StoryError;

const BUILTIN_STORY: &str = include_str!("../assets/story/prologue.toml");

//=== ChoiceType ==========================================================

/// What a choice primarily influences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceType {
    #[default]
    Emotion,
    Story,
    System,
}

//=== Choice ==============================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,

    #[serde(default, rename = "type")]
    pub kind: ChoiceType,

    /// Emotion label → delta.
    #[serde(default)]
    pub effects: BTreeMap<String, i32>,

    /// Jump target, taken instead of advancing to the next event.
    #[serde(default)]
    pub next_scene: Option<String>,

    /// Emotion label → minimum value required to offer this choice.
    #[serde(default)]
    pub conditions: BTreeMap<String, f64>,
}

impl Choice {
    /// `true` when every condition is met. Unknown emotions never pass.
    pub fn is_available(&self, emotions: &EmotionSystem) -> bool {
        self.conditions.iter().all(|(name, minimum)| {
            EmotionKind::from_name(name)
                .is_some_and(|kind| emotions.check_threshold(kind, *minimum))
        })
    }
}

//=== StoryEvent ==========================================================

/// One passage of text with the choices offered after it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoryEvent {
    pub id: String,
    pub text: String,

    #[serde(default, rename = "choice")]
    pub choices: Vec<Choice>,

    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub ambient_sound: Option<String>,
    #[serde(default)]
    pub music: Option<String>,
}

//=== SceneScript =========================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneScript {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,

    #[serde(default, rename = "event")]
    pub events: Vec<StoryEvent>,

    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub ambient_sound: Option<String>,
    #[serde(default)]
    pub music: Option<String>,

    /// Scene entered after the last event; restart when absent.
    #[serde(default)]
    pub next_scene: Option<String>,
}

//=== Story ===============================================================

/// Ordered collection of scene scripts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Story {
    #[serde(default, rename = "scene")]
    scenes: Vec<SceneScript>,
}

impl Story {
    //--- Loading ----------------------------------------------------------

    /// The story shipped with the game.
    pub fn builtin() -> Result<Self, StoryError> {
        Self::from_toml_str(BUILTIN_STORY)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, StoryError> {
        let story: Story = toml::from_str(text)?;

        let mut seen = HashSet::new();
        for scene in &story.scenes {
            if !seen.insert(scene.id.as_str()) {
                return Err(StoryError::Duplicate(scene.id.clone()));
            }
            if scene.events.is_empty() {
                return Err(StoryError::Empty(scene.id.clone()));
            }
        }

        Ok(story)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoryError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    //--- Queries ----------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&SceneScript> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    pub fn scenes(&self) -> &[SceneScript] {
        &self.scenes
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|scene| scene.id.as_str())
    }

    //--- Validation -------------------------------------------------------

    /// Checks every jump target and emotion label.
    ///
    /// `is_registered` answers whether a scene id exists in the registry.
    pub fn validate(&self, is_registered: impl Fn(&str) -> bool) -> Result<(), StoryError> {
        for scene in &self.scenes {
            if let Some(target) = &scene.next_scene {
                if !is_registered(target) {
                    return Err(StoryError::UnknownTarget {
                        source_id: scene.id.clone(),
                        target: target.clone(),
                    });
                }
            }

            for choice in scene.events.iter().flat_map(|event| &event.choices) {
                if let Some(target) = &choice.next_scene {
                    if !is_registered(target) {
                        return Err(StoryError::UnknownTarget {
                            source_id: choice.id.clone(),
                            target: target.clone(),
                        });
                    }
                }

                let labels = choice.effects.keys().chain(choice.conditions.keys());
                for name in labels {
                    if EmotionKind::from_name(name).is_none() {
                        return Err(StoryError::UnknownEmotion {
                            choice: choice.id.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(ids: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |id| ids.iter().any(|known| *known == id)
    }

    //=====================================================================
    // Built-in Story
    //=====================================================================

    #[test]
    fn builtin_story_parses_all_phases() {
        let story = Story::builtin().unwrap();
        let ids: Vec<_> = story.ids().collect();

        assert_eq!(
            ids,
            ["CH0_PHASE_01", "CH0_PHASE_02", "CH0_PHASE_03", "CH0_PHASE_04", "CH1_PHASE_01"]
        );
    }

    #[test]
    fn builtin_story_content_is_intact() {
        let story = Story::builtin().unwrap();

        let first = &story.get("CH0_PHASE_01").unwrap().events[0];
        assert!(first.text.starts_with("【晨雾·青云宗演武场】\n\n薄雾"));
        assert_eq!(first.choices[1].effects["愤怒"], 15);

        let father = &story.get("CH0_PHASE_02").unwrap().events[1];
        assert!(father.text.ends_with("就滚出青云宗。\""));

        let awakening = &story.get("CH0_PHASE_04").unwrap().events[2];
        assert!(awakening
            .choices
            .iter()
            .all(|c| c.next_scene.as_deref() == Some("CH1_PHASE_01") && c.kind == ChoiceType::System));
    }

    #[test]
    fn builtin_story_validates_against_its_own_ids() {
        let story = Story::builtin().unwrap();
        let ids: Vec<String> = story.ids().map(String::from).collect();

        assert!(story.validate(|id| ids.iter().any(|known| known == id)).is_ok());
    }

    //=====================================================================
    // Validation
    //=====================================================================

    #[test]
    fn unknown_jump_target_is_rejected() {
        let story = Story::from_toml_str(
            r#"
            [[scene]]
            id = "A"
            title = "a"
            [[scene.event]]
            id = "A1"
            text = "..."
            [[scene.event.choice]]
            id = "A1X"
            text = "go"
            next_scene = "B"
            "#,
        )
        .unwrap();

        match story.validate(registered(&["A"])) {
            Err(StoryError::UnknownTarget { source_id, target }) => {
                assert_eq!(source_id, "A1X");
                assert_eq!(target, "B");
            }
            other => panic!("Expected UnknownTarget, got {:?}", other),
        }
        assert!(story.validate(registered(&["A", "B"])).is_ok());
    }

    #[test]
    fn unknown_emotion_label_is_rejected() {
        let story = Story::from_toml_str(
            r#"
            [[scene]]
            id = "A"
            title = "a"
            [[scene.event]]
            id = "A1"
            text = "..."
            [[scene.event.choice]]
            id = "A1X"
            text = "smile"
            effects = { "快乐" = 3 }
            "#,
        )
        .unwrap();

        assert!(matches!(
            story.validate(registered(&["A"])),
            Err(StoryError::UnknownEmotion { .. })
        ));
    }

    #[test]
    fn duplicate_and_empty_scenes_fail_to_load() {
        let duplicate = r#"
            [[scene]]
            id = "A"
            title = "a"
            [[scene.event]]
            id = "A1"
            text = "..."
            [[scene]]
            id = "A"
            title = "again"
            [[scene.event]]
            id = "A2"
            text = "..."
        "#;
        assert!(matches!(Story::from_toml_str(duplicate), Err(StoryError::Duplicate(id)) if id == "A"));

        let empty = "[[scene]]\nid = \"E\"\ntitle = \"e\"\n";
        assert!(matches!(Story::from_toml_str(empty), Err(StoryError::Empty(id)) if id == "E"));
    }

    //=====================================================================
    // Conditions
    //=====================================================================

    #[test]
    fn conditions_gate_availability() {
        let choice = Choice {
            id: "gated".to_string(),
            text: "...".to_string(),
            kind: ChoiceType::Story,
            effects: BTreeMap::new(),
            next_scene: None,
            conditions: BTreeMap::from([("决心".to_string(), 30.0)]),
        };
        let mut emotions = EmotionSystem::new(0.0, 100.0, 0.0);

        assert!(!choice.is_available(&emotions));
        emotions.update(EmotionKind::Determination, 30.0, 0.0);
        assert!(choice.is_available(&emotions));
    }
}
