//=========================================================================
// Story Scene
//=========================================================================
//
// Plays one SceneScript event by event.
//
// Event flow:
//   start_event → typewriter reveal → choices offered → select
//     ├─ choice.next_scene → queue transition
//     └─ otherwise next event; after the last, the scene's next_scene
//        or back to event 0
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info};
use serde_json::json;

//=== Internal Dependencies ===============================================

use super::actions::GameAction;
use super::typewriter::Typewriter;
use crate::audio::AudioCommand;
use crate::core::globals::GlobalContext;
use crate::core::scene::{Scene, SceneView};
use crate::story::{SceneScript, StoryEvent};

const AMBIENT_FADE_IN_MS: u32 = 1000;

//=== StoryScene ==========================================================

#[derive(Debug)]
pub struct StoryScene {
    script: SceneScript,
    event_index: usize,
    typewriter: Typewriter,
    /// Indices into the current event's choices that passed their
    /// conditions when the event started.
    available: Vec<usize>,
    /// Seconds the finished passage has waited for auto-advance.
    idle: f64,
    /// Set by `restore`; availability is recomputed on the next update.
    stale_choices: bool,
}

impl StoryScene {
    pub fn new(script: SceneScript) -> Self {
        Self {
            script,
            event_index: 0,
            typewriter: Typewriter::default(),
            available: Vec::new(),
            idle: 0.0,
            stale_choices: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.script.id
    }

    pub fn event_index(&self) -> usize {
        self.event_index
    }

    fn current_event(&self) -> Option<&StoryEvent> {
        self.script.events.get(self.event_index)
    }

    //--- Event Flow -------------------------------------------------------

    fn start_event(&mut self, ctx: &mut GlobalContext) {
        let Some(event) = self.script.events.get(self.event_index) else {
            return;
        };
        debug!("{}: event {} ({})", self.script.id, self.event_index + 1, event.id);

        self.typewriter.set_text(event.text.as_str());
        self.idle = 0.0;
        self.stale_choices = false;
        self.available = event
            .choices
            .iter()
            .enumerate()
            .filter(|(_, choice)| choice.is_available(&ctx.emotions))
            .map(|(i, _)| i)
            .collect();

        if let Some(sound) = &event.ambient_sound {
            ctx.message_bus.push(AudioCommand::PlayAmbient {
                sound: sound.clone(),
                fade_in_ms: AMBIENT_FADE_IN_MS,
            });
        }
        if let Some(track) = &event.music {
            ctx.message_bus.push(AudioCommand::PlayMusic { sound: track.clone(), looped: true });
        }
    }

    fn next_event(&mut self, ctx: &mut GlobalContext) {
        if self.event_index + 1 < self.script.events.len() {
            self.event_index += 1;
            self.start_event(ctx);
            return;
        }

        match &self.script.next_scene {
            Some(next) => {
                info!("{} finished, continuing to {}", self.script.id, next);
                ctx.scene_transitions.push(next.as_str());
            }
            None => {
                info!("{} finished, restarting", self.script.id);
                self.event_index = 0;
                self.start_event(ctx);
            }
        }
    }

    /// Applies the `offered`-th available choice (0-based).
    fn select(&mut self, offered: usize, ctx: &mut GlobalContext) -> bool {
        let Some(choice) = self
            .available
            .get(offered)
            .and_then(|&i| self.current_event().and_then(|event| event.choices.get(i)))
            .cloned()
        else {
            return false;
        };

        info!("Choice {}: {}", choice.id, choice.text);
        ctx.emotions.apply_effects(&choice.effects, ctx.clock.elapsed());

        match choice.next_scene {
            Some(next) => ctx.scene_transitions.push(next),
            None => self.next_event(ctx),
        }
        true
    }

    fn refresh_choices(&mut self, ctx: &GlobalContext) {
        self.available = self
            .current_event()
            .map(|event| {
                event
                    .choices
                    .iter()
                    .enumerate()
                    .filter(|(_, choice)| choice.is_available(&ctx.emotions))
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default();
        self.stale_choices = false;
    }
}

impl Scene for StoryScene {
    fn on_enter(&mut self, ctx: &mut GlobalContext) {
        info!("Entering {} ({})", self.script.id, self.script.title);

        if let Some(sound) = &self.script.ambient_sound {
            ctx.message_bus.push(AudioCommand::PlayAmbient {
                sound: sound.clone(),
                fade_in_ms: AMBIENT_FADE_IN_MS,
            });
        }
        if let Some(track) = &self.script.music {
            ctx.message_bus.push(AudioCommand::PlayMusic { sound: track.clone(), looped: true });
        }

        self.event_index = 0;
        self.start_event(ctx);
    }

    fn update(&mut self, ctx: &mut GlobalContext) {
        if self.stale_choices {
            self.refresh_choices(ctx);
        }

        let dt = ctx.clock.delta();
        self.typewriter.update(dt, ctx.display.text_speed);

        let actions = ctx.message_bus.read::<GameAction>().to_vec();
        for action in actions {
            match action {
                GameAction::Advance if !self.typewriter.is_complete() => {
                    self.typewriter.complete();
                }
                GameAction::Advance if self.available.is_empty() => {
                    self.next_event(ctx);
                    return;
                }
                GameAction::Choose(n) if self.typewriter.is_complete() && n > 0 => {
                    if self.select(usize::from(n) - 1, ctx) {
                        return;
                    }
                }
                GameAction::Click if self.typewriter.is_complete() => {
                    let (x, y) = ctx.input_state.mouse_position();
                    let hit = self.view().choice_at(x, y, ctx.display.window_width);
                    if let Some(offered) = hit {
                        if self.select(offered, ctx) {
                            return;
                        }
                    }
                }
                _ => {}
            }
        }

        if ctx.display.auto_advance && self.typewriter.is_complete() && self.available.is_empty() {
            self.idle += dt;
            if self.idle >= ctx.display.auto_advance_delay {
                self.next_event(ctx);
            }
        }
    }

    fn view(&self) -> SceneView {
        let complete = self.typewriter.is_complete();
        let event = self.current_event();

        let choices = match event {
            Some(event) if complete => self
                .available
                .iter()
                .filter_map(|&i| event.choices.get(i))
                .map(|choice| choice.text.clone())
                .collect(),
            _ => Vec::new(),
        };

        SceneView {
            title: format!(
                "{}  事件 {} / {}",
                self.script.title,
                self.event_index + 1,
                self.script.events.len()
            ),
            body: self.typewriter.visible().to_string(),
            choices,
            text_complete: complete,
            background: event
                .and_then(|event| event.background.clone())
                .or_else(|| self.script.background.clone()),
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({ "event_index": self.event_index })
    }

    fn restore(&mut self, state: &serde_json::Value) {
        let saved = state
            .get("event_index")
            .and_then(|value| value.as_u64())
            .unwrap_or(0) as usize;
        self.event_index = saved.min(self.script.events.len().saturating_sub(1));

        if let Some(event) = self.script.events.get(self.event_index) {
            self.typewriter.set_text(event.text.as_str());
            self.typewriter.complete();
            self.available = (0..event.choices.len()).collect();
        }
        self.idle = 0.0;
        self.stale_choices = true;
    }

    fn autosaves(&self) -> bool {
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::core::input::InputEvent;
    use crate::core::scene::SceneId;
    use crate::emotion::EmotionKind;
    use crate::story::Story;

    const TWO_EVENTS: &str = r#"
        [[scene]]
        id = "A"
        title = "Test"
        ambient_sound = "environment_gentle-rain"
        background = "rainy_night"

        [[scene.event]]
        id = "A1"
        text = "first"
        [[scene.event.choice]]
        id = "A1X"
        text = "stay"
        effects = { "愤怒" = 10 }
        [[scene.event.choice]]
        id = "A1Y"
        text = "brave"
        conditions = { "决心" = 50.0 }
        [[scene.event.choice]]
        id = "A1Z"
        text = "leave"
        next_scene = "B"

        [[scene.event]]
        id = "A2"
        text = "second"
    "#;

    fn scene_from(toml: &str, id: &str) -> StoryScene {
        let story = Story::from_toml_str(toml).unwrap();
        StoryScene::new(story.get(id).unwrap().clone())
    }

    fn context() -> GlobalContext {
        let mut config = GameConfig::default();
        config.game.emotion_decay_rate = 0.0;
        GlobalContext::new(&config)
    }

    fn act(scene: &mut StoryScene, ctx: &mut GlobalContext, action: GameAction) {
        ctx.message_bus.clear::<GameAction>();
        ctx.message_bus.push(action);
        scene.update(ctx);
        ctx.message_bus.clear::<GameAction>();
    }

    //=====================================================================
    // Entering
    //=====================================================================

    #[test]
    fn entering_starts_ambient_with_fade_in() {
        let mut scene = scene_from(TWO_EVENTS, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);

        assert_eq!(
            ctx.message_bus.take::<AudioCommand>(),
            [AudioCommand::PlayAmbient {
                sound: "environment_gentle-rain".to_string(),
                fade_in_ms: 1000,
            }]
        );
        assert_eq!(scene.view().background.as_deref(), Some("rainy_night"));
        assert!(!scene.view().text_complete);
    }

    //=====================================================================
    // Choices
    //=====================================================================

    #[test]
    fn choices_only_shown_and_taken_once_text_is_complete() {
        let mut scene = scene_from(TWO_EVENTS, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);

        act(&mut scene, &mut ctx, GameAction::Choose(1));
        assert_eq!(scene.event_index(), 0, "ignored while revealing");
        assert!(scene.view().choices.is_empty());

        act(&mut scene, &mut ctx, GameAction::Advance);
        assert_eq!(scene.view().choices, ["stay", "leave"], "gated choice hidden");

        act(&mut scene, &mut ctx, GameAction::Choose(1));
        assert_eq!(ctx.emotions.value(EmotionKind::Anger), 10.0);
        assert_eq!(scene.event_index(), 1);
    }

    #[test]
    fn jump_choice_queues_transition() {
        let mut scene = scene_from(TWO_EVENTS, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);

        act(&mut scene, &mut ctx, GameAction::Advance);
        // "leave" is offered second because "brave" is gated
        act(&mut scene, &mut ctx, GameAction::Choose(2));

        assert_eq!(ctx.scene_transitions.take(), [SceneId::from("B")]);
        assert_eq!(scene.event_index(), 0);
    }

    #[test]
    fn click_selects_the_box_under_the_cursor() {
        let mut scene = scene_from(TWO_EVENTS, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);
        act(&mut scene, &mut ctx, GameAction::Advance);

        let second = SceneView::choice_rect(1, ctx.display.window_width);
        ctx.input_state.process_events(&[InputEvent::MouseMoved {
            x: (second.x + 5) as f32,
            y: (second.y + 5) as f32,
        }]);
        act(&mut scene, &mut ctx, GameAction::Click);

        assert_eq!(ctx.scene_transitions.take(), [SceneId::from("B")]);
    }

    //=====================================================================
    // Event Flow
    //=====================================================================

    #[test]
    fn last_event_restarts_without_next_scene() {
        let mut scene = scene_from(TWO_EVENTS, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);
        act(&mut scene, &mut ctx, GameAction::Advance);
        act(&mut scene, &mut ctx, GameAction::Choose(1));

        // Second event has no choices: Advance finishes it, then moves on
        act(&mut scene, &mut ctx, GameAction::Advance);
        act(&mut scene, &mut ctx, GameAction::Advance);

        assert_eq!(scene.event_index(), 0);
        assert!(ctx.scene_transitions.is_empty());
    }

    #[test]
    fn last_event_follows_scene_next_scene() {
        let toml = r#"
            [[scene]]
            id = "A"
            title = "a"
            next_scene = "B"
            [[scene.event]]
            id = "A1"
            text = "only"
        "#;
        let mut scene = scene_from(toml, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);
        act(&mut scene, &mut ctx, GameAction::Advance);
        act(&mut scene, &mut ctx, GameAction::Advance);

        assert_eq!(ctx.scene_transitions.take(), [SceneId::from("B")]);
    }

    #[test]
    fn auto_advance_waits_for_the_delay() {
        let toml = r#"
            [[scene]]
            id = "A"
            title = "a"
            [[scene.event]]
            id = "A1"
            text = "x"
            [[scene.event]]
            id = "A2"
            text = "y"
        "#;
        let mut scene = scene_from(toml, "A");
        let mut config = GameConfig::default();
        config.display.auto_advance = true;
        config.display.auto_advance_delay = 2.0;
        let mut ctx = GlobalContext::new(&config);
        scene.on_enter(&mut ctx);

        // The first tick reveals the single character and starts waiting
        for _ in 0..3 {
            ctx.clock.advance(0.5);
            scene.update(&mut ctx);
        }
        assert_eq!(scene.event_index(), 0);

        ctx.clock.advance(0.5);
        scene.update(&mut ctx);
        assert_eq!(scene.event_index(), 1);
    }

    //=====================================================================
    // Snapshot
    //=====================================================================

    #[test]
    fn restore_returns_to_saved_event_with_text_shown() {
        let mut scene = scene_from(TWO_EVENTS, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);
        act(&mut scene, &mut ctx, GameAction::Advance);
        act(&mut scene, &mut ctx, GameAction::Choose(1));
        let state = scene.snapshot();

        let mut fresh = scene_from(TWO_EVENTS, "A");
        fresh.on_enter(&mut ctx);
        fresh.restore(&state);

        assert_eq!(fresh.event_index(), 1);
        assert!(fresh.view().text_complete);
        assert_eq!(fresh.view().body, "second");
        assert!(fresh.autosaves());
    }

    #[test]
    fn restore_refilters_gated_choices_on_next_update() {
        let mut scene = scene_from(TWO_EVENTS, "A");
        let mut ctx = context();
        scene.on_enter(&mut ctx);
        scene.restore(&json!({ "event_index": 0 }));
        assert_eq!(scene.view().choices.len(), 3);

        scene.update(&mut ctx);
        assert_eq!(scene.view().choices, ["stay", "leave"]);

        ctx.emotions.set_value(EmotionKind::Determination, 60.0);
        scene.restore(&json!({ "event_index": 0 }));
        scene.update(&mut ctx);
        assert_eq!(scene.view().choices, ["stay", "brave", "leave"]);
    }
}
