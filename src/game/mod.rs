//=========================================================================
// Game Runtime
//=========================================================================
//
// Owns every subsystem and advances them one tick at a time.
//
// Architecture:
//   Receiver<PlatformEvent> ─> EventCollector ─┐
//                                              ▼
//   Game::tick(dt)
//     1. collect platform events (Exit on close)
//     2. input → GameAction on the bus
//     3. global hotkeys (debug, screenshots, save/load, quit)
//     4. current scene update
//     5. AudioCommand drain
//     6. queued transitions (+ event captures)
//     7. audio fades
//     8. autosave
//     9. delayed / periodic captures
//
// The same tick serves the winit handler and the headless driver; only
// the pacing differs.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod actions;
pub mod headless;
pub mod menu;
pub mod story_scene;
pub mod typewriter;

//=== External Dependencies ===============================================

use crossbeam_channel::Receiver;
use log::{error, info, warn};

//=== Internal Dependencies ===============================================

use crate::audio::{AudioCommand, AudioManager, AudioSink};
use crate::config::GameConfig;
use crate::core::globals::{GameClock, GlobalContext, GlobalSystems};
use crate::core::platform_bridge::{EventCollector, PlatformCommand, PlatformEvent, TickControl};
use crate::core::scene::{SceneId, SceneManager, SceneView};
use crate::debug::{self, DebugHarness, DebugOverlay, FrameSource, Framebuffer};
use crate::emotion::EmotionSystem;
use crate::error::{GameError, SaveError, SceneError};
use crate::save::{SaveGame, SaveStore};
use crate::story::Story;

//=== Public API ==========================================================

pub use actions::GameAction;
pub use menu::{MainMenuScene, FIRST_STORY_SCENE, MENU_SCENE, SETTINGS_SCENE};
pub use story_scene::StoryScene;

//=== Game ================================================================

pub struct Game {
    config: GameConfig,
    ctx: GlobalContext,
    systems: GlobalSystems<GameAction>,
    collector: EventCollector,
    audio: AudioManager,
    harness: DebugHarness,
    saves: SaveStore,
    tps: f64,
    /// Game time of the last autosave.
    last_autosave: f64,
    platform_commands: Vec<PlatformCommand>,
}

impl Game {
    /// Registers the menu and every story scene, validates the story
    /// against that registry and enters the main menu.
    ///
    /// # Errors
    ///
    /// Fails when the story references a scene nobody registered.
    pub(crate) fn new(
        config: GameConfig,
        story: Story,
        audio: AudioManager,
        events: Receiver<PlatformEvent>,
        tps: f64,
    ) -> Result<Self, GameError> {
        let mut systems = GlobalSystems::new();
        actions::bind_defaults(&mut systems.input);

        let manager = &mut systems.scene_manager;
        manager.register(MENU_SCENE, Box::new(MainMenuScene::new()));
        manager.register(SETTINGS_SCENE, Box::new(MainMenuScene::new()));
        for script in story.scenes() {
            manager.register(script.id.as_str(), Box::new(StoryScene::new(script.clone())));
        }

        story.validate(|id| manager.contains(id))?;
        info!("Registered {} scenes", manager.len());

        let mut ctx = GlobalContext::new(&config);
        manager.transition(MENU_SCENE, &mut ctx)?;

        let mut game = Self {
            harness: DebugHarness::new(&config.debug),
            saves: SaveStore::new(&config.game.save_path),
            config,
            ctx,
            systems,
            collector: EventCollector::new(events),
            audio,
            tps,
            last_autosave: 0.0,
            platform_commands: Vec::new(),
        };
        game.drain_audio();

        Ok(game)
    }

    //=====================================================================
    // Tick
    //=====================================================================

    /// Runs one tick covering `dt` seconds of game time.
    pub fn tick(&mut self, dt: f64) -> TickControl {
        //--- 1. Platform events -------------------------------------------
        if self.collector.collect_frame() == TickControl::Exit {
            info!("Platform requested exit");
            return TickControl::Exit;
        }
        self.ctx.frame_events = self.collector.take_batches();
        self.ctx.clock.advance(dt);

        //--- 2. Input -----------------------------------------------------
        self.systems.process_input(&mut self.ctx);

        //--- 3. Global hotkeys --------------------------------------------
        let actions = self.ctx.message_bus.read::<GameAction>().to_vec();
        for action in actions {
            self.handle_global(action);
        }

        //--- 4. Scene -----------------------------------------------------
        self.systems.update_scene(&mut self.ctx);

        //--- 5. Audio commands --------------------------------------------
        self.drain_audio();

        //--- 6. Transitions -----------------------------------------------
        self.apply_transitions();
        self.drain_audio();

        //--- 7. Fades -----------------------------------------------------
        self.audio.update(self.ctx.clock.delta());

        //--- 8. Autosave --------------------------------------------------
        self.autosave();

        //--- 9. Harness ---------------------------------------------------
        let now = self.ctx.clock.elapsed();
        for name in self.harness.due_captures(now) {
            self.capture(&name);
        }

        if self.ctx.quit_requested() {
            info!("Quit requested");
            TickControl::Exit
        } else {
            TickControl::Continue
        }
    }

    fn handle_global(&mut self, action: GameAction) {
        match action {
            GameAction::ToggleDebug => {
                let on = self.harness.toggle_debug();
                if on {
                    for line in self.overlay().lines() {
                        info!(target: "debug", "{}", line);
                    }
                }
            }
            GameAction::Screenshot => {
                self.capture(debug::MANUAL_CAPTURE);
            }
            GameAction::SceneScreenshot => {
                let name = debug::scene_capture(self.scene_label());
                self.capture(&name);
            }
            GameAction::DelayedScreenshot => {
                self.harness.schedule_delayed(self.ctx.clock.elapsed());
            }
            GameAction::ToggleFullscreen => {
                let display = &mut self.config.display;
                display.fullscreen = !display.fullscreen;
                info!("Fullscreen: {}", display.fullscreen);
                self.platform_commands
                    .push(PlatformCommand::SetFullscreen(display.fullscreen));
            }
            GameAction::Quit => self.ctx.request_quit(),
            GameAction::Save => {
                if let Err(e) = self.save_game() {
                    error!("Save failed: {}", e);
                }
            }
            GameAction::Load => {
                if let Err(e) = self.load_game() {
                    error!("Load failed: {}", e);
                }
            }
            GameAction::Advance | GameAction::Choose(_) | GameAction::Click => {}
        }
    }

    fn drain_audio(&mut self) {
        for command in self.ctx.message_bus.take::<AudioCommand>() {
            self.audio.apply(command);
        }
    }

    /// Applies queued transitions. An unknown target logs and keeps the
    /// current scene.
    fn apply_transitions(&mut self) {
        for target in self.ctx.scene_transitions.take() {
            if !self.systems.scene_manager.contains(target.as_str()) {
                error!("{}", SceneError::NotFound(target.to_string()));
                continue;
            }

            let events = self.harness.events_enabled();
            if events {
                let name = debug::transition_capture(self.scene_label(), target.as_str());
                self.capture(&name);
            }

            if let Err(e) = self.systems.scene_manager.transition(target.as_str(), &mut self.ctx) {
                error!("{}", e);
                continue;
            }

            if events {
                self.capture(&debug::loaded_capture(target.as_str()));
            }
        }
    }

    fn autosave(&mut self) {
        let settings = &self.config.game;
        if !settings.auto_save || settings.auto_save_interval == 0 {
            return;
        }
        if !self.systems.scene_manager.current_autosaves() {
            return;
        }

        let now = self.ctx.clock.elapsed();
        let interval = f64::from(settings.auto_save_interval) * 60.0;
        if now - self.last_autosave >= interval {
            self.last_autosave = now;
            info!("Autosaving");
            if let Err(e) = self.save_game() {
                warn!("Autosave failed: {}", e);
            }
        }
    }

    //=====================================================================
    // Save / Load
    //=====================================================================

    /// Writes the current progress to the save file.
    pub fn save_game(&mut self) -> Result<std::path::PathBuf, SaveError> {
        let manager = &self.systems.scene_manager;
        let mut save = SaveGame {
            current_scene: manager.current().cloned().unwrap_or_else(|| SceneId::from(MENU_SCENE)),
            game_data: self.ctx.game_data.clone(),
            emotions: self.ctx.emotions.snapshot(),
            scene_states: manager.scene_states(),
            saved_at: String::new(),
        };
        self.saves.save(&mut save)
    }

    /// Restores the save file and resumes its scene.
    ///
    /// Returns `Ok(false)` when there is no save yet. A save naming an
    /// unregistered scene fails before anything is restored.
    pub fn load_game(&mut self) -> Result<bool, GameError> {
        let Some(save) = self.saves.load()? else {
            return Ok(false);
        };
        if !self.systems.scene_manager.contains(save.current_scene.as_str()) {
            warn!("Save names unknown scene {}", save.current_scene);
            return Err(SceneError::NotFound(save.current_scene.to_string()).into());
        }

        let now = self.ctx.clock.elapsed();
        self.ctx.game_data = save.game_data;
        self.ctx.emotions.restore(&save.emotions, now);

        let manager = &mut self.systems.scene_manager;
        manager.set_scene_states(save.scene_states);
        manager.resume(save.current_scene.as_str(), &mut self.ctx)?;
        self.drain_audio();

        if self.harness.events_enabled() {
            self.capture(&debug::loaded_capture(save.current_scene.as_str()));
        }
        Ok(true)
    }

    //=====================================================================
    // Capture
    //=====================================================================

    fn overlay(&self) -> DebugOverlay {
        let delta = self.ctx.clock.delta();
        DebugOverlay {
            tps: if delta > 0.0 { 1.0 / delta } else { self.tps },
            scene: self.scene_label().to_string(),
            loaded_sounds: self.audio.catalog().len(),
        }
    }

    /// Composes the current frame at window size.
    pub fn frame(&self) -> (Framebuffer, String) {
        let view = self.systems.scene_manager.current_view();
        let overlay = self.harness.debug_mode().then(|| self.overlay());
        let source = FrameSource {
            scene: self.current_scene(),
            view: &view,
            emotions: &self.ctx.emotions,
            overlay: overlay.as_ref(),
        };

        let display = &self.config.display;
        let frame = Framebuffer::compose(&source, display.window_width, display.window_height);
        (frame, source.caption())
    }

    fn capture(&mut self, name: &str) {
        let (frame, caption) = self.frame();
        self.harness.capture(name, &frame, &caption);
    }

    fn scene_label(&self) -> &str {
        self.current_scene().unwrap_or("none")
    }

    //=====================================================================
    // Accessors
    //=====================================================================

    /// Transitions immediately, bypassing the queue.
    pub fn transition(&mut self, id: &str) -> Result<(), SceneError> {
        self.systems.scene_manager.transition(id, &mut self.ctx)?;
        self.drain_audio();
        Ok(())
    }

    pub fn current_scene(&self) -> Option<&str> {
        self.systems.scene_manager.current().map(SceneId::as_str)
    }

    pub fn view(&self) -> SceneView {
        self.systems.scene_manager.current_view()
    }

    pub fn scene_manager(&self) -> &SceneManager {
        &self.systems.scene_manager
    }

    pub fn emotions(&self) -> &EmotionSystem {
        &self.ctx.emotions
    }

    pub fn context(&self) -> &GlobalContext {
        &self.ctx
    }

    pub fn clock(&self) -> GameClock {
        self.ctx.clock
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn harness(&self) -> &DebugHarness {
        &self.harness
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }

    /// Commands for the window backend queued since the last call.
    pub fn take_platform_commands(&mut self) -> Vec<PlatformCommand> {
        std::mem::take(&mut self.platform_commands)
    }
}

/// Builds the audio manager the game uses, scanning the catalog.
pub(crate) fn audio_manager(config: &GameConfig, sink: Box<dyn AudioSink>) -> AudioManager {
    AudioManager::new(&config.audio, sink)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCatalog, AudioEvent, AudioKind, RecordingSink};
    use crate::core::input::{InputEvent, KeyCode, Modifiers};
    use crossbeam_channel::{bounded, Sender};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Harness {
        game: Game,
        tx: Sender<PlatformEvent>,
        sink: RecordingSink,
        _dir: TempDir,
    }

    fn game_with(mut config: GameConfig) -> Harness {
        let dir = TempDir::new().unwrap();
        config.game.save_path = dir.path().join("saves");
        config.debug.screenshot_dir = dir.path().join("shots");
        config.game.emotion_decay_rate = 0.0;

        let mut catalog = AudioCatalog::new();
        catalog.insert("background_main_theme", PathBuf::from("theme.wav"));
        catalog.insert("environment_gentle-rain", PathBuf::from("rain.wav"));

        let sink = RecordingSink::new();
        let audio = AudioManager::with_catalog(catalog, &config.audio, Box::new(sink.clone()));
        let (tx, rx) = bounded(64);
        let game = Game::new(config, Story::builtin().unwrap(), audio, rx, 60.0).unwrap();

        Harness { game, tx, sink, _dir: dir }
    }

    fn press(h: &mut Harness, key: KeyCode, modifiers: Modifiers) -> TickControl {
        h.tx.send(PlatformEvent::Inputs {
            discrete: InputEvent::tap(key, modifiers).to_vec(),
            continuous: Vec::new(),
        })
        .unwrap();
        h.game.tick(1.0 / 60.0)
    }

    //=====================================================================
    // Startup
    //=====================================================================

    #[test]
    fn starts_on_menu_with_theme_music() {
        let h = game_with(GameConfig::default());
        assert_eq!(h.game.current_scene(), Some(MENU_SCENE));
        assert_eq!(h.sink.played(), ["background_main_theme"]);
    }

    #[test]
    fn broken_story_is_fatal() {
        let story = Story::from_toml_str(
            "[[scene]]\nid = \"X\"\ntitle = \"x\"\nnext_scene = \"nowhere\"\n[[scene.event]]\nid = \"X1\"\ntext = \"...\"\n",
        )
        .unwrap();
        let config = GameConfig::default();
        let audio = AudioManager::with_catalog(AudioCatalog::new(), &config.audio, Box::new(RecordingSink::new()));
        let (_tx, rx) = bounded(1);

        assert!(matches!(
            Game::new(config, story, audio, rx, 60.0),
            Err(GameError::Story(_))
        ));
    }

    //=====================================================================
    // Flow
    //=====================================================================

    #[test]
    fn enter_starts_story_and_ambient() {
        let mut h = game_with(GameConfig::default());
        press(&mut h, KeyCode::Enter, Modifiers::NONE);

        assert_eq!(h.game.current_scene(), Some(FIRST_STORY_SCENE));
        assert_eq!(h.game.audio().current_ambient(), Some("environment_gentle-rain"));
        assert!(h.sink.events().contains(&AudioEvent::Stop { kind: AudioKind::Music, fade_out_ms: 0 }));
    }

    #[test]
    fn escape_quits() {
        let mut h = game_with(GameConfig::default());
        assert_eq!(press(&mut h, KeyCode::Escape, Modifiers::NONE), TickControl::Exit);
    }

    #[test]
    fn window_close_exits() {
        let mut h = game_with(GameConfig::default());
        h.tx.send(PlatformEvent::WindowClosed).unwrap();
        assert_eq!(h.game.tick(1.0 / 60.0), TickControl::Exit);
    }

    #[test]
    fn unknown_direct_transition_keeps_scene() {
        let mut h = game_with(GameConfig::default());
        assert_eq!(
            h.game.transition("CH9_PHASE_01"),
            Err(SceneError::NotFound("CH9_PHASE_01".to_string()))
        );
        assert_eq!(h.game.current_scene(), Some(MENU_SCENE));
    }

    #[test]
    fn fullscreen_toggle_emits_platform_command() {
        let mut h = game_with(GameConfig::default());
        press(&mut h, KeyCode::F11, Modifiers::NONE);

        assert!(h.game.config().display.fullscreen);
        assert_eq!(h.game.take_platform_commands(), [PlatformCommand::SetFullscreen(true)]);
        assert!(h.game.take_platform_commands().is_empty());
    }

    //=====================================================================
    // Save / Load
    //=====================================================================

    #[test]
    fn ctrl_s_then_ctrl_l_restores_scene_and_emotions() {
        let mut h = game_with(GameConfig::default());
        press(&mut h, KeyCode::Enter, Modifiers::NONE);
        press(&mut h, KeyCode::Space, Modifiers::NONE);
        press(&mut h, KeyCode::Digit2, Modifiers::NONE);
        let anger = h.game.emotions().value(crate::emotion::EmotionKind::Anger);
        assert!(anger > 0.0);

        press(&mut h, KeyCode::KeyS, Modifiers::CTRL);
        assert!(h.game.saves.exists());

        h.game.transition(MENU_SCENE).unwrap();
        press(&mut h, KeyCode::KeyL, Modifiers::CTRL);

        assert_eq!(h.game.current_scene(), Some(FIRST_STORY_SCENE));
        assert!(h.game.view().title.ends_with("事件 2 / 3"));
        assert_eq!(h.game.emotions().value(crate::emotion::EmotionKind::Anger), anger);
    }

    #[test]
    fn loading_inside_the_saved_scene_returns_to_the_saved_event() {
        let mut h = game_with(GameConfig::default());
        press(&mut h, KeyCode::Enter, Modifiers::NONE);
        press(&mut h, KeyCode::Space, Modifiers::NONE);
        press(&mut h, KeyCode::Digit2, Modifiers::NONE);
        press(&mut h, KeyCode::KeyS, Modifiers::CTRL);
        let saved = h.game.view().title;

        press(&mut h, KeyCode::Space, Modifiers::NONE);
        press(&mut h, KeyCode::Digit1, Modifiers::NONE);
        assert_eq!(h.game.current_scene(), Some(FIRST_STORY_SCENE));
        assert_ne!(h.game.view().title, saved);

        press(&mut h, KeyCode::KeyL, Modifiers::CTRL);

        assert_eq!(h.game.current_scene(), Some(FIRST_STORY_SCENE));
        assert_eq!(h.game.view().title, saved);
    }

    #[test]
    fn save_with_unknown_scene_restores_nothing() {
        use crate::emotion::EmotionKind;

        let mut h = game_with(GameConfig::default());
        press(&mut h, KeyCode::Enter, Modifiers::NONE);
        press(&mut h, KeyCode::Space, Modifiers::NONE);
        press(&mut h, KeyCode::Digit2, Modifiers::NONE);
        h.game.save_game().unwrap();

        let mut save = h.game.saves.load().unwrap().unwrap();
        assert!(save.emotions.values.get(&EmotionKind::Anger).is_some_and(|v| *v > 0.0));
        save.current_scene = SceneId::from("CH9_PHASE_99");
        save.game_data.insert("flag".to_string(), serde_json::json!(true));
        h.game.saves.save(&mut save).unwrap();
        h.game.ctx.emotions.reset();

        let result = h.game.load_game();

        assert!(matches!(
            result,
            Err(GameError::Scene(SceneError::NotFound(ref id))) if id == "CH9_PHASE_99"
        ));
        assert_eq!(h.game.emotions().value(EmotionKind::Anger), 0.0);
        assert!(!h.game.context().game_data.contains_key("flag"));
        assert_eq!(h.game.current_scene(), Some(FIRST_STORY_SCENE));
    }

    #[test]
    fn load_without_save_is_a_no_op() {
        let mut h = game_with(GameConfig::default());
        assert!(!h.game.load_game().unwrap());
        assert_eq!(h.game.current_scene(), Some(MENU_SCENE));
    }

    //=====================================================================
    // Capture
    //=====================================================================

    #[test]
    fn f2_and_f3_capture_immediately() {
        let mut h = game_with(GameConfig::default());
        press(&mut h, KeyCode::F2, Modifiers::NONE);
        press(&mut h, KeyCode::F3, Modifiers::NONE);

        let names: Vec<String> = h
            .game
            .harness()
            .captures()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("manual_screenshot_"));
        assert!(names[1].starts_with("scene_main_menu_"));
    }

    #[test]
    fn transitions_are_captured_when_event_screenshots_are_on() {
        let mut config = GameConfig::default();
        config.debug.debug_mode = true;
        config.debug.auto_screenshot = true;
        config.debug.screenshot_interval = 1000.0;
        let mut h = game_with(config);

        press(&mut h, KeyCode::Enter, Modifiers::NONE);

        let names: Vec<String> = h
            .game
            .harness()
            .captures()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n.starts_with("event_scene_transition_main_menu_to_CH0_PHASE_01_")));
        assert!(names.iter().any(|n| n.starts_with("event_scene_loaded_CH0_PHASE_01_")));
        assert!(names.iter().any(|n| n.starts_with("debug_auto_001_")));
    }
}
