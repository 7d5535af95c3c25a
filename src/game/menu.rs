//=========================================================================
// Main Menu
//=========================================================================
//
// Title screen. Also stands in for the settings screen.
//
//   1 / Enter → CH0_PHASE_01
//   2         → settings
//   3         → quit
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use super::actions::GameAction;
use super::typewriter::Typewriter;
use crate::audio::AudioCommand;
use crate::core::globals::GlobalContext;
use crate::core::input::KeyCode;
use crate::core::scene::{Scene, SceneView};

pub const MENU_SCENE: &str = "main_menu";
pub const SETTINGS_SCENE: &str = "settings";
pub const FIRST_STORY_SCENE: &str = "CH0_PHASE_01";

const MENU_TITLE: &str = "模拟生存 - Simulate to Survive";
const MENU_MUSIC: &str = "background_main_theme";
const MENU_OPTIONS: [&str; 3] = ["开始游戏", "设置", "退出"];

//=== MainMenuScene =======================================================

#[derive(Debug, Default)]
pub struct MainMenuScene {
    typewriter: Typewriter,
}

impl MainMenuScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, option: u8, ctx: &mut GlobalContext) {
        match option {
            1 => {
                info!("Starting new game");
                ctx.scene_transitions.push(FIRST_STORY_SCENE);
            }
            2 => ctx.scene_transitions.push(SETTINGS_SCENE),
            3 => {
                info!("Quit selected from menu");
                ctx.request_quit();
            }
            _ => {}
        }
    }
}

impl Scene for MainMenuScene {
    fn on_enter(&mut self, ctx: &mut GlobalContext) {
        self.typewriter.set_text(MENU_TITLE);
        ctx.message_bus.push(AudioCommand::PlayMusic {
            sound: MENU_MUSIC.to_string(),
            looped: true,
        });
    }

    fn on_exit(&mut self, ctx: &mut GlobalContext) {
        ctx.message_bus.push(AudioCommand::StopMusic { fade_out_ms: 0 });
    }

    fn update(&mut self, ctx: &mut GlobalContext) {
        self.typewriter.update(ctx.clock.delta(), ctx.display.text_speed);

        let actions = ctx.message_bus.read::<GameAction>().to_vec();
        for action in actions {
            match action {
                GameAction::Advance => {
                    self.typewriter.complete();
                    // Enter both finishes the title and starts the game
                    if ctx.input_state.is_key_pressed(KeyCode::Enter) {
                        self.select(1, ctx);
                        return;
                    }
                }
                GameAction::Choose(n) if self.typewriter.is_complete() => {
                    self.select(n, ctx);
                    return;
                }
                GameAction::Click if self.typewriter.is_complete() => {
                    let (x, y) = ctx.input_state.mouse_position();
                    if let Some(index) = self.view().choice_at(x, y, ctx.display.window_width) {
                        self.select(index as u8 + 1, ctx);
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn view(&self) -> SceneView {
        let complete = self.typewriter.is_complete();
        SceneView {
            title: MENU_TITLE.to_string(),
            body: self.typewriter.visible().to_string(),
            choices: if complete {
                MENU_OPTIONS.iter().map(|option| option.to_string()).collect()
            } else {
                Vec::new()
            },
            text_complete: complete,
            background: Some("menu".to_string()),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
