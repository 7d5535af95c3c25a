//=========================================================================
// Game Actions
//=========================================================================
//
// Everything the player can ask for, and the default key table.
//
//   Space / Enter ........ Advance
//   1 - 9 ................ Choose(n)
//   Left mouse ........... Click
//   F1 / F2 / F3 / F4 .... debug info / screenshots
//   F11 .................. ToggleFullscreen
//   Escape ............... Quit
//   Ctrl+S / Ctrl+L ...... Save / Load
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::{Action, InputSystem, KeyCode, Modifiers, MouseButton};

//=== GameAction ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Reveal the rest of the passage, or move past a finished one.
    Advance,
    /// Pick the n-th offered choice (1-based, as printed on screen).
    Choose(u8),
    /// Left click at the tracked cursor position.
    Click,

    ToggleDebug,
    Screenshot,
    SceneScreenshot,
    DelayedScreenshot,
    ToggleFullscreen,

    Quit,
    Save,
    Load,
}

impl Action for GameAction {}

//=== Default Bindings ====================================================

/// Installs the standard key table on `input`.
pub fn bind_defaults(input: &mut InputSystem<GameAction>) {
    input.bind_key(KeyCode::Space, GameAction::Advance);
    input.bind_key(KeyCode::Enter, GameAction::Advance);

    for n in 1..=9 {
        if let Some(key) = KeyCode::digit(n) {
            input.bind_key(key, GameAction::Choose(n));
        }
    }
    input.bind_mouse(MouseButton::Left, GameAction::Click);

    input.bind_key(KeyCode::F1, GameAction::ToggleDebug);
    input.bind_key(KeyCode::F2, GameAction::Screenshot);
    input.bind_key(KeyCode::F3, GameAction::SceneScreenshot);
    input.bind_key(KeyCode::F4, GameAction::DelayedScreenshot);
    input.bind_key(KeyCode::F11, GameAction::ToggleFullscreen);
    input.bind_key(KeyCode::Escape, GameAction::Quit);

    input.bind_key_with_mods(KeyCode::KeyS, Modifiers::CTRL, GameAction::Save);
    input.bind_key_with_mods(KeyCode::KeyL, Modifiers::CTRL, GameAction::Load);
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{InputEvent, StateTracker};

    fn actions_for(key: KeyCode, modifiers: Modifiers) -> Vec<GameAction> {
        let mut input = InputSystem::new();
        bind_defaults(&mut input);
        let mut state = StateTracker::new();
        input.process_frame(&mut state, &[InputEvent::tap(key, modifiers).to_vec()]);
        input.actions().to_vec()
    }

    #[test]
    fn digits_choose_by_printed_number() {
        assert_eq!(actions_for(KeyCode::Digit1, Modifiers::NONE), [GameAction::Choose(1)]);
        assert_eq!(actions_for(KeyCode::Digit9, Modifiers::NONE), [GameAction::Choose(9)]);
        assert!(actions_for(KeyCode::Digit0, Modifiers::NONE).is_empty());
    }

    #[test]
    fn function_row_drives_the_debug_harness() {
        assert_eq!(actions_for(KeyCode::F1, Modifiers::NONE), [GameAction::ToggleDebug]);
        assert_eq!(actions_for(KeyCode::F4, Modifiers::NONE), [GameAction::DelayedScreenshot]);
        assert_eq!(actions_for(KeyCode::F11, Modifiers::NONE), [GameAction::ToggleFullscreen]);
    }

    #[test]
    fn save_and_load_need_ctrl() {
        assert!(actions_for(KeyCode::KeyS, Modifiers::NONE).is_empty());
        assert_eq!(actions_for(KeyCode::KeyS, Modifiers::CTRL), [GameAction::Save]);
        assert_eq!(actions_for(KeyCode::KeyL, Modifiers::CTRL), [GameAction::Load]);
    }
}
