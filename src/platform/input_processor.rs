//=========================================================================
// Input Processor
//=========================================================================
//
// Translates winit window input into the game's InputEvents.
//
//   KeyboardInput     → KeyDown / KeyUp    (physical key, sticky modifiers)
//   MouseInput        → MouseButtonDown/Up (sticky modifiers)
//   CursorMoved       → MouseMoved         (logical pixels)
//   ModifiersChanged  → cached for the events that follow
//
// Only keys with a name in the script syntax are forwarded; F13-F24,
// media keys and the numpad (bar its Enter) never reach the game.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton},
    keyboard::{KeyCode as W, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::event::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== InputProcessor ======================================================

/// Stamps the last reported modifier state on every key and button.
pub(crate) struct InputProcessor {
    modifiers: Modifiers,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self { modifiers: Modifiers::NONE }
    }

    pub(crate) fn update_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers::from(state);
    }

    /// `None` for keys the game has no name for.
    pub(crate) fn process_key_event(&self, event: &KeyEvent) -> Option<InputEvent> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        let key = game_key(code)?;
        Some(self.key(key, event.state))
    }

    pub(crate) fn process_mouse_button(&self, button: WinitMouseButton, state: ElementState) -> InputEvent {
        let button = MouseButton::from(button);
        let modifiers = self.modifiers;
        if state.is_pressed() {
            InputEvent::MouseButtonDown { button, modifiers }
        } else {
            InputEvent::MouseButtonUp { button, modifiers }
        }
    }

    /// Physical cursor position to logical pixels, matching the layout
    /// used by scene views and click hit-tests.
    pub(crate) fn process_mouse_move(&self, x: f64, y: f64, scale_factor: f64) -> InputEvent {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        InputEvent::MouseMoved {
            x: (x / scale) as f32,
            y: (y / scale) as f32,
        }
    }

    fn key(&self, key: KeyCode, state: ElementState) -> InputEvent {
        let modifiers = self.modifiers;
        if state.is_pressed() {
            InputEvent::KeyDown { key, modifiers }
        } else {
            InputEvent::KeyUp { key, modifiers }
        }
    }
}

//=== Winit Conversions ===================================================

/// Winit already folds platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// Physical key to game key.
fn game_key(code: W) -> Option<KeyCode> {
    let digit = KeyCode::digit;
    let function = KeyCode::function;

    let key = match code {
        W::Digit0 => digit(0)?, W::Digit1 => digit(1)?, W::Digit2 => digit(2)?,
        W::Digit3 => digit(3)?, W::Digit4 => digit(4)?, W::Digit5 => digit(5)?,
        W::Digit6 => digit(6)?, W::Digit7 => digit(7)?, W::Digit8 => digit(8)?,
        W::Digit9 => digit(9)?,

        W::F1 => function(1)?, W::F2 => function(2)?, W::F3 => function(3)?,
        W::F4 => function(4)?, W::F5 => function(5)?, W::F6 => function(6)?,
        W::F7 => function(7)?, W::F8 => function(8)?, W::F9 => function(9)?,
        W::F10 => function(10)?, W::F11 => function(11)?, W::F12 => function(12)?,

        W::KeyA => KeyCode::KeyA, W::KeyB => KeyCode::KeyB, W::KeyC => KeyCode::KeyC,
        W::KeyD => KeyCode::KeyD, W::KeyE => KeyCode::KeyE, W::KeyF => KeyCode::KeyF,
        W::KeyG => KeyCode::KeyG, W::KeyH => KeyCode::KeyH, W::KeyI => KeyCode::KeyI,
        W::KeyJ => KeyCode::KeyJ, W::KeyK => KeyCode::KeyK, W::KeyL => KeyCode::KeyL,
        W::KeyM => KeyCode::KeyM, W::KeyN => KeyCode::KeyN, W::KeyO => KeyCode::KeyO,
        W::KeyP => KeyCode::KeyP, W::KeyQ => KeyCode::KeyQ, W::KeyR => KeyCode::KeyR,
        W::KeyS => KeyCode::KeyS, W::KeyT => KeyCode::KeyT, W::KeyU => KeyCode::KeyU,
        W::KeyV => KeyCode::KeyV, W::KeyW => KeyCode::KeyW, W::KeyX => KeyCode::KeyX,
        W::KeyY => KeyCode::KeyY, W::KeyZ => KeyCode::KeyZ,

        W::ArrowUp => KeyCode::ArrowUp,
        W::ArrowDown => KeyCode::ArrowDown,
        W::ArrowLeft => KeyCode::ArrowLeft,
        W::ArrowRight => KeyCode::ArrowRight,

        // Enter on the numpad advances text like the main one
        W::Enter | W::NumpadEnter => KeyCode::Enter,
        W::Space => KeyCode::Space,
        W::Escape => KeyCode::Escape,
        W::Tab => KeyCode::Tab,
        W::Backspace => KeyCode::Backspace,
        W::Delete => KeyCode::Delete,

        _ => return None,
    };
    Some(key)
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> ModifiersState {
        ModifiersState::CONTROL
    }

    //=====================================================================
    // Keys
    //=====================================================================

    #[test]
    fn hotkey_row_is_mapped() {
        assert_eq!(game_key(W::F1), Some(KeyCode::F1));
        assert_eq!(game_key(W::F4), Some(KeyCode::F4));
        assert_eq!(game_key(W::F11), Some(KeyCode::F11));
        assert_eq!(game_key(W::Escape), Some(KeyCode::Escape));
    }

    #[test]
    fn choice_digits_are_mapped() {
        assert_eq!(game_key(W::Digit1), Some(KeyCode::Digit1));
        assert_eq!(game_key(W::Digit9), Some(KeyCode::Digit9));
    }

    #[test]
    fn both_enter_keys_advance() {
        assert_eq!(game_key(W::Enter), Some(KeyCode::Enter));
        assert_eq!(game_key(W::NumpadEnter), Some(KeyCode::Enter));
    }

    #[test]
    fn unnamed_keys_are_dropped() {
        assert_eq!(game_key(W::F13), None);
        assert_eq!(game_key(W::Numpad1), None);
        assert_eq!(game_key(W::AudioVolumeUp), None);
    }

    #[test]
    fn ctrl_s_carries_its_modifier() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(ctrl());

        match processor.key(KeyCode::KeyS, ElementState::Pressed) {
            InputEvent::KeyDown { key, modifiers } => {
                assert_eq!(key, KeyCode::KeyS);
                assert_eq!(modifiers, Modifiers::CTRL);
            }
            other => panic!("Expected KeyDown, got {:?}", other),
        }
    }

    #[test]
    fn release_after_modifier_change_uses_new_state() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(ctrl());
        processor.update_modifiers(ModifiersState::empty());

        assert!(matches!(
            processor.key(KeyCode::KeyL, ElementState::Released),
            InputEvent::KeyUp { key: KeyCode::KeyL, modifiers } if modifiers == Modifiers::NONE
        ));
    }

    //=====================================================================
    // Mouse
    //=====================================================================

    #[test]
    fn left_click_is_a_button_down() {
        let processor = InputProcessor::new();
        let event = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed);

        assert!(matches!(
            event,
            InputEvent::MouseButtonDown { button: MouseButton::Left, .. }
        ));
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
    }

    #[test]
    fn cursor_is_scaled_to_logical_pixels() {
        let processor = InputProcessor::new();

        match processor.process_mouse_move(1280.0, 850.0, 2.0) {
            InputEvent::MouseMoved { x, y } => assert_eq!((x, y), (640.0, 425.0)),
            other => panic!("Expected MouseMoved, got {:?}", other),
        }
        match processor.process_mouse_move(100.0, 50.0, 0.0) {
            InputEvent::MouseMoved { x, y } => assert_eq!((x, y), (100.0, 50.0)),
            other => panic!("Expected MouseMoved, got {:?}", other),
        }
    }
}
