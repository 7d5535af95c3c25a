//=========================================================================
// Input Event Types
//
// Portable representation of keyboard and mouse input.
//
// The platform layer (winit) and the headless script driver both produce
// these events; nothing past the platform bridge sees windowing types.
//
// Event Flow:
// ```text
// Winit / Script
//         ↓
//    InputEvent (this module)
//         ↓
//    StateTracker + ActionMapper
//         ↓
//    GameAction on the message bus
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::hash::{Hash, Hasher};
use std::str::FromStr;

//=== MouseButton =========================================================

/// Physical mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Side and thumb buttons.
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the key location, not the character produced. Covers the
/// digit row used for choices, letters for modifier chords, and the
/// function row used by the debug hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Function Keys ----------------------------------------------------

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
}

impl KeyCode {
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];

    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
        KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
        KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
        KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
        KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
        KeyCode::KeyZ,
    ];

    const FUNCTION: [KeyCode; 12] = [
        KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
        KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    ];

    /// Digit-row key for `n` (0-9).
    pub fn digit(n: u8) -> Option<KeyCode> {
        Self::DIGITS.get(usize::from(n)).copied()
    }

    /// Function key `F{n}` (1-12).
    pub fn function(n: u8) -> Option<KeyCode> {
        usize::from(n)
            .checked_sub(1)
            .and_then(|i| Self::FUNCTION.get(i))
            .copied()
    }
}

//--- Parsing -------------------------------------------------------------

/// Parses key names as written in headless scripts.
///
/// Accepts `0`-`9`, `a`-`z`, `f1`-`f12`, arrows (`up`, `down`, ...),
/// and `space`, `enter`, `esc`/`escape`, `tab`, `backspace`, `delete`.
impl FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();

        let key = match name.as_str() {
            "space" => Some(KeyCode::Space),
            "enter" | "return" => Some(KeyCode::Enter),
            "esc" | "escape" => Some(KeyCode::Escape),
            "tab" => Some(KeyCode::Tab),
            "backspace" => Some(KeyCode::Backspace),
            "delete" | "del" => Some(KeyCode::Delete),
            "up" => Some(KeyCode::ArrowUp),
            "down" => Some(KeyCode::ArrowDown),
            "left" => Some(KeyCode::ArrowLeft),
            "right" => Some(KeyCode::ArrowRight),
            _ => None,
        };
        if let Some(key) = key {
            return Ok(key);
        }

        let mut chars = name.chars();
        match (chars.next(), chars.as_str()) {
            (Some(c @ '0'..='9'), "") => Self::digit(c as u8 - b'0'),
            (Some(c @ 'a'..='z'), "") => Self::LETTERS.get(usize::from(c as u8 - b'a')).copied(),
            (Some('f'), rest) => rest.parse::<u8>().ok().and_then(Self::function),
            _ => None,
        }
        .ok_or_else(|| format!("unknown key: {}", s))
    }
}

//=== InputEvent ==========================================================

/// Low-level input event from the platform layer.
///
/// # Equality & Hashing Semantics
///
/// Events compare by type + payload (key/button + modifiers).
/// `MouseMoved` events are equal regardless of coordinates so the input
/// buffer can coalesce them (last position wins).
///
/// ```text
/// KeyDown{F2, NONE} == KeyDown{F2, NONE}      ✓
/// KeyDown{S, CTRL}  == KeyDown{S, NONE}       ✗ (different mods)
/// MouseMoved{...}   == MouseMoved{...}        ✓ (always equal)
/// ```
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown {
        key: KeyCode,
        modifiers: Modifiers,
    },

    KeyUp {
        key: KeyCode,
        modifiers: Modifiers,
    },

    MouseButtonDown {
        button: MouseButton,
        modifiers: Modifiers,
    },

    MouseButtonUp {
        button: MouseButton,
        modifiers: Modifiers,
    },

    /// Cursor position in surface pixels, top-left origin.
    MouseMoved { x: f32, y: f32 },
}

impl InputEvent {
    /// Press and release of `key`, as a script step or synthetic tap.
    pub fn tap(key: KeyCode, modifiers: Modifiers) -> [InputEvent; 2] {
        [
            InputEvent::KeyDown { key, modifiers },
            InputEvent::KeyUp { key, modifiers },
        ]
    }
}

//--- Trait Implementations -----------------------------------------------

impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        use InputEvent::*;
        match (self, other) {
            (KeyDown { key: a, modifiers: ma }, KeyDown { key: b, modifiers: mb })
            | (KeyUp { key: a, modifiers: ma }, KeyUp { key: b, modifiers: mb }) => {
                a == b && ma == mb
            }
            (
                MouseButtonDown { button: a, modifiers: ma },
                MouseButtonDown { button: b, modifiers: mb },
            )
            | (
                MouseButtonUp { button: a, modifiers: ma },
                MouseButtonUp { button: b, modifiers: mb },
            ) => a == b && ma == mb,
            (MouseMoved { .. }, MouseMoved { .. }) => true,
            _ => false,
        }
    }
}

impl Eq for InputEvent {}

/// Consistent with equality: coordinates are not hashed.
impl Hash for InputEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::KeyDown { key, modifiers } | Self::KeyUp { key, modifiers } => {
                key.hash(state);
                modifiers.hash(state);
            }
            Self::MouseButtonDown { button, modifiers }
            | Self::MouseButtonUp { button, modifiers } => {
                button.hash(state);
                modifiers.hash(state);
            }
            Self::MouseMoved { .. } => {}
        }
    }
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// Bindings match modifiers exactly: `Ctrl+S` does not fire on
/// `Ctrl+Shift+S`, and `S` does not fire on `Ctrl+S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Command on macOS.
    pub ctrl: bool,
    /// Option on macOS.
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    //=====================================================================
    // Equality & Hashing
    //=====================================================================

    #[test]
    fn mouse_moves_coalesce_in_sets() {
        let mut set = HashSet::new();
        set.insert(InputEvent::MouseMoved { x: 1.0, y: 1.0 });
        set.replace(InputEvent::MouseMoved { x: 9.0, y: 4.0 });

        assert_eq!(set.len(), 1);
        match set.iter().next() {
            Some(InputEvent::MouseMoved { x, y }) => assert_eq!((*x, *y), (9.0, 4.0)),
            other => panic!("Expected MouseMoved, got {:?}", other),
        }
    }

    #[test]
    fn modifiers_distinguish_key_events() {
        let plain = InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::NONE };
        let chord = InputEvent::KeyDown { key: KeyCode::KeyS, modifiers: Modifiers::CTRL };
        let release = InputEvent::KeyUp { key: KeyCode::KeyS, modifiers: Modifiers::NONE };

        assert_ne!(plain, chord);
        assert_ne!(plain, release);
    }

    #[test]
    fn tap_is_down_then_up() {
        let [down, up] = InputEvent::tap(KeyCode::F2, Modifiers::NONE);
        assert!(matches!(down, InputEvent::KeyDown { key: KeyCode::F2, .. }));
        assert!(matches!(up, InputEvent::KeyUp { key: KeyCode::F2, .. }));
    }

    //=====================================================================
    // Key Parsing
    //=====================================================================

    #[test]
    fn parses_script_key_names() {
        assert_eq!("space".parse::<KeyCode>(), Ok(KeyCode::Space));
        assert_eq!("Enter".parse::<KeyCode>(), Ok(KeyCode::Enter));
        assert_eq!("esc".parse::<KeyCode>(), Ok(KeyCode::Escape));
        assert_eq!("3".parse::<KeyCode>(), Ok(KeyCode::Digit3));
        assert_eq!("s".parse::<KeyCode>(), Ok(KeyCode::KeyS));
        assert_eq!("F4".parse::<KeyCode>(), Ok(KeyCode::F4));
        assert_eq!("f12".parse::<KeyCode>(), Ok(KeyCode::F12));
    }

    #[test]
    fn rejects_unknown_key_names() {
        assert!("f13".parse::<KeyCode>().is_err());
        assert!("f0".parse::<KeyCode>().is_err());
        assert!("hyper".parse::<KeyCode>().is_err());
    }

    #[test]
    fn digit_and_function_lookups() {
        assert_eq!(KeyCode::digit(7), Some(KeyCode::Digit7));
        assert_eq!(KeyCode::digit(10), None);
        assert_eq!(KeyCode::function(1), Some(KeyCode::F1));
        assert_eq!(KeyCode::function(0), None);
    }
}
