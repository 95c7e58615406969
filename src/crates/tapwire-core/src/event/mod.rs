//! The virtual event model.
//!
//! Every native input event a capture backend observes is normalized into a
//! [`VirtualEvent`] before it reaches the user's dispatch handler, and every
//! synthetic event handed to the synthesis engine starts out as one.
//!
//! An event is a tagged payload plus two pieces of ambient state: the event
//! timestamp and the [`ModifierMask`] snapshot taken *after* the event's own
//! contribution was applied to the global modifier state.

pub mod mask;

use serde::{Deserialize, Serialize};

pub use mask::ModifierMask;

use crate::keymap::vcode::VirtualKey;

/// No mouse button.
pub const MOUSE_NOBUTTON: u16 = 0;
/// Left mouse button.
pub const MOUSE_BUTTON1: u16 = 1;
/// Right mouse button.
pub const MOUSE_BUTTON2: u16 = 2;
/// Middle mouse button.
pub const MOUSE_BUTTON3: u16 = 3;
/// First extra mouse button.
pub const MOUSE_BUTTON4: u16 = 4;
/// Second extra mouse button.
pub const MOUSE_BUTTON5: u16 = 5;

/// Payload of key pressed/released/typed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardData {
    /// Cross-platform key identifier.
    pub key: VirtualKey,
    /// Platform-native code, for consumers that need OS specificity.
    pub rawcode: u16,
    /// UTF-16 code unit for key-typed events;
    /// [`CHAR_UNDEFINED`](crate::keymap::vcode::CHAR_UNDEFINED) otherwise.
    pub keychar: u16,
}

/// Payload of mouse button and motion events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseData {
    /// Button number (1–5), or [`MOUSE_NOBUTTON`] for pure motion.
    pub button: u16,
    /// Consecutive click count within the multi-click window.
    pub clicks: u16,
    /// Virtual-screen coordinates; may be negative on multi-monitor setups.
    pub x: i16,
    pub y: i16,
}

/// Whether a wheel event scrolls by lines or by blocks (pages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelScroll {
    Unit,
    Block,
}

/// Scroll axis of a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDirection {
    Vertical,
    Horizontal,
}

/// Payload of mouse wheel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelData {
    pub x: i16,
    pub y: i16,
    pub scroll: WheelScroll,
    /// Signed wheel movement in notches.  Positive rotates away from the
    /// user (vertical) or to the right (horizontal).
    pub rotation: i16,
    /// Native units per notch (e.g. 120 on Windows, scroll lines on X11).
    pub delta: u16,
    pub direction: WheelDirection,
}

/// The tagged event payload.
///
/// The last three variants exist only as synthesis inputs; capture never
/// produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// The hook session became active.
    HookEnabled,
    /// The hook session ended.
    HookDisabled,
    KeyTyped(KeyboardData),
    KeyPressed(KeyboardData),
    KeyReleased(KeyboardData),
    MouseClicked(MouseData),
    MousePressed(MouseData),
    MouseReleased(MouseData),
    MouseMoved(MouseData),
    MouseDragged(MouseData),
    MouseWheel(WheelData),
    /// Synthesis only: press without the implicit move to the coordinates.
    MousePressedIgnoreCoords(MouseData),
    /// Synthesis only: release without the implicit move.
    MouseReleasedIgnoreCoords(MouseData),
    /// Synthesis only: move by a delta from the current cursor position.
    MouseMovedRelativeToCursor(MouseData),
}

/// A normalized input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualEvent {
    pub kind: EventKind,
    /// Platform-native event timestamp, or Unix-epoch milliseconds when the
    /// engine is built with the `epoch-time` feature.
    pub time: u64,
    /// Modifier state after this event was applied.
    pub mask: ModifierMask,
}

impl VirtualEvent {
    /// Builds an event with an empty mask; the dispatcher stamps the real
    /// mask at delivery time.
    pub fn new(kind: EventKind, time: u64) -> Self {
        VirtualEvent {
            kind,
            time,
            mask: ModifierMask::EMPTY,
        }
    }

    /// The keyboard payload, for the three key event kinds.
    pub fn keyboard(&self) -> Option<&KeyboardData> {
        match &self.kind {
            EventKind::KeyTyped(data)
            | EventKind::KeyPressed(data)
            | EventKind::KeyReleased(data) => Some(data),
            _ => None,
        }
    }

    /// The mouse payload, for button and motion event kinds.
    pub fn mouse(&self) -> Option<&MouseData> {
        match &self.kind {
            EventKind::MouseClicked(data)
            | EventKind::MousePressed(data)
            | EventKind::MouseReleased(data)
            | EventKind::MouseMoved(data)
            | EventKind::MouseDragged(data)
            | EventKind::MousePressedIgnoreCoords(data)
            | EventKind::MouseReleasedIgnoreCoords(data)
            | EventKind::MouseMovedRelativeToCursor(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::vcode::CHAR_UNDEFINED;

    #[test]
    fn test_keyboard_accessor_covers_key_kinds_only() {
        let data = KeyboardData {
            key: VirtualKey::A,
            rawcode: 0x41,
            keychar: CHAR_UNDEFINED,
        };
        let pressed = VirtualEvent::new(EventKind::KeyPressed(data), 1);
        assert_eq!(pressed.keyboard(), Some(&data));
        assert!(pressed.mouse().is_none());

        let enabled = VirtualEvent::new(EventKind::HookEnabled, 1);
        assert!(enabled.keyboard().is_none());
    }

    #[test]
    fn test_mouse_accessor_covers_injection_variants() {
        let data = MouseData {
            button: MOUSE_BUTTON1,
            clicks: 1,
            x: -10,
            y: 20,
        };
        for kind in [
            EventKind::MousePressed(data),
            EventKind::MousePressedIgnoreCoords(data),
            EventKind::MouseMovedRelativeToCursor(data),
        ] {
            let event = VirtualEvent::new(kind, 2);
            assert_eq!(event.mouse(), Some(&data));
        }
    }

    #[test]
    fn test_new_event_has_empty_mask() {
        let event = VirtualEvent::new(EventKind::HookEnabled, 7);
        assert!(event.mask.is_empty());
        assert_eq!(event.time, 7);
    }
}
