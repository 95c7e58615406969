//! Raw capture events and the platform backends that produce them.
//!
//! A backend owns the OS hook for its platform: it installs the hook on the
//! calling thread, decodes each native record into a [`RawEvent`] (running
//! the key code tables and the platform's typed-character resolution), and
//! feeds it **synchronously** into the session's event pump.  The pump's
//! boolean return is the consume verdict the backend relays to the OS:
//!
//! - Windows returns a non-zero hook result instead of calling
//!   `CallNextHookEx`;
//! - macOS returns `None` from the tap callback so the event dies in the
//!   tap;
//! - the X11 RECORD extension observes a copy of the event stream and
//!   cannot suppress delivery, so the verdict is accepted and ignored
//!   there.
//!
//! Backends block the calling thread for the lifetime of the session
//! (message loop, run loop, or record-context pump) and exit when the
//! session is stopped.

#[cfg(target_os = "macos")]
pub mod macos;
pub mod mock;
#[cfg(target_os = "windows")]
pub mod windows;
#[cfg(target_os = "linux")]
pub mod x11;

use tapwire_core::event::{WheelDirection, WheelScroll};
use tapwire_core::VirtualKey;

/// Which native hooks a session installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookScope {
    All,
    Keyboard,
    Mouse,
}

impl HookScope {
    pub fn keyboard(self) -> bool {
        matches!(self, HookScope::All | HookScope::Keyboard)
    }

    pub fn mouse(self) -> bool {
        matches!(self, HookScope::All | HookScope::Mouse)
    }
}

/// A decoded native event, ready for the pump.
///
/// Backends have already run code translation (`key`) and, for key-down
/// events, typed-character resolution (`chars`); the pump owns everything
/// downstream: modifier bookkeeping, event construction, typed follow-ups,
/// drag reclassification and click synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    KeyDown {
        key: VirtualKey,
        /// Platform-native code reported alongside the translation.
        rawcode: u16,
        /// UTF-16 units the press types, in order; empty when the key
        /// produces no text.
        chars: Vec<u16>,
        time: u64,
    },
    KeyUp {
        key: VirtualKey,
        rawcode: u16,
        time: u64,
    },
    ButtonDown {
        /// Normalized button number 1–5 (or higher for exotic hardware).
        button: u16,
        x: i16,
        y: i16,
        time: u64,
    },
    ButtonUp {
        button: u16,
        x: i16,
        y: i16,
        time: u64,
    },
    Motion {
        x: i16,
        y: i16,
        time: u64,
    },
    Wheel {
        x: i16,
        y: i16,
        /// Signed notches; positive is away from the user or to the right.
        rotation: i16,
        /// Native units per notch.
        delta: u16,
        scroll: WheelScroll,
        direction: WheelDirection,
        time: u64,
    },
}

/// Stamps an event time: the platform-native clock by default, Unix-epoch
/// milliseconds under the `epoch-time` feature.
pub fn event_time(native: u64) -> u64 {
    #[cfg(feature = "epoch-time")]
    {
        let _ = native;
        epoch_millis()
    }
    #[cfg(not(feature = "epoch-time"))]
    {
        native
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_selects_hooks() {
        assert!(HookScope::All.keyboard() && HookScope::All.mouse());
        assert!(HookScope::Keyboard.keyboard() && !HookScope::Keyboard.mouse());
        assert!(!HookScope::Mouse.keyboard() && HookScope::Mouse.mouse());
    }

    #[cfg(not(feature = "epoch-time"))]
    #[test]
    fn test_event_time_passes_native_clock_through() {
        assert_eq!(event_time(12345), 12345);
    }

    #[cfg(feature = "epoch-time")]
    #[test]
    fn test_event_time_uses_wall_clock() {
        // Any plausible recent epoch value (after 2020-01-01).
        assert!(event_time(0) > 1_577_836_800_000);
    }
}
