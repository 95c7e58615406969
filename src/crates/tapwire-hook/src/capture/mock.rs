//! Mock capture backend for tests.
//!
//! Drives an [`EventPump`] exactly the way a platform backend does —
//! synchronously, on the caller's thread, observing the consume verdict —
//! without installing any OS hook.

use tapwire_core::event::VirtualEvent;

use crate::capture::RawEvent;
use crate::modifiers::ModifierState;
use crate::pump::{EventPump, DEFAULT_MULTI_CLICK_MS};

/// A scripted backend: feed it raw events, observe what the handler saw and
/// what the OS would have been told.
pub struct MockBackend {
    pump: EventPump,
}

impl MockBackend {
    /// Builds a backend around a fresh modifier state and the given
    /// handler.
    ///
    /// Each mock gets its *own* leaked [`ModifierState`] rather than the
    /// process-global one so parallel tests do not interfere.
    pub fn new(handler: impl FnMut(&VirtualEvent) -> bool + Send + 'static) -> Self {
        let modifiers: &'static ModifierState = Box::leak(Box::new(ModifierState::new()));
        MockBackend {
            pump: EventPump::new(Box::new(handler), modifiers, DEFAULT_MULTI_CLICK_MS),
        }
    }

    /// Marks the session active, as a platform backend does after its hook
    /// is installed.
    pub fn enable(&mut self) {
        self.pump.hook_enabled(0);
    }

    /// Marks the session stopped.
    pub fn disable(&mut self, time: u64) {
        self.pump.hook_disabled(time);
    }

    /// Injects one raw event; returns the consume verdict a real backend
    /// would relay to the OS.
    pub fn inject(&mut self, raw: RawEvent) -> bool {
        self.pump.feed(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use tapwire_core::event::EventKind;
    use tapwire_core::VirtualKey;

    #[test]
    fn test_mock_backend_relays_the_consume_verdict() {
        // Arrange: consume every key press, pass everything else.
        let mut backend = MockBackend::new(|event| {
            matches!(event.kind, EventKind::KeyPressed(_))
        });

        // Act / Assert
        let down = backend.inject(RawEvent::KeyDown {
            key: VirtualKey::F12,
            rawcode: 0x7B,
            chars: vec![],
            time: 1,
        });
        let up = backend.inject(RawEvent::KeyUp {
            key: VirtualKey::F12,
            rawcode: 0x7B,
            time: 2,
        });
        assert!(down, "key press should be consumed");
        assert!(!up, "key release should pass through");
    }

    #[test]
    fn test_mock_backend_delivers_lifecycle_markers() {
        // Arrange
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut backend = MockBackend::new(move |event| {
            sink.lock().unwrap().push(event.kind);
            false
        });

        // Act
        backend.enable();
        backend.disable(9);

        // Assert
        let kinds = seen.lock().unwrap();
        assert_eq!(*kinds, vec![EventKind::HookEnabled, EventKind::HookDisabled]);
    }
}
