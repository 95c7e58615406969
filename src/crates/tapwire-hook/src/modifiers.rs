//! Process-wide modifier and button state.
//!
//! The hook thread is the only writer: it applies each modifier key or
//! mouse button transition *before* the corresponding event is dispatched,
//! so a handler that reads the state mid-dispatch sees the post-event mask.
//! Readers on other threads (the synthesis engine called from a handler,
//! diagnostics) observe the most recent update through acquire/release
//! ordering.
//!
//! At hook start the state is seeded by polling the OS for held modifiers,
//! pressed buttons and lock LEDs; at hook stop it is reset to zero.

use std::sync::atomic::{AtomicU16, Ordering};

use tapwire_core::ModifierMask;

/// Atomically updated [`ModifierMask`].
#[derive(Debug)]
pub struct ModifierState(AtomicU16);

impl ModifierState {
    pub const fn new() -> Self {
        ModifierState(AtomicU16::new(0))
    }

    /// ORs `mask` into the state.
    pub fn set(&self, mask: ModifierMask) {
        self.0.fetch_or(mask.bits(), Ordering::AcqRel);
    }

    /// Clears every bit of `mask`.
    pub fn unset(&self, mask: ModifierMask) {
        self.0.fetch_and(!mask.bits(), Ordering::AcqRel);
    }

    /// Flips every bit of `mask`; lock keys toggle on press.
    pub fn toggle(&self, mask: ModifierMask) {
        self.0.fetch_xor(mask.bits(), Ordering::AcqRel);
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> ModifierMask {
        ModifierMask::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Clears everything; called at session teardown.
    pub fn reset(&self) {
        self.0.store(0, Ordering::Release);
    }
}

impl Default for ModifierState {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-global state the active session writes to.
pub static MODIFIERS: ModifierState = ModifierState::new();

/// Snapshot of the global modifier state.
///
/// Between sessions this reads all zeroes.
pub fn current_modifiers() -> ModifierMask {
    MODIFIERS.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_unset_snapshot() {
        let state = ModifierState::new();
        state.set(ModifierMask::SHIFT_L);
        state.set(ModifierMask::BUTTON1);
        assert!(state.snapshot().contains(ModifierMask::SHIFT_L));
        assert!(state.snapshot().intersects(ModifierMask::SHIFT));
        assert!(state.snapshot().intersects(ModifierMask::ANY_BUTTON));

        state.unset(ModifierMask::SHIFT_L);
        assert!(!state.snapshot().intersects(ModifierMask::SHIFT));
        assert!(state.snapshot().contains(ModifierMask::BUTTON1));
    }

    #[test]
    fn test_toggle_flips_lock_bits() {
        let state = ModifierState::new();
        state.toggle(ModifierMask::CAPS_LOCK);
        assert!(state.snapshot().contains(ModifierMask::CAPS_LOCK));
        state.toggle(ModifierMask::CAPS_LOCK);
        assert!(!state.snapshot().contains(ModifierMask::CAPS_LOCK));
    }

    #[test]
    fn test_reset_clears_everything() {
        let state = ModifierState::new();
        state.set(ModifierMask::SHIFT_L | ModifierMask::BUTTON3 | ModifierMask::NUM_LOCK);
        state.reset();
        assert!(state.snapshot().is_empty());
    }
}
