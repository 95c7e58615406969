//! Modifier and button state bitmask.
//!
//! A [`ModifierMask`] is a 16-bit snapshot of which modifier keys, mouse
//! buttons and lock states are active.  Every dispatched event carries the
//! mask as it stood *after* the event's own contribution was applied, so a
//! shift press event already has the shift bit set.
//!
//! Bit layout (low to high): shift/ctrl/meta/alt left sides, the same four
//! right sides, mouse buttons 1–5, then num/caps/scroll lock.

use serde::{Deserialize, Serialize};

/// Bitmask of held modifiers, pressed mouse buttons and lock states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct ModifierMask(u16);

impl ModifierMask {
    pub const EMPTY: ModifierMask = ModifierMask(0);

    pub const SHIFT_L: ModifierMask = ModifierMask(1 << 0);
    pub const CTRL_L: ModifierMask = ModifierMask(1 << 1);
    pub const META_L: ModifierMask = ModifierMask(1 << 2);
    pub const ALT_L: ModifierMask = ModifierMask(1 << 3);

    pub const SHIFT_R: ModifierMask = ModifierMask(1 << 4);
    pub const CTRL_R: ModifierMask = ModifierMask(1 << 5);
    pub const META_R: ModifierMask = ModifierMask(1 << 6);
    pub const ALT_R: ModifierMask = ModifierMask(1 << 7);

    /// Either shift side.
    pub const SHIFT: ModifierMask = ModifierMask(Self::SHIFT_L.0 | Self::SHIFT_R.0);
    /// Either control side.
    pub const CTRL: ModifierMask = ModifierMask(Self::CTRL_L.0 | Self::CTRL_R.0);
    /// Either meta side.
    pub const META: ModifierMask = ModifierMask(Self::META_L.0 | Self::META_R.0);
    /// Either alt side.
    pub const ALT: ModifierMask = ModifierMask(Self::ALT_L.0 | Self::ALT_R.0);

    pub const BUTTON1: ModifierMask = ModifierMask(1 << 8);
    pub const BUTTON2: ModifierMask = ModifierMask(1 << 9);
    pub const BUTTON3: ModifierMask = ModifierMask(1 << 10);
    pub const BUTTON4: ModifierMask = ModifierMask(1 << 11);
    pub const BUTTON5: ModifierMask = ModifierMask(1 << 12);

    /// All five mouse button bits.
    pub const ANY_BUTTON: ModifierMask = ModifierMask(
        Self::BUTTON1.0 | Self::BUTTON2.0 | Self::BUTTON3.0 | Self::BUTTON4.0 | Self::BUTTON5.0,
    );

    pub const NUM_LOCK: ModifierMask = ModifierMask(1 << 13);
    pub const CAPS_LOCK: ModifierMask = ModifierMask(1 << 14);
    pub const SCROLL_LOCK: ModifierMask = ModifierMask(1 << 15);

    /// Builds a mask from its raw bit representation.
    pub const fn from_bits(bits: u16) -> Self {
        ModifierMask(bits)
    }

    /// Returns the raw bit representation.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// The mask bit for mouse button `n` (1–5), or `EMPTY` otherwise.
    pub const fn button(n: u16) -> ModifierMask {
        match n {
            1 => Self::BUTTON1,
            2 => Self::BUTTON2,
            3 => Self::BUTTON3,
            4 => Self::BUTTON4,
            5 => Self::BUTTON5,
            _ => Self::EMPTY,
        }
    }

    /// Returns `true` if any bit of `other` is set in `self`.
    pub const fn intersects(self, other: ModifierMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: ModifierMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no bits are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of the two masks.
    pub const fn with(self, other: ModifierMask) -> ModifierMask {
        ModifierMask(self.0 | other.0)
    }

    /// `self` with every bit of `other` cleared.
    pub const fn without(self, other: ModifierMask) -> ModifierMask {
        ModifierMask(self.0 & !other.0)
    }
}

impl std::ops::BitOr for ModifierMask {
    type Output = ModifierMask;

    fn bitor(self, rhs: ModifierMask) -> ModifierMask {
        self.with(rhs)
    }
}

impl std::ops::BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: ModifierMask) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout_matches_wire_values() {
        // Arrange: the documented bit positions
        let expected: &[(ModifierMask, u16)] = &[
            (ModifierMask::SHIFT_L, 1 << 0),
            (ModifierMask::CTRL_L, 1 << 1),
            (ModifierMask::META_L, 1 << 2),
            (ModifierMask::ALT_L, 1 << 3),
            (ModifierMask::SHIFT_R, 1 << 4),
            (ModifierMask::CTRL_R, 1 << 5),
            (ModifierMask::META_R, 1 << 6),
            (ModifierMask::ALT_R, 1 << 7),
            (ModifierMask::BUTTON1, 1 << 8),
            (ModifierMask::BUTTON2, 1 << 9),
            (ModifierMask::BUTTON3, 1 << 10),
            (ModifierMask::BUTTON4, 1 << 11),
            (ModifierMask::BUTTON5, 1 << 12),
            (ModifierMask::NUM_LOCK, 1 << 13),
            (ModifierMask::CAPS_LOCK, 1 << 14),
            (ModifierMask::SCROLL_LOCK, 1 << 15),
        ];

        // Act / Assert
        for &(mask, bits) in expected {
            assert_eq!(mask.bits(), bits);
        }
    }

    #[test]
    fn test_aggregates_are_union_of_sides() {
        assert_eq!(
            ModifierMask::SHIFT,
            ModifierMask::SHIFT_L | ModifierMask::SHIFT_R
        );
        assert_eq!(
            ModifierMask::CTRL,
            ModifierMask::CTRL_L | ModifierMask::CTRL_R
        );
        assert_eq!(
            ModifierMask::META,
            ModifierMask::META_L | ModifierMask::META_R
        );
        assert_eq!(ModifierMask::ALT, ModifierMask::ALT_L | ModifierMask::ALT_R);
    }

    #[test]
    fn test_intersects_matches_either_side() {
        let left_only = ModifierMask::SHIFT_L;
        assert!(left_only.intersects(ModifierMask::SHIFT));
        assert!(!left_only.intersects(ModifierMask::CTRL));
        assert!(ModifierMask::SHIFT.contains(ModifierMask::SHIFT_L));
        assert!(!left_only.contains(ModifierMask::SHIFT));
    }

    #[test]
    fn test_button_lookup() {
        assert_eq!(ModifierMask::button(1), ModifierMask::BUTTON1);
        assert_eq!(ModifierMask::button(5), ModifierMask::BUTTON5);
        assert_eq!(ModifierMask::button(0), ModifierMask::EMPTY);
        assert_eq!(ModifierMask::button(6), ModifierMask::EMPTY);
    }

    #[test]
    fn test_with_and_without() {
        let mut mask = ModifierMask::EMPTY;
        mask |= ModifierMask::BUTTON2;
        mask |= ModifierMask::CAPS_LOCK;
        assert!(mask.intersects(ModifierMask::ANY_BUTTON));

        let cleared = mask.without(ModifierMask::BUTTON2);
        assert!(!cleared.intersects(ModifierMask::ANY_BUTTON));
        assert!(cleared.contains(ModifierMask::CAPS_LOCK));
    }
}
