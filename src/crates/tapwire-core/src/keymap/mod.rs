//! Key code translation tables for the three supported platforms.
//!
//! The canonical representation is the [`VirtualKey`] space defined in
//! [`vcode`].  Native codes are translated to and from it at the capture and
//! synthesis boundaries:
//!
//! - Windows Virtual Key codes ([`windows_vk`]), with the extended-key
//!   refinement for the shared `VK_RETURN` code;
//! - macOS HIToolbox key codes ([`macos_kvk`]);
//! - X11 Xkb keycodes ([`linux_xkb`]), bound at runtime through the server's
//!   symbolic key names.

pub mod linux_xkb;
pub mod macos_kvk;
pub mod vcode;
pub mod windows_vk;

pub use linux_xkb::XkbKeymap;
pub use vcode::{VirtualKey, CHAR_UNDEFINED};

/// Unified key mapper providing the compile-time translation directions.
///
/// The X11 direction is not represented here because its native identifiers
/// only exist relative to a live server; see [`XkbKeymap`].
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a Windows Virtual Key code to a [`VirtualKey`].
    pub fn windows_vk_to_key(vk: u16, extended: bool) -> VirtualKey {
        windows_vk::vk_to_key(vk, extended)
    }

    /// Translates a [`VirtualKey`] to a Windows Virtual Key code.
    pub fn key_to_windows_vk(key: VirtualKey) -> Option<u16> {
        windows_vk::key_to_vk(key)
    }

    /// Translates a macOS key code to a [`VirtualKey`].
    pub fn macos_kvk_to_key(keycode: u16) -> VirtualKey {
        macos_kvk::kvk_to_key(keycode)
    }

    /// Translates a [`VirtualKey`] to a macOS key code.
    pub fn key_to_macos_kvk(key: VirtualKey) -> Option<u16> {
        macos_kvk::key_to_kvk(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_matches_table_modules() {
        assert_eq!(KeyMapper::windows_vk_to_key(0x41, false), VirtualKey::A);
        assert_eq!(KeyMapper::key_to_windows_vk(VirtualKey::A), Some(0x41));
        assert_eq!(KeyMapper::macos_kvk_to_key(0x00), VirtualKey::A);
        assert_eq!(KeyMapper::key_to_macos_kvk(VirtualKey::A), Some(0x00));
    }

    #[test]
    fn test_same_key_reaches_both_platforms() {
        // The same virtual key must be expressible on every compile-time
        // platform that has the physical key.
        for key in [
            VirtualKey::A,
            VirtualKey::Enter,
            VirtualKey::KpEnter,
            VirtualKey::ShiftLeft,
            VirtualKey::F12,
            VirtualKey::Space,
        ] {
            assert!(KeyMapper::key_to_windows_vk(key).is_some(), "{key:?} on Windows");
            assert!(KeyMapper::key_to_macos_kvk(key).is_some(), "{key:?} on macOS");
        }
    }
}
