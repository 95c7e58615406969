//! macOS HIToolbox key code translation table.
//!
//! Reference: `Carbon/HIToolbox/Events.h` (`kVK_*` constants).  The media
//! and power keys above 0xE0 are not HIToolbox codes; they are the NX
//! system-defined key identifiers offset into the spare range the hook's
//! system-event decoder reports them in (`0xE0 | NX_KEYTYPE_*`).
//!
//! Key codes identify physical ANSI key positions, so the table is
//! single-valued in both directions; lookups still take the first matching
//! row for symmetry with the other platforms.

use super::vcode::VirtualKey;

/// The "no key code" sentinel used by HIToolbox-based APIs.
pub const KVK_UNDEFINED: u16 = 0xFF;

/// macOS key code → virtual key translation.
///
/// Returns [`VirtualKey::Undefined`] for codes with no mapping.
pub fn kvk_to_key(keycode: u16) -> VirtualKey {
    for &(candidate, code) in VCODE_KVK_TABLE {
        if code == keycode {
            return candidate;
        }
    }
    VirtualKey::Undefined
}

/// Virtual key → macOS key code translation.
///
/// Returns `None` for keys without a macOS equivalent.
pub fn key_to_kvk(key: VirtualKey) -> Option<u16> {
    if key == VirtualKey::Undefined {
        return None;
    }
    VCODE_KVK_TABLE
        .iter()
        .find(|&&(candidate, _)| candidate == key)
        .map(|&(_, code)| code)
}

/// Virtual key / `kVK_*` code pairs.
const VCODE_KVK_TABLE: &[(VirtualKey, u16)] = &[
    (VirtualKey::A, 0x00),                  // kVK_ANSI_A
    (VirtualKey::S, 0x01),
    (VirtualKey::D, 0x02),
    (VirtualKey::F, 0x03),
    (VirtualKey::H, 0x04),
    (VirtualKey::G, 0x05),
    (VirtualKey::Z, 0x06),
    (VirtualKey::X, 0x07),
    (VirtualKey::C, 0x08),
    (VirtualKey::V, 0x09),
    (VirtualKey::Key102, 0x0A),             // kVK_ISO_Section
    (VirtualKey::B, 0x0B),
    (VirtualKey::Q, 0x0C),
    (VirtualKey::W, 0x0D),
    (VirtualKey::E, 0x0E),
    (VirtualKey::R, 0x0F),
    (VirtualKey::Y, 0x10),
    (VirtualKey::T, 0x11),
    (VirtualKey::Digit1, 0x12),
    (VirtualKey::Digit2, 0x13),
    (VirtualKey::Digit3, 0x14),
    (VirtualKey::Digit4, 0x15),
    (VirtualKey::Digit6, 0x16),
    (VirtualKey::Digit5, 0x17),
    (VirtualKey::Equals, 0x18),             // kVK_ANSI_Equal
    (VirtualKey::Digit9, 0x19),
    (VirtualKey::Digit7, 0x1A),
    (VirtualKey::Minus, 0x1B),
    (VirtualKey::Digit8, 0x1C),
    (VirtualKey::Digit0, 0x1D),
    (VirtualKey::CloseBracket, 0x1E),
    (VirtualKey::O, 0x1F),
    (VirtualKey::U, 0x20),
    (VirtualKey::OpenBracket, 0x21),
    (VirtualKey::I, 0x22),
    (VirtualKey::P, 0x23),
    (VirtualKey::Enter, 0x24),              // kVK_Return
    (VirtualKey::L, 0x25),
    (VirtualKey::J, 0x26),
    (VirtualKey::Quote, 0x27),
    (VirtualKey::K, 0x28),
    (VirtualKey::Semicolon, 0x29),
    (VirtualKey::BackSlash, 0x2A),
    (VirtualKey::Comma, 0x2B),
    (VirtualKey::Slash, 0x2C),
    (VirtualKey::N, 0x2D),
    (VirtualKey::M, 0x2E),
    (VirtualKey::Period, 0x2F),
    (VirtualKey::Tab, 0x30),                // kVK_Tab
    (VirtualKey::Space, 0x31),              // kVK_Space
    (VirtualKey::BackQuote, 0x32),          // kVK_ANSI_Grave
    (VirtualKey::Backspace, 0x33),          // kVK_Delete
    (VirtualKey::Escape, 0x35),             // kVK_Escape
    (VirtualKey::MetaRight, 0x36),          // kVK_RightCommand
    (VirtualKey::MetaLeft, 0x37),           // kVK_Command
    (VirtualKey::ShiftLeft, 0x38),          // kVK_Shift
    (VirtualKey::CapsLock, 0x39),           // kVK_CapsLock
    (VirtualKey::AltLeft, 0x3A),            // kVK_Option
    (VirtualKey::ControlLeft, 0x3B),        // kVK_Control
    (VirtualKey::ShiftRight, 0x3C),         // kVK_RightShift
    (VirtualKey::AltRight, 0x3D),           // kVK_RightOption
    (VirtualKey::ControlRight, 0x3E),       // kVK_RightControl
    (VirtualKey::Function, 0x3F),           // kVK_Function
    (VirtualKey::F17, 0x40),
    (VirtualKey::KpDecimal, 0x41),
    (VirtualKey::KpMultiply, 0x43),
    (VirtualKey::KpAdd, 0x45),
    (VirtualKey::KpClear, 0x47),            // kVK_ANSI_KeypadClear
    (VirtualKey::VolumeUp, 0x48),
    (VirtualKey::VolumeDown, 0x49),
    (VirtualKey::VolumeMute, 0x4A),
    (VirtualKey::KpDivide, 0x4B),
    (VirtualKey::KpEnter, 0x4C),
    (VirtualKey::KpSubtract, 0x4E),
    (VirtualKey::F18, 0x4F),
    (VirtualKey::F19, 0x50),
    (VirtualKey::KpEquals, 0x51),
    (VirtualKey::Kp0, 0x52),
    (VirtualKey::Kp1, 0x53),
    (VirtualKey::Kp2, 0x54),
    (VirtualKey::Kp3, 0x55),
    (VirtualKey::Kp4, 0x56),
    (VirtualKey::Kp5, 0x57),
    (VirtualKey::Kp6, 0x58),
    (VirtualKey::Kp7, 0x59),
    (VirtualKey::F20, 0x5A),
    (VirtualKey::Kp8, 0x5B),
    (VirtualKey::Kp9, 0x5C),
    (VirtualKey::Yen, 0x5D),                // kVK_JIS_Yen
    (VirtualKey::Underscore, 0x5E),         // kVK_JIS_Underscore
    (VirtualKey::JpComma, 0x5F),            // kVK_JIS_KeypadComma
    (VirtualKey::F5, 0x60),
    (VirtualKey::F6, 0x61),
    (VirtualKey::F7, 0x62),
    (VirtualKey::F3, 0x63),
    (VirtualKey::F8, 0x64),
    (VirtualKey::F9, 0x65),
    (VirtualKey::Alphanumeric, 0x66),       // kVK_JIS_Eisu
    (VirtualKey::F11, 0x67),
    (VirtualKey::Kana, 0x68),               // kVK_JIS_Kana
    (VirtualKey::F13, 0x69),
    (VirtualKey::F16, 0x6A),
    (VirtualKey::F14, 0x6B),
    (VirtualKey::F10, 0x6D),
    (VirtualKey::ContextMenu, 0x6E),        // kMenuPowerGlyph position
    (VirtualKey::F12, 0x6F),
    (VirtualKey::F15, 0x71),
    (VirtualKey::Help, 0x72),
    (VirtualKey::Home, 0x73),
    (VirtualKey::PageUp, 0x74),
    (VirtualKey::Delete, 0x75),             // kVK_ForwardDelete
    (VirtualKey::F4, 0x76),
    (VirtualKey::End, 0x77),
    (VirtualKey::F2, 0x78),
    (VirtualKey::PageDown, 0x79),
    (VirtualKey::F1, 0x7A),
    (VirtualKey::Left, 0x7B),
    (VirtualKey::Right, 0x7C),
    (VirtualKey::Down, 0x7D),
    (VirtualKey::Up, 0x7E),
    (VirtualKey::ChangeInputSource, 0xB3),
    // NX system-defined keys, reported as 0xE0 | NX_KEYTYPE_*.
    (VirtualKey::Power, 0xE6),
    (VirtualKey::MediaEject, 0xEE),
    (VirtualKey::MediaPlay, 0xF0),
    (VirtualKey::MediaNext, 0xF1),
    (VirtualKey::MediaPrevious, 0xF2),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kvk_to_key_for_representative_keys() {
        let cases: &[(u16, VirtualKey)] = &[
            (0x00, VirtualKey::A),
            (0x0A, VirtualKey::Key102),
            (0x24, VirtualKey::Enter),
            (0x31, VirtualKey::Space),
            (0x36, VirtualKey::MetaRight),
            (0x37, VirtualKey::MetaLeft),
            (0x3F, VirtualKey::Function),
            (0x4C, VirtualKey::KpEnter),
            (0x5D, VirtualKey::Yen),
            (0x75, VirtualKey::Delete),
            (0x7A, VirtualKey::F1),
            (0xF0, VirtualKey::MediaPlay),
        ];
        for &(code, expected) in cases {
            assert_eq!(
                kvk_to_key(code),
                expected,
                "kVK 0x{code:02X} should map to {expected:?}"
            );
        }
    }

    #[test]
    fn test_key_to_kvk_inverse_for_every_row() {
        for code in 0x00u16..=0xFE {
            let key = kvk_to_key(code);
            if key == VirtualKey::Undefined {
                continue;
            }
            assert_eq!(
                key_to_kvk(key),
                Some(code),
                "kVK 0x{code:02X} should round-trip"
            );
        }
    }

    #[test]
    fn test_unmapped_codes_are_sentinels() {
        assert_eq!(kvk_to_key(0x34), VirtualKey::Undefined);
        assert_eq!(kvk_to_key(KVK_UNDEFINED), VirtualKey::Undefined);
        assert_eq!(key_to_kvk(VirtualKey::Undefined), None);
        assert_eq!(key_to_kvk(VirtualKey::BrowserBack), None);
    }
}
