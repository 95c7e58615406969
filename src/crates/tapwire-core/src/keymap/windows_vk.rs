//! Windows Virtual Key (VK) code translation table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! The table is deliberately **multi-valued on the VK side**: Windows has
//! both side-specific codes (`VK_LSHIFT`/`VK_RSHIFT`) and the legacy
//! side-agnostic codes (`VK_SHIFT`), and both must resolve to a virtual key.
//! Lookups take the *first* matching row in each direction, so the row order
//! encodes which native code a virtual key synthesizes to and which virtual
//! key a shared native code reports as.
//!
//! `VK_RETURN` is also shared between the main Enter key and keypad Enter;
//! Windows disambiguates with the extended-key flag, which
//! [`vk_to_key`] applies as a post-lookup refinement.

use super::vcode::VirtualKey;

/// VK → virtual key translation.
///
/// `extended` is the low-level hook's extended-key flag; it promotes the
/// shared `VK_RETURN` code to the keypad Enter key.  Returns
/// [`VirtualKey::Undefined`] for VK codes with no mapping.
pub fn vk_to_key(vk: u16, extended: bool) -> VirtualKey {
    let mut key = VirtualKey::Undefined;
    for &(candidate, code) in VCODE_VK_TABLE {
        if code == vk {
            key = candidate;
            break;
        }
    }

    if key == VirtualKey::Enter && extended {
        key = VirtualKey::KpEnter;
    }

    key
}

/// Virtual key → VK translation.
///
/// Returns `None` for keys without a Windows equivalent.
pub fn key_to_vk(key: VirtualKey) -> Option<u16> {
    if key == VirtualKey::Undefined {
        return None;
    }
    VCODE_VK_TABLE
        .iter()
        .find(|&&(candidate, _)| candidate == key)
        .map(|&(_, code)| code)
}

/// Virtual key / VK code pairs; first match wins in both directions.
const VCODE_VK_TABLE: &[(VirtualKey, u16)] = &[
    (VirtualKey::Cancel, 0x03),             // VK_CANCEL
    (VirtualKey::Backspace, 0x08),          // VK_BACK
    (VirtualKey::Tab, 0x09),                // VK_TAB
    (VirtualKey::KpClear, 0x0C),            // VK_CLEAR
    (VirtualKey::KpClear, 0xFE),            // VK_OEM_CLEAR
    (VirtualKey::Enter, 0x0D),              // VK_RETURN
    (VirtualKey::KpEnter, 0x0D),            // VK_RETURN + extended flag
    (VirtualKey::ShiftLeft, 0xA0),          // VK_LSHIFT
    (VirtualKey::ShiftRight, 0xA1),         // VK_RSHIFT
    (VirtualKey::ShiftLeft, 0x10),          // VK_SHIFT
    (VirtualKey::ControlLeft, 0xA2),        // VK_LCONTROL
    (VirtualKey::ControlRight, 0xA3),       // VK_RCONTROL
    (VirtualKey::ControlLeft, 0x11),        // VK_CONTROL
    (VirtualKey::AltLeft, 0xA4),            // VK_LMENU
    (VirtualKey::AltRight, 0xA5),           // VK_RMENU
    (VirtualKey::AltLeft, 0x12),            // VK_MENU
    (VirtualKey::Pause, 0x13),              // VK_PAUSE
    (VirtualKey::CapsLock, 0x14),           // VK_CAPITAL
    (VirtualKey::Kana, 0x15),               // VK_KANA
    (VirtualKey::Hangul, 0x15),             // VK_HANGUL (shares 0x15)
    (VirtualKey::ImeOn, 0x16),              // VK_IME_ON
    (VirtualKey::Junja, 0x17),              // VK_JUNJA
    (VirtualKey::Final, 0x18),              // VK_FINAL
    (VirtualKey::Hanja, 0x19),              // VK_HANJA
    (VirtualKey::Kanji, 0x19),              // VK_KANJI (shares 0x19)
    (VirtualKey::ImeOff, 0x1A),             // VK_IME_OFF
    (VirtualKey::Escape, 0x1B),             // VK_ESCAPE
    (VirtualKey::Convert, 0x1C),            // VK_CONVERT
    (VirtualKey::NonConvert, 0x1D),         // VK_NONCONVERT
    (VirtualKey::Accept, 0x1E),             // VK_ACCEPT
    (VirtualKey::ModeChange, 0x1F),         // VK_MODECHANGE
    (VirtualKey::Space, 0x20),              // VK_SPACE
    (VirtualKey::PageUp, 0x21),             // VK_PRIOR
    (VirtualKey::PageDown, 0x22),           // VK_NEXT
    (VirtualKey::End, 0x23),                // VK_END
    (VirtualKey::Home, 0x24),               // VK_HOME
    (VirtualKey::Left, 0x25),               // VK_LEFT
    (VirtualKey::Up, 0x26),                 // VK_UP
    (VirtualKey::Right, 0x27),              // VK_RIGHT
    (VirtualKey::Down, 0x28),               // VK_DOWN
    (VirtualKey::Select, 0x29),             // VK_SELECT
    (VirtualKey::Print, 0x2A),              // VK_PRINT
    (VirtualKey::Execute, 0x2B),            // VK_EXECUTE
    (VirtualKey::PrintScreen, 0x2C),        // VK_SNAPSHOT
    (VirtualKey::Insert, 0x2D),             // VK_INSERT
    (VirtualKey::Delete, 0x2E),             // VK_DELETE
    (VirtualKey::Help, 0x2F),               // VK_HELP
    (VirtualKey::Digit0, 0x30),
    (VirtualKey::Digit1, 0x31),
    (VirtualKey::Digit2, 0x32),
    (VirtualKey::Digit3, 0x33),
    (VirtualKey::Digit4, 0x34),
    (VirtualKey::Digit5, 0x35),
    (VirtualKey::Digit6, 0x36),
    (VirtualKey::Digit7, 0x37),
    (VirtualKey::Digit8, 0x38),
    (VirtualKey::Digit9, 0x39),
    (VirtualKey::A, 0x41),
    (VirtualKey::B, 0x42),
    (VirtualKey::C, 0x43),
    (VirtualKey::D, 0x44),
    (VirtualKey::E, 0x45),
    (VirtualKey::F, 0x46),
    (VirtualKey::G, 0x47),
    (VirtualKey::H, 0x48),
    (VirtualKey::I, 0x49),
    (VirtualKey::J, 0x4A),
    (VirtualKey::K, 0x4B),
    (VirtualKey::L, 0x4C),
    (VirtualKey::M, 0x4D),
    (VirtualKey::N, 0x4E),
    (VirtualKey::O, 0x4F),
    (VirtualKey::P, 0x50),
    (VirtualKey::Q, 0x51),
    (VirtualKey::R, 0x52),
    (VirtualKey::S, 0x53),
    (VirtualKey::T, 0x54),
    (VirtualKey::U, 0x55),
    (VirtualKey::V, 0x56),
    (VirtualKey::W, 0x57),
    (VirtualKey::X, 0x58),
    (VirtualKey::Y, 0x59),
    (VirtualKey::Z, 0x5A),
    (VirtualKey::MetaLeft, 0x5B),           // VK_LWIN
    (VirtualKey::MetaRight, 0x5C),          // VK_RWIN
    (VirtualKey::ContextMenu, 0x5D),        // VK_APPS
    (VirtualKey::Sleep, 0x5F),              // VK_SLEEP
    (VirtualKey::Kp0, 0x60),                // VK_NUMPAD0
    (VirtualKey::Kp1, 0x61),
    (VirtualKey::Kp2, 0x62),
    (VirtualKey::Kp3, 0x63),
    (VirtualKey::Kp4, 0x64),
    (VirtualKey::Kp5, 0x65),
    (VirtualKey::Kp6, 0x66),
    (VirtualKey::Kp7, 0x67),
    (VirtualKey::Kp8, 0x68),
    (VirtualKey::Kp9, 0x69),
    (VirtualKey::KpMultiply, 0x6A),         // VK_MULTIPLY
    (VirtualKey::KpAdd, 0x6B),              // VK_ADD
    (VirtualKey::KpSeparator, 0x6C),        // VK_SEPARATOR
    (VirtualKey::KpSubtract, 0x6D),         // VK_SUBTRACT
    (VirtualKey::KpDecimal, 0x6E),          // VK_DECIMAL
    (VirtualKey::KpDivide, 0x6F),           // VK_DIVIDE
    (VirtualKey::F1, 0x70),
    (VirtualKey::F2, 0x71),
    (VirtualKey::F3, 0x72),
    (VirtualKey::F4, 0x73),
    (VirtualKey::F5, 0x74),
    (VirtualKey::F6, 0x75),
    (VirtualKey::F7, 0x76),
    (VirtualKey::F8, 0x77),
    (VirtualKey::F9, 0x78),
    (VirtualKey::F10, 0x79),
    (VirtualKey::F11, 0x7A),
    (VirtualKey::F12, 0x7B),
    (VirtualKey::F13, 0x7C),
    (VirtualKey::F14, 0x7D),
    (VirtualKey::F15, 0x7E),
    (VirtualKey::F16, 0x7F),
    (VirtualKey::F17, 0x80),
    (VirtualKey::F18, 0x81),
    (VirtualKey::F19, 0x82),
    (VirtualKey::F20, 0x83),
    (VirtualKey::F21, 0x84),
    (VirtualKey::F22, 0x85),
    (VirtualKey::F23, 0x86),
    (VirtualKey::F24, 0x87),
    (VirtualKey::NumLock, 0x90),            // VK_NUMLOCK
    (VirtualKey::ScrollLock, 0x91),         // VK_SCROLL
    (VirtualKey::KpEquals, 0x92),           // keypad =
    (VirtualKey::BrowserBack, 0xA6),        // VK_BROWSER_BACK
    (VirtualKey::BrowserForward, 0xA7),     // VK_BROWSER_FORWARD
    (VirtualKey::BrowserRefresh, 0xA8),     // VK_BROWSER_REFRESH
    (VirtualKey::BrowserStop, 0xA9),        // VK_BROWSER_STOP
    (VirtualKey::BrowserSearch, 0xAA),      // VK_BROWSER_SEARCH
    (VirtualKey::BrowserFavorites, 0xAB),   // VK_BROWSER_FAVORITES
    (VirtualKey::BrowserHome, 0xAC),        // VK_BROWSER_HOME
    (VirtualKey::VolumeMute, 0xAD),         // VK_VOLUME_MUTE
    (VirtualKey::VolumeDown, 0xAE),         // VK_VOLUME_DOWN
    (VirtualKey::VolumeUp, 0xAF),           // VK_VOLUME_UP
    (VirtualKey::MediaNext, 0xB0),          // VK_MEDIA_NEXT_TRACK
    (VirtualKey::MediaPrevious, 0xB1),      // VK_MEDIA_PREV_TRACK
    (VirtualKey::MediaStop, 0xB2),          // VK_MEDIA_STOP
    (VirtualKey::MediaPlay, 0xB3),          // VK_MEDIA_PLAY_PAUSE
    (VirtualKey::AppMail, 0xB4),            // VK_LAUNCH_MAIL
    (VirtualKey::MediaSelect, 0xB5),        // VK_LAUNCH_MEDIA_SELECT
    (VirtualKey::App1, 0xB6),               // VK_LAUNCH_APP1
    (VirtualKey::App2, 0xB7),               // VK_LAUNCH_APP2
    (VirtualKey::Semicolon, 0xBA),          // VK_OEM_1
    (VirtualKey::Equals, 0xBB),             // VK_OEM_PLUS
    (VirtualKey::Comma, 0xBC),              // VK_OEM_COMMA
    (VirtualKey::Minus, 0xBD),              // VK_OEM_MINUS
    (VirtualKey::Period, 0xBE),             // VK_OEM_PERIOD
    (VirtualKey::Slash, 0xBF),              // VK_OEM_2
    (VirtualKey::BackQuote, 0xC0),          // VK_OEM_3
    (VirtualKey::OpenBracket, 0xDB),        // VK_OEM_4
    (VirtualKey::BackSlash, 0xDC),          // VK_OEM_5
    (VirtualKey::CloseBracket, 0xDD),       // VK_OEM_6
    (VirtualKey::Quote, 0xDE),              // VK_OEM_7
    (VirtualKey::Misc, 0xDF),               // VK_OEM_8
    (VirtualKey::Key102, 0xE2),             // VK_OEM_102
    (VirtualKey::Process, 0xE5),            // VK_PROCESSKEY
    (VirtualKey::Attn, 0xF6),               // VK_ATTN
    (VirtualKey::CrSel, 0xF7),              // VK_CRSEL
    (VirtualKey::ExSel, 0xF8),              // VK_EXSEL
    (VirtualKey::EraseEof, 0xF9),           // VK_EREOF
    (VirtualKey::Play, 0xFA),               // VK_PLAY
    (VirtualKey::Zoom, 0xFB),               // VK_ZOOM
    (VirtualKey::NoName, 0xFC),             // VK_NONAME
    (VirtualKey::Pa1, 0xFD),                // VK_PA1
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vk_to_key_for_representative_keys() {
        let cases: &[(u16, VirtualKey)] = &[
            (0x41, VirtualKey::A),
            (0x30, VirtualKey::Digit0),
            (0x0D, VirtualKey::Enter),
            (0x1B, VirtualKey::Escape),
            (0x20, VirtualKey::Space),
            (0x70, VirtualKey::F1),
            (0x7B, VirtualKey::F12),
            (0x87, VirtualKey::F24),
            (0x2C, VirtualKey::PrintScreen),
            (0x5B, VirtualKey::MetaLeft),
            (0xB3, VirtualKey::MediaPlay),
            (0xE2, VirtualKey::Key102),
        ];
        for &(vk, expected) in cases {
            assert_eq!(
                vk_to_key(vk, false),
                expected,
                "VK 0x{vk:02X} should map to {expected:?}"
            );
        }
    }

    #[test]
    fn test_side_agnostic_vk_codes_resolve_to_left_side() {
        assert_eq!(vk_to_key(0x10, false), VirtualKey::ShiftLeft); // VK_SHIFT
        assert_eq!(vk_to_key(0x11, false), VirtualKey::ControlLeft); // VK_CONTROL
        assert_eq!(vk_to_key(0x12, false), VirtualKey::AltLeft); // VK_MENU
        // The side-specific codes still win over the shared ones.
        assert_eq!(vk_to_key(0xA1, false), VirtualKey::ShiftRight);
        assert_eq!(vk_to_key(0xA3, false), VirtualKey::ControlRight);
    }

    #[test]
    fn test_extended_flag_promotes_enter_to_keypad_enter() {
        assert_eq!(vk_to_key(0x0D, false), VirtualKey::Enter);
        assert_eq!(vk_to_key(0x0D, true), VirtualKey::KpEnter);
        // The flag only affects the shared Enter code.
        assert_eq!(vk_to_key(0x41, true), VirtualKey::A);
    }

    #[test]
    fn test_key_to_vk_prefers_first_row() {
        assert_eq!(key_to_vk(VirtualKey::ShiftLeft), Some(0xA0)); // not VK_SHIFT
        assert_eq!(key_to_vk(VirtualKey::KpClear), Some(0x0C)); // not VK_OEM_CLEAR
        assert_eq!(key_to_vk(VirtualKey::KpEnter), Some(0x0D));
        assert_eq!(key_to_vk(VirtualKey::Hangul), Some(0x15));
    }

    #[test]
    fn test_unmapped_codes_are_sentinels() {
        assert_eq!(vk_to_key(0x07, false), VirtualKey::Undefined); // unassigned VK
        assert_eq!(key_to_vk(VirtualKey::Undefined), None);
        assert_eq!(key_to_vk(VirtualKey::Rfkill), None); // Linux-only key
    }

    #[test]
    fn test_round_trip_is_stable_for_mapped_keys() {
        // Forward-then-back must land on a native code that reports the same
        // key, or the forward lookup must have been the sentinel.
        for vk in 0x00u16..=0xFE {
            let key = vk_to_key(vk, false);
            if key == VirtualKey::Undefined {
                continue;
            }
            let back = key_to_vk(key).expect("mapped key must translate back");
            assert_eq!(vk_to_key(back, false), key, "VK 0x{vk:02X} drifted");
        }
    }
}
