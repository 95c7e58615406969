//! X11 Xkb key name translation table.
//!
//! Unlike Windows and macOS, the native identifier on X11 is a **runtime**
//! value: the Xkb keycode assigned by the server.  What is stable is the
//! four-character Xkb symbolic key name (`"AC01"` is the home-row key that
//! carries `A` on a QWERTY layout, `"FK01"` is F1, and so on).  This module
//! stores the virtual-key ↔ name pairs; at hook start the X11 backend walks
//! the server's `min_keycode..max_keycode` name table and binds each row to
//! the keycode that carries its name, producing an [`XkbKeymap`].
//!
//! Names shorter than four characters are NUL-padded, matching the fixed
//! `char[4]` fields Xkb reports.  The table is multi-valued on the name
//! side; aliases such as `"AC12"`/`"BKSL"` both resolve to the backslash
//! key, and the first *bound* row wins for synthesis.

use super::vcode::VirtualKey;

/// Length of an Xkb symbolic key name.
pub const XKB_NAME_LEN: usize = 4;

/// Virtual key / Xkb symbolic name pairs, in binding-priority order.
const VCODE_NAME_TABLE: &[(VirtualKey, &[u8; XKB_NAME_LEN])] = &[
    (VirtualKey::Escape, b"ESC\0"),
    (VirtualKey::F1, b"FK01"),
    (VirtualKey::F2, b"FK02"),
    (VirtualKey::F3, b"FK03"),
    (VirtualKey::F4, b"FK04"),
    (VirtualKey::F5, b"FK05"),
    (VirtualKey::F6, b"FK06"),
    (VirtualKey::F7, b"FK07"),
    (VirtualKey::F8, b"FK08"),
    (VirtualKey::F9, b"FK09"),
    (VirtualKey::F10, b"FK10"),
    (VirtualKey::F11, b"FK11"),
    (VirtualKey::F12, b"FK12"),
    (VirtualKey::F13, b"FK13"),
    (VirtualKey::F14, b"FK14"),
    (VirtualKey::F15, b"FK15"),
    (VirtualKey::F16, b"FK16"),
    (VirtualKey::F17, b"FK17"),
    (VirtualKey::F18, b"FK18"),
    (VirtualKey::F19, b"FK19"),
    (VirtualKey::F20, b"FK20"),
    (VirtualKey::F21, b"FK21"),
    (VirtualKey::F22, b"FK22"),
    (VirtualKey::F23, b"FK23"),
    (VirtualKey::F24, b"FK24"),
    (VirtualKey::BackQuote, b"TLDE"),
    (VirtualKey::Digit1, b"AE01"),
    (VirtualKey::Digit2, b"AE02"),
    (VirtualKey::Digit3, b"AE03"),
    (VirtualKey::Digit4, b"AE04"),
    (VirtualKey::Digit5, b"AE05"),
    (VirtualKey::Digit6, b"AE06"),
    (VirtualKey::Digit7, b"AE07"),
    (VirtualKey::Digit8, b"AE08"),
    (VirtualKey::Digit9, b"AE09"),
    (VirtualKey::Digit0, b"AE10"),
    (VirtualKey::Minus, b"AE11"),
    (VirtualKey::Equals, b"AE12"),
    (VirtualKey::Backspace, b"BKSP"),
    (VirtualKey::Tab, b"TAB\0"),
    (VirtualKey::Q, b"AD01"),
    (VirtualKey::W, b"AD02"),
    (VirtualKey::E, b"AD03"),
    (VirtualKey::R, b"AD04"),
    (VirtualKey::T, b"AD05"),
    (VirtualKey::Y, b"AD06"),
    (VirtualKey::U, b"AD07"),
    (VirtualKey::I, b"AD08"),
    (VirtualKey::O, b"AD09"),
    (VirtualKey::P, b"AD10"),
    (VirtualKey::OpenBracket, b"AD11"),
    (VirtualKey::CloseBracket, b"AD12"),
    (VirtualKey::Enter, b"RTRN"),
    (VirtualKey::CapsLock, b"CAPS"),
    (VirtualKey::A, b"AC01"),
    (VirtualKey::S, b"AC02"),
    (VirtualKey::D, b"AC03"),
    (VirtualKey::F, b"AC04"),
    (VirtualKey::G, b"AC05"),
    (VirtualKey::H, b"AC06"),
    (VirtualKey::J, b"AC07"),
    (VirtualKey::K, b"AC08"),
    (VirtualKey::L, b"AC09"),
    (VirtualKey::Semicolon, b"AC10"),
    (VirtualKey::Quote, b"AC11"),
    (VirtualKey::BackSlash, b"AC12"),
    (VirtualKey::BackSlash, b"BKSL"),
    (VirtualKey::ShiftLeft, b"LFSH"),
    (VirtualKey::Z, b"AB01"),
    (VirtualKey::X, b"AB02"),
    (VirtualKey::C, b"AB03"),
    (VirtualKey::V, b"AB04"),
    (VirtualKey::B, b"AB05"),
    (VirtualKey::N, b"AB06"),
    (VirtualKey::M, b"AB07"),
    (VirtualKey::Comma, b"AB08"),
    (VirtualKey::Period, b"AB09"),
    (VirtualKey::Slash, b"AB10"),
    (VirtualKey::ShiftRight, b"RTSH"),
    (VirtualKey::Key102, b"LSGT"),
    (VirtualKey::AltLeft, b"LALT"),
    (VirtualKey::ControlLeft, b"LCTL"),
    (VirtualKey::MetaLeft, b"LWIN"),
    (VirtualKey::MetaLeft, b"LMTA"),
    (VirtualKey::Space, b"SPCE"),
    (VirtualKey::MetaRight, b"RWIN"),
    (VirtualKey::MetaRight, b"RMTA"),
    (VirtualKey::ControlRight, b"RCTL"),
    (VirtualKey::AltRight, b"RALT"),
    (VirtualKey::ContextMenu, b"COMP"),
    (VirtualKey::ContextMenu, b"MENU"),
    (VirtualKey::PrintScreen, b"PRSC"),
    (VirtualKey::ScrollLock, b"SCLK"),
    (VirtualKey::Pause, b"PAUS"),
    (VirtualKey::Insert, b"INS\0"),
    (VirtualKey::Home, b"HOME"),
    (VirtualKey::PageUp, b"PGUP"),
    (VirtualKey::Delete, b"DELE"),
    (VirtualKey::End, b"END\0"),
    (VirtualKey::PageDown, b"PGDN"),
    (VirtualKey::Up, b"UP\0\0"),
    (VirtualKey::Left, b"LEFT"),
    (VirtualKey::Down, b"DOWN"),
    (VirtualKey::Right, b"RGHT"),
    (VirtualKey::NumLock, b"NMLK"),
    (VirtualKey::KpDivide, b"KPDV"),
    (VirtualKey::KpMultiply, b"KPMU"),
    (VirtualKey::KpSubtract, b"KPSU"),
    (VirtualKey::Kp7, b"KP7\0"),
    (VirtualKey::Kp8, b"KP8\0"),
    (VirtualKey::Kp9, b"KP9\0"),
    (VirtualKey::KpAdd, b"KPAD"),
    (VirtualKey::Kp4, b"KP4\0"),
    (VirtualKey::Kp5, b"KP5\0"),
    (VirtualKey::Kp6, b"KP6\0"),
    (VirtualKey::Kp1, b"KP1\0"),
    (VirtualKey::Kp2, b"KP2\0"),
    (VirtualKey::Kp3, b"KP3\0"),
    (VirtualKey::KpEnter, b"KPEN"),
    (VirtualKey::Kp0, b"KP0\0"),
    (VirtualKey::KpDecimal, b"KPDL"),
    (VirtualKey::KpEquals, b"KPEQ"),
    (VirtualKey::KatakanaHiragana, b"HKTG"),
    (VirtualKey::Underscore, b"AB11"),
    (VirtualKey::Convert, b"HENK"),
    (VirtualKey::NonConvert, b"MUHE"),
    (VirtualKey::Yen, b"AE13"),
    (VirtualKey::Katakana, b"KATA"),
    (VirtualKey::Hiragana, b"HIRA"),
    (VirtualKey::JpComma, b"JPCM"),
    (VirtualKey::Hangul, b"HNGL"),
    (VirtualKey::Hanja, b"HJCV"),
    (VirtualKey::VolumeMute, b"MUTE"),
    (VirtualKey::VolumeDown, b"VOL-"),
    (VirtualKey::VolumeUp, b"VOL+"),
    (VirtualKey::Power, b"POWR"),
    (VirtualKey::Stop, b"STOP"),
    (VirtualKey::Again, b"AGAI"),
    (VirtualKey::Props, b"PROP"),
    (VirtualKey::Undo, b"UNDO"),
    (VirtualKey::Front, b"FRNT"),
    (VirtualKey::Copy, b"COPY"),
    (VirtualKey::Open, b"OPEN"),
    (VirtualKey::Paste, b"PAST"),
    (VirtualKey::Find, b"FIND"),
    (VirtualKey::Cut, b"CUT\0"),
    (VirtualKey::Help, b"HELP"),
    (VirtualKey::SwitchVideoMode, b"OUTP"),
    (VirtualKey::KeyboardLightToggle, b"KITG"),
    (VirtualKey::KeyboardLightDown, b"KIDN"),
    (VirtualKey::KeyboardLightUp, b"KIUP"),
    (VirtualKey::LineFeed, b"LNFD"),
    (VirtualKey::Macro, b"I120"),
    (VirtualKey::VolumeMute, b"I121"),
    (VirtualKey::VolumeDown, b"I122"),
    (VirtualKey::VolumeUp, b"I123"),
    (VirtualKey::Power, b"I124"),
    (VirtualKey::KpEquals, b"I125"),
    (VirtualKey::KpPlusMinus, b"I126"),
    (VirtualKey::Pause, b"I127"),
    (VirtualKey::Scale, b"I128"),
    (VirtualKey::KpSeparator, b"I129"),
    (VirtualKey::Hangul, b"I130"),
    (VirtualKey::Hanja, b"I131"),
    (VirtualKey::Yen, b"I132"),
    (VirtualKey::MetaLeft, b"I133"),
    (VirtualKey::MetaRight, b"I134"),
    (VirtualKey::ContextMenu, b"I135"),
    (VirtualKey::Stop, b"I136"),
    (VirtualKey::Again, b"I137"),
    (VirtualKey::Props, b"I138"),
    (VirtualKey::Undo, b"I139"),
    (VirtualKey::Front, b"I140"),
    (VirtualKey::Copy, b"I141"),
    (VirtualKey::Open, b"I142"),
    (VirtualKey::Paste, b"I143"),
    (VirtualKey::Find, b"I144"),
    (VirtualKey::Cut, b"I145"),
    (VirtualKey::Help, b"I146"),
    (VirtualKey::ContextMenu, b"I147"),
    (VirtualKey::AppCalculator, b"I148"),
    (VirtualKey::Setup, b"I149"),
    (VirtualKey::Sleep, b"I150"),
    (VirtualKey::Wake, b"I151"),
    (VirtualKey::File, b"I152"),
    (VirtualKey::SendFile, b"I153"),
    (VirtualKey::DeleteFile, b"I154"),
    (VirtualKey::ModeChange, b"I155"),
    (VirtualKey::App1, b"I156"),
    (VirtualKey::App2, b"I157"),
    (VirtualKey::AppBrowser, b"I158"),
    (VirtualKey::MsDos, b"I159"),
    (VirtualKey::Lock, b"I160"),
    (VirtualKey::RotateDisplay, b"I161"),
    (VirtualKey::CycleWindows, b"I162"),
    (VirtualKey::AppMail, b"I163"),
    (VirtualKey::BrowserFavorites, b"I164"),
    (VirtualKey::Computer, b"I165"),
    (VirtualKey::BrowserBack, b"I166"),
    (VirtualKey::BrowserForward, b"I167"),
    (VirtualKey::MediaClose, b"I168"),
    (VirtualKey::MediaEject, b"I169"),
    (VirtualKey::MediaEjectClose, b"I170"),
    (VirtualKey::MediaNext, b"I171"),
    (VirtualKey::MediaPlay, b"I172"),
    (VirtualKey::MediaPrevious, b"I173"),
    (VirtualKey::MediaStop, b"I174"),
    (VirtualKey::MediaRecord, b"I175"),
    (VirtualKey::MediaRewind, b"I176"),
    (VirtualKey::Phone, b"I177"),
    (VirtualKey::Iso, b"I178"),
    (VirtualKey::Config, b"I179"),
    (VirtualKey::BrowserHome, b"I180"),
    (VirtualKey::BrowserRefresh, b"I181"),
    (VirtualKey::Exit, b"I182"),
    (VirtualKey::Move, b"I183"),
    (VirtualKey::Edit, b"I184"),
    (VirtualKey::ScrollUp, b"I185"),
    (VirtualKey::ScrollDown, b"I186"),
    (VirtualKey::KpOpenParenthesis, b"I187"),
    (VirtualKey::KpCloseParenthesis, b"I188"),
    (VirtualKey::New, b"I189"),
    (VirtualKey::Redo, b"I190"),
    (VirtualKey::F13, b"I191"),
    (VirtualKey::F14, b"I192"),
    (VirtualKey::F15, b"I193"),
    (VirtualKey::F16, b"I194"),
    (VirtualKey::F17, b"I195"),
    (VirtualKey::F18, b"I196"),
    (VirtualKey::F19, b"I197"),
    (VirtualKey::F20, b"I198"),
    (VirtualKey::F21, b"I199"),
    (VirtualKey::F22, b"I200"),
    (VirtualKey::F23, b"I201"),
    (VirtualKey::F24, b"I202"),
    (VirtualKey::PlayCd, b"I208"),
    (VirtualKey::PauseCd, b"I209"),
    (VirtualKey::App3, b"I210"),
    (VirtualKey::App4, b"I211"),
    (VirtualKey::Dashboard, b"I212"),
    (VirtualKey::Suspend, b"I213"),
    (VirtualKey::Close, b"I214"),
    (VirtualKey::Play, b"I215"),
    (VirtualKey::FastForward, b"I216"),
    (VirtualKey::BassBoost, b"I217"),
    (VirtualKey::Print, b"I218"),
    (VirtualKey::Hp, b"I219"),
    (VirtualKey::Camera, b"I220"),
    (VirtualKey::Sound, b"I221"),
    (VirtualKey::Question, b"I222"),
    (VirtualKey::Email, b"I223"),
    (VirtualKey::Chat, b"I224"),
    (VirtualKey::BrowserSearch, b"I225"),
    (VirtualKey::Connect, b"I226"),
    (VirtualKey::Finance, b"I227"),
    (VirtualKey::Sport, b"I228"),
    (VirtualKey::Shop, b"I229"),
    (VirtualKey::AltErase, b"I230"),
    (VirtualKey::Cancel, b"I231"),
    (VirtualKey::BrightnessDown, b"I232"),
    (VirtualKey::BrightnessUp, b"I233"),
    (VirtualKey::Media, b"I234"),
    (VirtualKey::SwitchVideoMode, b"I235"),
    (VirtualKey::KeyboardLightToggle, b"I236"),
    (VirtualKey::KeyboardLightDown, b"I237"),
    (VirtualKey::KeyboardLightUp, b"I238"),
    (VirtualKey::Send, b"I239"),
    (VirtualKey::Reply, b"I240"),
    (VirtualKey::ForwardMail, b"I241"),
    (VirtualKey::Save, b"I242"),
    (VirtualKey::Documents, b"I243"),
    (VirtualKey::Battery, b"I244"),
    (VirtualKey::Bluetooth, b"I245"),
    (VirtualKey::Wlan, b"I246"),
    (VirtualKey::Uwb, b"I247"),
    (VirtualKey::X11Unknown, b"I248"),
    (VirtualKey::VideoNext, b"I249"),
    (VirtualKey::VideoPrevious, b"I250"),
    (VirtualKey::BrightnessCycle, b"I251"),
    (VirtualKey::BrightnessAuto, b"I252"),
    (VirtualKey::DisplayOff, b"I253"),
    (VirtualKey::Wwan, b"I254"),
    (VirtualKey::Rfkill, b"I255"),
];

/// An Xkb name table bound to the keycodes of a live server.
///
/// Built once per hook session from the server's keycode→name map; all
/// lookups afterwards are pure.
#[derive(Debug, Clone)]
pub struct XkbKeymap {
    /// Resolved keycode per table row; 0 = the server has no key with that
    /// name.
    bindings: Vec<u8>,
}

impl XkbKeymap {
    /// An unbound keymap; every lookup misses.
    pub fn unbound() -> Self {
        XkbKeymap {
            bindings: vec![0; VCODE_NAME_TABLE.len()],
        }
    }

    /// Binds table rows from `(keycode, name)` pairs, typically the
    /// `min_keycode..max_keycode` walk of `XkbGetNames`.
    ///
    /// Unnamed positions (all-NUL names) never match.
    pub fn resolve<I>(names: I) -> Self
    where
        I: IntoIterator<Item = (u8, [u8; XKB_NAME_LEN])>,
    {
        let mut keymap = Self::unbound();
        for (keycode, name) in names {
            if name == [0; XKB_NAME_LEN] {
                continue;
            }
            for (slot, &(_, table_name)) in keymap
                .bindings
                .iter_mut()
                .zip(VCODE_NAME_TABLE.iter())
            {
                if *table_name == name {
                    *slot = keycode;
                }
            }
        }
        keymap
    }

    /// Xkb keycode → virtual key.  Returns [`VirtualKey::Undefined`] for
    /// unbound keycodes.
    pub fn keycode_to_key(&self, keycode: u8) -> VirtualKey {
        if keycode == 0 {
            return VirtualKey::Undefined;
        }
        for (&slot, &(key, _)) in self.bindings.iter().zip(VCODE_NAME_TABLE.iter()) {
            if slot == keycode {
                return key;
            }
        }
        VirtualKey::Undefined
    }

    /// Virtual key → Xkb keycode.  The first bound alias wins.
    pub fn key_to_keycode(&self, key: VirtualKey) -> Option<u8> {
        if key == VirtualKey::Undefined {
            return None;
        }
        self.bindings
            .iter()
            .zip(VCODE_NAME_TABLE.iter())
            .find(|&(&slot, &(candidate, _))| candidate == key && slot != 0)
            .map(|(&slot, _)| slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A miniature server name map modeled on a standard pc105 layout.
    fn sample_keymap() -> XkbKeymap {
        XkbKeymap::resolve([
            (9u8, *b"ESC\0"),
            (24, *b"AD01"),
            (36, *b"RTRN"),
            (38, *b"AC01"),
            (50, *b"LFSH"),
            (51, *b"BKSL"),
            (62, *b"RTSH"),
            (65, *b"SPCE"),
            (98, *b"UP\0\0"),
            (108, *b"KPEN"),
            (121, *b"MUTE"),
            (133, *b"LWIN"),
            (255, *b"\0\0\0\0"),
        ])
    }

    #[test]
    fn test_keycode_to_key_for_bound_rows() {
        let keymap = sample_keymap();
        assert_eq!(keymap.keycode_to_key(9), VirtualKey::Escape);
        assert_eq!(keymap.keycode_to_key(24), VirtualKey::Q);
        assert_eq!(keymap.keycode_to_key(36), VirtualKey::Enter);
        assert_eq!(keymap.keycode_to_key(38), VirtualKey::A);
        assert_eq!(keymap.keycode_to_key(98), VirtualKey::Up);
        assert_eq!(keymap.keycode_to_key(108), VirtualKey::KpEnter);
        assert_eq!(keymap.keycode_to_key(133), VirtualKey::MetaLeft);
    }

    #[test]
    fn test_unbound_keycodes_are_undefined() {
        let keymap = sample_keymap();
        assert_eq!(keymap.keycode_to_key(10), VirtualKey::Undefined);
        assert_eq!(keymap.keycode_to_key(0), VirtualKey::Undefined);
        assert_eq!(keymap.keycode_to_key(255), VirtualKey::Undefined);
    }

    #[test]
    fn test_alias_rows_share_a_key() {
        // Only the BKSL alias is present in the sample; both directions must
        // still work through it.
        let keymap = sample_keymap();
        assert_eq!(keymap.keycode_to_key(51), VirtualKey::BackSlash);
        assert_eq!(keymap.key_to_keycode(VirtualKey::BackSlash), Some(51));

        // A keyboard exposing the AC12 alias instead binds the same key.
        let alias = XkbKeymap::resolve([(51u8, *b"AC12")]);
        assert_eq!(alias.keycode_to_key(51), VirtualKey::BackSlash);
    }

    #[test]
    fn test_key_to_keycode_misses_for_absent_keys() {
        let keymap = sample_keymap();
        assert_eq!(keymap.key_to_keycode(VirtualKey::F24), None);
        assert_eq!(keymap.key_to_keycode(VirtualKey::Undefined), None);
    }

    #[test]
    fn test_unbound_keymap_misses_everything() {
        let keymap = XkbKeymap::unbound();
        assert_eq!(keymap.keycode_to_key(38), VirtualKey::Undefined);
        assert_eq!(keymap.key_to_keycode(VirtualKey::A), None);
    }

    #[test]
    fn test_resolve_binds_every_standard_alpha_row() {
        // Bind the full home row and verify each position.
        let keymap = XkbKeymap::resolve([
            (38u8, *b"AC01"),
            (39, *b"AC02"),
            (40, *b"AC03"),
            (41, *b"AC04"),
            (42, *b"AC05"),
            (43, *b"AC06"),
            (44, *b"AC07"),
            (45, *b"AC08"),
            (46, *b"AC09"),
            (47, *b"AC10"),
            (48, *b"AC11"),
        ]);
        let expected = [
            VirtualKey::A,
            VirtualKey::S,
            VirtualKey::D,
            VirtualKey::F,
            VirtualKey::G,
            VirtualKey::H,
            VirtualKey::J,
            VirtualKey::K,
            VirtualKey::L,
            VirtualKey::Semicolon,
            VirtualKey::Quote,
        ];
        for (offset, key) in expected.iter().enumerate() {
            assert_eq!(keymap.keycode_to_key(38 + offset as u8), *key);
        }
    }
}
