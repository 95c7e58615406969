//! The virtual key code space.
//!
//! Every physical key tapwire can observe or synthesize is identified by a
//! [`VirtualKey`] — a stable 16-bit code that is the same on Windows, macOS
//! and X11.  Platform-native identifiers (Windows VK codes, HIToolbox
//! `kVK_*` values, Xkb keycodes) are translated to and from this space at
//! the capture and synthesis boundaries by the sibling table modules.
//!
//! # Why position codes instead of characters? (for beginners)
//!
//! A virtual key identifies a *key*, not a *character*.  The character a key
//! produces depends on the active keyboard layout and held modifiers; the
//! key itself does not.  Hook consumers that want the typed character get it
//! from the separate key-typed events, which run the platform's layout
//! translation.
//!
//! # The `Undefined` sentinel
//!
//! Not every native code has a mapping (vendor keys, exotic hardware).
//! [`VirtualKey::Undefined`] (value 0x0000) stands in for those.  Capture
//! still delivers events carrying `Undefined` so consumers can see unknown
//! keys via the rawcode, but `Undefined` is never synthesizable.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr};

use crate::event::mask::ModifierMask;

/// The UTF-16 "no typed character" sentinel carried by non-typed key events.
pub const CHAR_UNDEFINED: u16 = 0xFFFF;

/// Stable cross-platform identifier for a physical key.
///
/// The numeric value of each variant is its wire/API identity; values are
/// partitioned into zones (function keys, alphanumerics, edit/cursor,
/// keypad, modifiers with distinct left/right variants, media and browser
/// shortcut keys, IME keys, and extended Linux keys).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, FromRepr,
)]
#[repr(u16)]
pub enum VirtualKey {
    /// Sentinel for keys with no cross-platform mapping.
    Undefined = 0x0000,

    Escape = 0x001B,

    // Function keys
    F1 = 0x0070,
    F2 = 0x0071,
    F3 = 0x0072,
    F4 = 0x0073,
    F5 = 0x0074,
    F6 = 0x0075,
    F7 = 0x0076,
    F8 = 0x0077,
    F9 = 0x0078,
    F10 = 0x0079,
    F11 = 0x007A,
    F12 = 0x007B,
    F13 = 0xF000,
    F14 = 0xF001,
    F15 = 0xF002,
    F16 = 0xF003,
    F17 = 0xF004,
    F18 = 0xF005,
    F19 = 0xF006,
    F20 = 0xF007,
    F21 = 0xF008,
    F22 = 0xF009,
    F23 = 0xF00A,
    F24 = 0xF00B,

    // Alphanumeric zone
    BackQuote = 0x00C0,
    Digit0 = 0x0030,
    Digit1 = 0x0031,
    Digit2 = 0x0032,
    Digit3 = 0x0033,
    Digit4 = 0x0034,
    Digit5 = 0x0035,
    Digit6 = 0x0036,
    Digit7 = 0x0037,
    Digit8 = 0x0038,
    Digit9 = 0x0039,
    Minus = 0x002D,
    Equals = 0x003D,
    Backspace = 0x0008,
    Tab = 0x0009,
    CapsLock = 0x0014,
    A = 0x0041,
    B = 0x0042,
    C = 0x0043,
    D = 0x0044,
    E = 0x0045,
    F = 0x0046,
    G = 0x0047,
    H = 0x0048,
    I = 0x0049,
    J = 0x004A,
    K = 0x004B,
    L = 0x004C,
    M = 0x004D,
    N = 0x004E,
    O = 0x004F,
    P = 0x0050,
    Q = 0x0051,
    R = 0x0052,
    S = 0x0053,
    T = 0x0054,
    U = 0x0055,
    V = 0x0056,
    W = 0x0057,
    X = 0x0058,
    Y = 0x0059,
    Z = 0x005A,
    OpenBracket = 0x005B,
    CloseBracket = 0x005C,
    BackSlash = 0x005D,
    Semicolon = 0x003B,
    Quote = 0x00DE,
    Enter = 0x000A,
    Comma = 0x002C,
    Period = 0x002E,
    Slash = 0x002F,
    Space = 0x0020,
    /// The extra key on 102-key international layouts (`VK_OEM_102`,
    /// `kVK_ISO_Section`, Xkb `LSGT`).
    Key102 = 0x0099,
    Misc = 0x0E01,

    // Edit key zone
    PrintScreen = 0x009A,
    Print = 0x009C,
    Select = 0x009D,
    Execute = 0x009E,
    ScrollLock = 0x0091,
    Pause = 0x0013,
    Cancel = 0x00D3,
    Help = 0x009F,
    Insert = 0x009B,
    Delete = 0x007F,
    Home = 0x0024,
    End = 0x0023,
    PageUp = 0x0021,
    PageDown = 0x0022,

    // Cursor key zone
    Up = 0x0026,
    Left = 0x0025,
    Right = 0x0027,
    Down = 0x0028,

    // Numeric keypad zone
    NumLock = 0x0090,
    KpClear = 0x000C,
    KpDivide = 0x006F,
    KpMultiply = 0x006A,
    KpSubtract = 0x006D,
    KpEquals = 0x007C,
    KpAdd = 0x006B,
    KpEnter = 0x007D,
    KpDecimal = 0x006E,
    KpSeparator = 0x006C,
    KpPlusMinus = 0x007E,
    Kp0 = 0x0060,
    Kp1 = 0x0061,
    Kp2 = 0x0062,
    Kp3 = 0x0063,
    Kp4 = 0x0064,
    Kp5 = 0x0065,
    Kp6 = 0x0066,
    Kp7 = 0x0067,
    Kp8 = 0x0068,
    Kp9 = 0x0069,
    KpOpenParenthesis = 0xEE01,
    KpCloseParenthesis = 0xEE02,

    // Modifier and control keys
    ShiftLeft = 0xA010,
    ShiftRight = 0xB010,
    ControlLeft = 0xA011,
    ControlRight = 0xB011,
    /// Option on macOS.
    AltLeft = 0xA012,
    AltRight = 0xB012,
    /// Windows key, or Command on macOS.
    MetaLeft = 0xA09D,
    MetaRight = 0xB09D,
    ContextMenu = 0x020D,
    /// macOS only.
    Function = 0x020E,
    /// macOS only.
    ChangeInputSource = 0x020F,

    // Shortcut keys
    Power = 0xE05E,
    Sleep = 0xE05F,
    Wake = 0xE063,
    Media = 0xE023,
    MediaPlay = 0xE022,
    MediaStop = 0xE024,
    MediaPrevious = 0xE010,
    MediaNext = 0xE019,
    MediaSelect = 0xE06D,
    MediaEject = 0xE02C,
    MediaClose = 0xE02D,
    MediaEjectClose = 0xE02F,
    MediaRecord = 0xE031,
    MediaRewind = 0xE033,
    VolumeMute = 0xE020,
    VolumeDown = 0xE030,
    VolumeUp = 0xE02E,
    Attn = 0xE090,
    CrSel = 0xE091,
    ExSel = 0xE092,
    EraseEof = 0xE093,
    Play = 0xE094,
    Zoom = 0xE095,
    NoName = 0xE096,
    Pa1 = 0xE097,
    App1 = 0xE026,
    App2 = 0xE027,
    App3 = 0xE028,
    App4 = 0xE029,
    AppBrowser = 0xE025,
    AppCalculator = 0xE021,
    AppMail = 0xE06C,
    BrowserSearch = 0xE065,
    BrowserHome = 0xE032,
    BrowserBack = 0xE06A,
    BrowserForward = 0xE069,
    BrowserStop = 0xE068,
    BrowserRefresh = 0xE067,
    BrowserFavorites = 0xE066,

    // IME and Asian language keys
    KatakanaHiragana = 0x0106,
    Katakana = 0x00F1,
    Hiragana = 0x00F2,
    Kana = 0x0015,
    Kanji = 0x0019,
    Hangul = 0x00E9,
    Junja = 0x00E8,
    Final = 0x00E7,
    Hanja = 0x00E6,
    Accept = 0x001E,
    Convert = 0x001C,
    NonConvert = 0x001D,
    ImeOn = 0x0109,
    ImeOff = 0x0108,
    ModeChange = 0x0107,
    Process = 0x0105,
    Alphanumeric = 0x00F0,
    Underscore = 0x020B,
    Yen = 0x020C,
    JpComma = 0x0210,

    // Extended keys, mostly seen on Linux keyboards
    Stop = 0xFF78,
    Props = 0xFF76,
    Front = 0xFF77,
    Open = 0xFF74,
    Find = 0xFF70,
    Again = 0xFF79,
    Undo = 0xFF7A,
    Redo = 0xFF7F,
    Copy = 0xFF7C,
    Paste = 0xFF7D,
    Cut = 0xFF7B,
    LineFeed = 0xC001,
    Macro = 0xC002,
    Scale = 0xC003,
    Setup = 0xC004,
    File = 0xC005,
    SendFile = 0xC006,
    DeleteFile = 0xC007,
    MsDos = 0xC008,
    Lock = 0xC009,
    RotateDisplay = 0xC00A,
    CycleWindows = 0xC00B,
    Computer = 0xC00C,
    Phone = 0xC00D,
    Iso = 0xC00E,
    Config = 0xC00F,
    Exit = 0xC010,
    Move = 0xC011,
    Edit = 0xC012,
    ScrollUp = 0xC013,
    ScrollDown = 0xC014,
    New = 0xC015,
    PlayCd = 0xC016,
    PauseCd = 0xC017,
    Dashboard = 0xC018,
    Suspend = 0xC019,
    Close = 0xC01A,
    FastForward = 0xC01C,
    BassBoost = 0xC01D,
    Hp = 0xC01E,
    Camera = 0xC01F,
    Sound = 0xC020,
    Question = 0xC021,
    Email = 0xC022,
    Chat = 0xC023,
    Connect = 0xC024,
    Finance = 0xC025,
    Sport = 0xC026,
    Shop = 0xC027,
    AltErase = 0xC028,
    BrightnessDown = 0xC029,
    BrightnessUp = 0xC02A,
    BrightnessCycle = 0xC02B,
    BrightnessAuto = 0xC02C,
    SwitchVideoMode = 0xC02D,
    KeyboardLightToggle = 0xC02E,
    KeyboardLightDown = 0xC02F,
    KeyboardLightUp = 0xC030,
    Send = 0xC031,
    Reply = 0xC032,
    ForwardMail = 0xC033,
    Save = 0xC034,
    Documents = 0xC035,
    Battery = 0xC036,
    Bluetooth = 0xC037,
    Wlan = 0xC038,
    Uwb = 0xC039,
    X11Unknown = 0xC03A,
    VideoNext = 0xC03B,
    VideoPrevious = 0xC03C,
    DisplayOff = 0xC03D,
    Wwan = 0xC03E,
    Rfkill = 0xC03F,
}

impl VirtualKey {
    /// Converts a raw 16-bit virtual code to a [`VirtualKey`].
    ///
    /// Returns [`VirtualKey::Undefined`] for values outside the identifier
    /// space.
    pub fn from_u16(value: u16) -> Self {
        Self::from_repr(value).unwrap_or(VirtualKey::Undefined)
    }

    /// Returns the raw 16-bit virtual code for this key.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` for the eight left/right shift, control, alt and meta
    /// keys.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            VirtualKey::ShiftLeft
                | VirtualKey::ShiftRight
                | VirtualKey::ControlLeft
                | VirtualKey::ControlRight
                | VirtualKey::AltLeft
                | VirtualKey::AltRight
                | VirtualKey::MetaLeft
                | VirtualKey::MetaRight
        )
    }

    /// Returns `true` for num, caps and scroll lock.
    pub fn is_lock(self) -> bool {
        matches!(
            self,
            VirtualKey::NumLock | VirtualKey::CapsLock | VirtualKey::ScrollLock
        )
    }

    /// The modifier mask bit owned by this key, if it is a modifier or lock
    /// key.
    pub fn modifier_mask(self) -> Option<ModifierMask> {
        let mask = match self {
            VirtualKey::ShiftLeft => ModifierMask::SHIFT_L,
            VirtualKey::ShiftRight => ModifierMask::SHIFT_R,
            VirtualKey::ControlLeft => ModifierMask::CTRL_L,
            VirtualKey::ControlRight => ModifierMask::CTRL_R,
            VirtualKey::AltLeft => ModifierMask::ALT_L,
            VirtualKey::AltRight => ModifierMask::ALT_R,
            VirtualKey::MetaLeft => ModifierMask::META_L,
            VirtualKey::MetaRight => ModifierMask::META_R,
            VirtualKey::NumLock => ModifierMask::NUM_LOCK,
            VirtualKey::CapsLock => ModifierMask::CAPS_LOCK,
            VirtualKey::ScrollLock => ModifierMask::SCROLL_LOCK,
            _ => return None,
        };
        Some(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_from_u16_round_trips_every_variant() {
        for key in VirtualKey::iter() {
            // Arrange / Act
            let raw = key.as_u16();
            let back = VirtualKey::from_u16(raw);

            // Assert
            assert_eq!(back, key, "0x{raw:04X} should round-trip to {key:?}");
        }
    }

    #[test]
    fn test_unassigned_values_map_to_undefined() {
        for raw in [0x0001u16, 0x000Bu16, 0x00A0u16, 0x9999u16, 0xFFFEu16] {
            assert_eq!(
                VirtualKey::from_u16(raw),
                VirtualKey::Undefined,
                "0x{raw:04X} should map to Undefined"
            );
        }
    }

    #[test]
    fn test_left_and_right_modifier_variants_are_distinct() {
        assert_ne!(VirtualKey::ShiftLeft, VirtualKey::ShiftRight);
        assert_eq!(VirtualKey::ShiftLeft.as_u16(), 0xA010);
        assert_eq!(VirtualKey::ShiftRight.as_u16(), 0xB010);
        assert_eq!(VirtualKey::MetaLeft.as_u16(), 0xA09D);
        assert_eq!(VirtualKey::MetaRight.as_u16(), 0xB09D);
    }

    #[test]
    fn test_modifier_classification() {
        for key in [
            VirtualKey::ShiftLeft,
            VirtualKey::ShiftRight,
            VirtualKey::ControlLeft,
            VirtualKey::ControlRight,
            VirtualKey::AltLeft,
            VirtualKey::AltRight,
            VirtualKey::MetaLeft,
            VirtualKey::MetaRight,
        ] {
            assert!(key.is_modifier(), "{key:?} should be a modifier");
            assert!(key.modifier_mask().is_some());
        }
        for key in [VirtualKey::A, VirtualKey::Enter, VirtualKey::Undefined] {
            assert!(!key.is_modifier(), "{key:?} should not be a modifier");
            assert!(key.modifier_mask().is_none());
        }
    }

    #[test]
    fn test_lock_keys_own_their_mask_bits() {
        assert_eq!(
            VirtualKey::CapsLock.modifier_mask(),
            Some(ModifierMask::CAPS_LOCK)
        );
        assert_eq!(
            VirtualKey::NumLock.modifier_mask(),
            Some(ModifierMask::NUM_LOCK)
        );
        assert_eq!(
            VirtualKey::ScrollLock.modifier_mask(),
            Some(ModifierMask::SCROLL_LOCK)
        );
        assert!(VirtualKey::CapsLock.is_lock());
        assert!(!VirtualKey::CapsLock.is_modifier());
    }

    #[test]
    fn test_undefined_is_zero() {
        assert_eq!(VirtualKey::Undefined.as_u16(), 0x0000);
    }
}
