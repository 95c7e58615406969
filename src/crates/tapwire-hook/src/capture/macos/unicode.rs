//! Typed-character resolution through the Unicode keyboard layout.
//!
//! The current TIS keyboard layout's `uchr` data is fed to `UCKeyTranslate`
//! with a dead-key state that persists across calls, so composing keys
//! (option-e, e) resolve the way real typing does.  Command, Control and
//! Option are stripped from the translation flags so shortcuts still
//! resolve to their base character; CapsLock is handled by uppercasing the
//! result, which `UCKeyTranslate` does not do on its own.  The dead-key
//! state is discarded when the keyboard layout changes.
//!
//! Everything here runs on the main queue via
//! [`run_sync`](super::main_thread::run_sync).

use std::ffi::c_void;
use std::sync::Mutex;

use core_foundation::base::{CFRelease, CFTypeRef};
use core_graphics::event::{CGEvent, CGEventFlags, EventField};

use tracing::warn;

use super::main_thread::run_sync;

#[allow(non_upper_case_globals)]
#[link(name = "Carbon", kind = "framework")]
extern "C" {
    static kTISPropertyUnicodeKeyLayoutData: CFTypeRef;

    fn TISCopyCurrentKeyboardLayoutInputSource() -> CFTypeRef;
    fn TISGetInputSourceProperty(source: CFTypeRef, key: CFTypeRef) -> CFTypeRef;
    fn LMGetKbdType() -> u8;

    fn UCKeyTranslate(
        layout: *const c_void,
        keycode: u16,
        action: u16,
        modifier_key_state: u32,
        keyboard_type: u32,
        options: u32,
        dead_key_state: *mut u32,
        max_length: usize,
        actual_length: *mut usize,
        unicode_string: *mut u16,
    ) -> i32;

    fn CFDataGetBytePtr(data: CFTypeRef) -> *const u8;
    fn CFDataGetLength(data: CFTypeRef) -> isize;
    fn CFEqual(a: CFTypeRef, b: CFTypeRef) -> u8;
}

const KEY_ACTION_DOWN: u16 = 0;

/// Dead-key composition state carried between key presses.
static DEAD_KEY_STATE: Mutex<u32> = Mutex::new(0);
/// Previous layout source, for detecting layout switches.
static PREV_LAYOUT: Mutex<usize> = Mutex::new(0);

/// Resolves the UTF-16 units a key press types.
pub fn resolve_press(event: &CGEvent) -> Vec<u16> {
    let mut units: Vec<u16> = Vec::new();
    run_sync(|| units = translate_on_main(event));
    units
}

fn translate_on_main(event: &CGEvent) -> Vec<u16> {
    // SAFETY: main-queue only (run_sync guarantees it); every CF object
    // copied here is released or stored for the next call.
    unsafe {
        let layout_source = TISCopyCurrentKeyboardLayoutInputSource();
        if layout_source.is_null() {
            warn!("no current keyboard layout input source");
            return Vec::new();
        }

        let data = TISGetInputSourceProperty(layout_source, kTISPropertyUnicodeKeyLayoutData);
        let result = if !data.is_null() && CFDataGetLength(data) > 0 {
            translate(CFDataGetBytePtr(data) as *const c_void, event)
        } else {
            warn!("keyboard layout has no Unicode layout data");
            Vec::new()
        };

        // A layout switch invalidates any pending dead-key composition.
        let mut prev = PREV_LAYOUT.lock().expect("layout lock poisoned");
        if *prev != 0 {
            if CFEqual(layout_source, *prev as CFTypeRef) == 0 {
                *DEAD_KEY_STATE.lock().expect("dead key lock poisoned") = 0;
            }
            CFRelease(*prev as CFTypeRef);
        }
        *prev = layout_source as usize;

        result
    }
}

unsafe fn translate(layout: *const c_void, event: &CGEvent) -> Vec<u16> {
    let keycode = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
    let mut flags = event.get_flags();

    // Strip the command modifiers so Cmd-A still resolves to 'a'.
    flags.remove(CGEventFlags::CGEventFlagCommand);
    flags.remove(CGEventFlags::CGEventFlagControl);
    flags.remove(CGEventFlags::CGEventFlagAlternate);

    // UCKeyTranslate does not honor the CapsLock bit; apply it by hand.
    let caps_lock = flags.contains(CGEventFlags::CGEventFlagAlphaShift);
    flags.remove(CGEventFlags::CGEventFlagAlphaShift);

    let mut dead_state = DEAD_KEY_STATE.lock().expect("dead key lock poisoned");
    let mut buffer = [0u16; 8];
    let mut length: usize = 0;
    let status = UCKeyTranslate(
        layout,
        keycode,
        KEY_ACTION_DOWN,
        ((flags.bits() >> 16) & 0xFF) as u32,
        LMGetKbdType() as u32,
        0,
        &mut *dead_state,
        buffer.len(),
        &mut length,
        buffer.as_mut_ptr(),
    );
    if status != 0 || length == 0 {
        return Vec::new();
    }

    let units = &buffer[..length.min(buffer.len())];
    if caps_lock {
        uppercase_units(units)
    } else {
        units.to_vec()
    }
}

/// Uppercases a small UTF-16 buffer through `char` case mapping.
fn uppercase_units(units: &[u16]) -> Vec<u16> {
    let text: String = char::decode_utf16(units.iter().copied())
        .map(|decoded| decoded.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    text.to_uppercase().encode_utf16().collect()
}
