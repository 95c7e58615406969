//! X11 event synthesis through the XTest extension.
//!
//! Key and button injections go through `XTestFakeKeyEvent` /
//! `XTestFakeButtonEvent`; wheel events become press/release pairs on the
//! wheel pseudo-buttons.  Text injection steals an unused keycode, remaps
//! it to each character's keysym in turn (all four shift levels), types it
//! with the configured inter-character delay, and restores the keycode to
//! `NoSymbol` afterwards.
//!
//! The module owns its own display connection and Xkb binding, opened
//! lazily and serialized behind a mutex, so synthesis works with or
//! without an active capture session.

use std::ptr;
use std::sync::Mutex;
use std::thread;

use libc::{c_char, c_int, c_uint};
use x11::xlib::{
    Display, KeySym, NoSymbol, XChangeKeyboardMapping, XCloseDisplay, XDefaultRootWindow,
    XDisplayKeycodes, XFree, XGetKeyboardMapping, XGetPointerMapping, XInitThreads, XOpenDisplay,
    XQueryPointer, XStringToKeysym, XSync,
};

use tracing::warn;

use tapwire_core::event::{
    EventKind, MouseData, VirtualEvent, WheelDirection, MOUSE_BUTTON1, MOUSE_BUTTON5,
};
use tapwire_core::text::{unicode_keysym_name, utf16_to_scalars};
use tapwire_core::{HookError, VirtualKey, XkbKeymap};

use crate::capture::x11::ffi;

struct SynthDisplay {
    dpy: *mut Display,
    keymap: XkbKeymap,
}

// Guarded by the module mutex.
unsafe impl Send for SynthDisplay {}

static DISPLAY: Mutex<Option<SynthDisplay>> = Mutex::new(None);

/// Runs `body` with the lazily-opened synthesis display.
fn with_display<T>(
    body: impl FnOnce(*mut Display, &XkbKeymap) -> Result<T, HookError>,
) -> Result<T, HookError> {
    let mut guard = DISPLAY.lock().expect("synthesis display lock poisoned");
    if guard.is_none() {
        // SAFETY: display setup; the connection lives for the process.
        let dpy = unsafe {
            XInitThreads();
            XOpenDisplay(ptr::null())
        };
        if dpy.is_null() {
            return Err(HookError::XOpenDisplay);
        }
        let keymap = crate::capture::x11::resolve_session_keymap(dpy);
        *guard = Some(SynthDisplay { dpy, keymap });
    }

    let synth = guard.as_ref().expect("display just initialized");
    let result = body(synth.dpy, &synth.keymap);

    // SAFETY: flush queued fake events before releasing the lock.
    unsafe {
        XSync(synth.dpy, 0);
    }
    result
}

/// Closes the synthesis connection; mainly for tests and teardown.
#[allow(dead_code)]
pub fn close_display() {
    let mut guard = DISPLAY.lock().expect("synthesis display lock poisoned");
    if let Some(synth) = guard.take() {
        // SAFETY: nothing else can hold the display while the lock is held.
        unsafe {
            XCloseDisplay(synth.dpy);
        }
    }
}

/// Injects one event; see the module docs for the per-kind mapping.
pub fn post_event(event: &VirtualEvent) -> Result<(), HookError> {
    match &event.kind {
        EventKind::KeyPressed(data) => post_key(data.key, true),
        EventKind::KeyReleased(data) => post_key(data.key, false),

        EventKind::MousePressed(data) => post_button(data, true, true),
        EventKind::MouseReleased(data) => post_button(data, false, true),
        EventKind::MousePressedIgnoreCoords(data) => post_button(data, true, false),
        EventKind::MouseReleasedIgnoreCoords(data) => post_button(data, false, false),

        EventKind::MouseMoved(data) | EventKind::MouseDragged(data) => {
            with_display(|dpy, _| {
                // SAFETY: dpy is live under the module lock.
                unsafe {
                    XTestMotion(dpy, data.x as c_int, data.y as c_int)?;
                }
                Ok(())
            })
        }
        EventKind::MouseMovedRelativeToCursor(data) => with_display(|dpy, _| {
            // SAFETY: dpy is live under the module lock.
            unsafe {
                let (cursor_x, cursor_y) = query_pointer(dpy)?;
                XTestMotion(
                    dpy,
                    cursor_x + data.x as c_int,
                    cursor_y + data.y as c_int,
                )?;
            }
            Ok(())
        }),

        EventKind::MouseWheel(wheel) => with_display(|dpy, _| {
            let pseudo_button = match (wheel.direction, wheel.rotation > 0) {
                (WheelDirection::Vertical, true) => 4u8,
                (WheelDirection::Vertical, false) => 5,
                (WheelDirection::Horizontal, true) => 7,
                (WheelDirection::Horizontal, false) => 6,
            };
            // SAFETY: dpy is live under the module lock.
            unsafe {
                let button = pointer_mapped_button(dpy, pseudo_button);
                for _ in 0..wheel.rotation.unsigned_abs().max(1) {
                    if ffi::XTestFakeButtonEvent(dpy, button as c_uint, 1, 0) == 0
                        || ffi::XTestFakeButtonEvent(dpy, button as c_uint, 0, 0) == 0
                    {
                        return Err(HookError::Failure);
                    }
                }
            }
            Ok(())
        }),

        // Typed, clicked and lifecycle events have no native injection.
        _ => {
            warn!(kind = ?event.kind, "ignoring unsynthesizable event");
            Err(HookError::Failure)
        }
    }
}

fn post_key(key: VirtualKey, press: bool) -> Result<(), HookError> {
    with_display(|dpy, keymap| {
        let keycode = keymap.key_to_keycode(key).ok_or_else(|| {
            warn!(?key, "no Xkb keycode for key");
            HookError::Failure
        })?;
        // SAFETY: dpy is live under the module lock.
        unsafe {
            if ffi::XTestFakeKeyEvent(dpy, keycode as c_uint, press as c_int, 0) == 0 {
                return Err(HookError::Failure);
            }
        }
        Ok(())
    })
}

fn post_button(data: &MouseData, press: bool, move_first: bool) -> Result<(), HookError> {
    if !(MOUSE_BUTTON1..=MOUSE_BUTTON5).contains(&data.button) {
        warn!(button = data.button, "invalid button for mouse injection");
        return Err(HookError::Failure);
    }

    with_display(|dpy, _| {
        // SAFETY: dpy is live under the module lock.
        unsafe {
            if move_first {
                XTestMotion(dpy, data.x as c_int, data.y as c_int)?;
            }
            if ffi::XTestFakeButtonEvent(dpy, data.button as c_uint, press as c_int, 0) == 0 {
                return Err(HookError::Failure);
            }
        }
        Ok(())
    })
}

/// Fakes a pointer move on the current screen.
///
/// # Safety
///
/// `dpy` must be live.
#[allow(non_snake_case)]
unsafe fn XTestMotion(dpy: *mut Display, x: c_int, y: c_int) -> Result<(), HookError> {
    if ffi::XTestFakeMotionEvent(dpy, -1, x, y, 0) == 0 {
        return Err(HookError::Failure);
    }
    Ok(())
}

/// Current pointer position on the default root window.
///
/// # Safety
///
/// `dpy` must be live.
unsafe fn query_pointer(dpy: *mut Display) -> Result<(c_int, c_int), HookError> {
    let root = XDefaultRootWindow(dpy);
    let mut root_return = 0;
    let mut child_return = 0;
    let mut root_x: c_int = 0;
    let mut root_y: c_int = 0;
    let mut win_x: c_int = 0;
    let mut win_y: c_int = 0;
    let mut mask: c_uint = 0;
    if XQueryPointer(
        dpy,
        root,
        &mut root_return,
        &mut child_return,
        &mut root_x,
        &mut root_y,
        &mut win_x,
        &mut win_y,
        &mut mask,
    ) == 0
    {
        return Err(HookError::Failure);
    }
    Ok((root_x, root_y))
}

/// Applies the server's pointer mapping to a physical button number.
///
/// # Safety
///
/// `dpy` must be live.
unsafe fn pointer_mapped_button(dpy: *mut Display, button: u8) -> u8 {
    let mut map = [0u8; 32];
    let map_size = XGetPointerMapping(dpy, map.as_mut_ptr(), map.len() as c_int);
    if button >= 1 && (button as c_int) <= map_size {
        map[button as usize - 1]
    } else {
        button
    }
}

/// Types `text` by remapping a spare keycode per character.
pub fn post_text(text: &str) -> Result<(), HookError> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let scalars = utf16_to_scalars(&units);
    let delay = super::post_text_delay();

    with_display(|dpy, _| {
        // SAFETY: dpy is live under the module lock for the whole batch.
        unsafe {
            let spare = find_unused_keycode(dpy).ok_or_else(|| {
                warn!("no unused keycode available for text injection");
                HookError::Failure
            })?;

            let mut status = Ok(());
            for scalar in scalars {
                let name = unicode_keysym_name(scalar);
                let name_c = std::ffi::CString::new(name).map_err(|_| HookError::Failure)?;
                let keysym = XStringToKeysym(name_c.as_ptr() as *const c_char);
                if keysym == NoSymbol as KeySym {
                    warn!(scalar, "no keysym for character");
                    status = Err(HookError::Failure);
                    break;
                }

                // The same keysym on all four shift levels makes the fake
                // press independent of the live modifier state.
                let mut levels: [KeySym; 4] = [keysym; 4];
                if XChangeKeyboardMapping(dpy, spare as c_int, 4, levels.as_mut_ptr(), 1) != 0 {
                    status = Err(HookError::Failure);
                    break;
                }
                XSync(dpy, 0);
                thread::sleep(delay);

                if ffi::XTestFakeKeyEvent(dpy, spare as c_uint, 1, 0) == 0 {
                    status = Err(HookError::Failure);
                    break;
                }
                XSync(dpy, 0);
                if ffi::XTestFakeKeyEvent(dpy, spare as c_uint, 0, 0) == 0 {
                    status = Err(HookError::Failure);
                    break;
                }
                XSync(dpy, 0);
                thread::sleep(delay);
            }

            // Always hand the keycode back, even on failure.
            let mut none: KeySym = NoSymbol as KeySym;
            XChangeKeyboardMapping(dpy, spare as c_int, 1, &mut none, 1);
            XSync(dpy, 0);

            status
        }
    })
}

/// Scans from the top of the keycode range for a position with no keysyms
/// bound.
///
/// # Safety
///
/// `dpy` must be live.
unsafe fn find_unused_keycode(dpy: *mut Display) -> Option<u8> {
    let mut min_keycode: c_int = 0;
    let mut max_keycode: c_int = 0;
    XDisplayKeycodes(dpy, &mut min_keycode, &mut max_keycode);

    for keycode in (min_keycode..=max_keycode).rev() {
        let mut keysyms_per_keycode: c_int = 0;
        let keysyms = XGetKeyboardMapping(dpy, keycode as u8, 1, &mut keysyms_per_keycode);
        if keysyms.is_null() {
            continue;
        }
        let bound = (0..keysyms_per_keycode as usize)
            .any(|level| *keysyms.add(level) != NoSymbol as KeySym);
        XFree(keysyms as *mut _);
        if !bound {
            return Some(keycode as u8);
        }
    }
    None
}

/// Screen dimensions for the minimal monitor report.
pub fn display_size() -> Option<(u16, u16)> {
    with_display(|dpy, _| {
        // SAFETY: dpy is live under the module lock.
        unsafe {
            let screen = x11::xlib::XDefaultScreen(dpy);
            let width = x11::xlib::XDisplayWidth(dpy, screen);
            let height = x11::xlib::XDisplayHeight(dpy, screen);
            Ok((width as u16, height as u16))
        }
    })
    .ok()
}

/// Keyboard auto-repeat as (delay ms, interval ms).
pub fn auto_repeat() -> Option<(u32, u32)> {
    with_display(|dpy, _| {
        let mut timeout: c_uint = 0;
        let mut interval: c_uint = 0;
        // SAFETY: dpy is live under the module lock.
        let ok = unsafe {
            ffi::XkbGetAutoRepeatRate(dpy, ffi::XKB_USE_CORE_KBD, &mut timeout, &mut interval)
        };
        if ok == 0 {
            return Err(HookError::Failure);
        }
        Ok((timeout, interval))
    })
    .ok()
}

/// Pointer acceleration as (numerator, denominator, threshold).
pub fn pointer_control() -> Option<(i32, i32, i32)> {
    with_display(|dpy, _| {
        let mut numerator: c_int = 0;
        let mut denominator: c_int = 0;
        let mut threshold: c_int = 0;
        // SAFETY: dpy is live under the module lock.
        unsafe {
            x11::xlib::XGetPointerControl(dpy, &mut numerator, &mut denominator, &mut threshold);
        }
        Ok((numerator, denominator, threshold))
    })
    .ok()
}
