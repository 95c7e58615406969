//! Typed-character resolution through the X input method.
//!
//! A key press is resolved with `Xutf8LookupString` against a throwaway
//! input context so the lookup runs with the current layout and modifier
//! state without perturbing any application's input method.  When no input
//! method is available the core-protocol `XLookupString` is the fallback.
//! The UTF-8 result is converted to UTF-16 code units, splitting
//! supplementary-plane characters into surrogate pairs.

use std::mem::MaybeUninit;
use std::ptr;

use libc::{c_char, c_int};
use x11::xlib::{
    Display, KeyPress, KeySym, XCloseIM, XCreateIC, XDefaultRootWindow, XDestroyIC,
    XIMPreeditNothing, XIMStatusNothing, XKeyEvent, XLookupString, XOpenIM, XSetLocaleModifiers,
    XIC, XIM,
};

use super::ffi::Xutf8LookupString;
use tapwire_core::text::utf8_to_utf16;
use tracing::debug;

/// Resolves the UTF-16 units a key press types.
///
/// `state` is the core-protocol modifier/button state delivered with the
/// event.  Returns an empty vector when the key produces no text.
pub fn resolve_press(dpy: *mut Display, keycode: u8, state: u16, time: u64) -> Vec<u16> {
    let mut event = key_event(dpy, keycode, state, time);

    let mut buffer = [0u8; 8];
    let mut keysym: KeySym = 0;
    let mut status: c_int = 0;

    // SAFETY: dpy is a live display owned by the capture session; the
    // input method and context are created and destroyed inside this call.
    let count = unsafe {
        let (im, ic) = open_input_context(dpy);
        let written = if !ic.is_null() {
            Xutf8LookupString(
                ic,
                &mut event,
                buffer.as_mut_ptr() as *mut c_char,
                buffer.len() as c_int,
                &mut keysym,
                &mut status,
            )
        } else {
            XLookupString(
                &mut event,
                buffer.as_mut_ptr() as *mut c_char,
                buffer.len() as c_int,
                &mut keysym,
                ptr::null_mut(),
            )
        };
        if !ic.is_null() {
            XDestroyIC(ic);
        }
        if !im.is_null() {
            XCloseIM(im);
        }
        written.max(0) as usize
    };

    utf8_to_utf16(&buffer[..count.min(buffer.len())])
}

/// Opens a transient IM and IC rooted at the default root window.
///
/// # Safety
///
/// `dpy` must be a live display.
unsafe fn open_input_context(dpy: *mut Display) -> (XIM, XIC) {
    XSetLocaleModifiers(b"\0".as_ptr() as *const c_char);
    let mut im = XOpenIM(dpy, ptr::null_mut(), ptr::null_mut(), ptr::null_mut());
    if im.is_null() {
        // Fall back to the built-in input method.
        XSetLocaleModifiers(b"@im=none\0".as_ptr() as *const c_char);
        im = XOpenIM(dpy, ptr::null_mut(), ptr::null_mut(), ptr::null_mut());
    }
    if im.is_null() {
        debug!("XOpenIM failed; falling back to XLookupString");
        return (ptr::null_mut(), ptr::null_mut());
    }

    let root = XDefaultRootWindow(dpy);
    let ic = XCreateIC(
        im,
        b"inputStyle\0".as_ptr() as *const c_char,
        XIMPreeditNothing | XIMStatusNothing,
        b"clientWindow\0".as_ptr() as *const c_char,
        root,
        b"focusWindow\0".as_ptr() as *const c_char,
        root,
        ptr::null_mut::<c_char>(),
    );
    if ic.is_null() {
        debug!("XCreateIC failed; falling back to XLookupString");
    }
    (im, ic)
}

fn key_event(dpy: *mut Display, keycode: u8, state: u16, time: u64) -> XKeyEvent {
    // SAFETY: XKeyEvent is plain old data; every field is overwritten.
    let mut event: XKeyEvent = unsafe { MaybeUninit::zeroed().assume_init() };
    event.type_ = KeyPress;
    event.serial = 0;
    event.send_event = 0;
    event.display = dpy;
    event.window = 0;
    event.root = 0;
    event.subwindow = 0;
    event.time = time;
    event.x = 0;
    event.y = 0;
    event.x_root = 0;
    event.y_root = 0;
    event.state = state as u32;
    event.keycode = keycode as u32;
    event.same_screen = 1;
    event
}
