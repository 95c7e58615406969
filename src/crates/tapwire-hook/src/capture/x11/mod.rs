//! X11 capture backend built on the RECORD extension.
//!
//! Two connections are used, as RECORD requires: a **control** display on
//! which the record context is created and later disabled, and a **data**
//! display whose `XRecordEnableContext` call blocks the hook thread and
//! invokes the intercept callback for every device event.  Raw protocol
//! bytes are decoded here into [`RawEvent`]s (the wire-to-event transform),
//! translated through the Xkb name table resolved at session start, and
//! fed synchronously into the event pump.
//!
//! RECORD observes a copy of the event stream; the consume verdict cannot
//! suppress delivery to other clients on this platform and is accepted and
//! dropped.

pub mod ffi;
pub mod unicode;

use std::ptr;
use std::sync::Mutex;

use libc::{c_char, c_int, c_uchar, c_uint};
use x11::keysym::{
    XK_Alt_L, XK_Alt_R, XK_Control_L, XK_Control_R, XK_Shift_L, XK_Shift_R, XK_Super_L,
    XK_Super_R,
};
use x11::xlib::{
    Button1Mask, Button2Mask, Button3Mask, Button4Mask, Button5Mask, ButtonPress, ButtonRelease,
    ControlMask, KeyPress, KeyRelease, Mod1Mask, Mod4Mask, MotionNotify, ShiftMask, XCloseDisplay,
    XDefaultRootWindow, XFlush, XFree, XGetPointerMapping, XInitThreads, XKeysymToKeycode,
    XOpenDisplay, XQueryKeymap, XQueryPointer, XSync,
};

use tracing::{debug, warn};

use tapwire_core::event::{WheelDirection, WheelScroll, MOUSE_BUTTON4, MOUSE_BUTTON5};
use tapwire_core::{HookError, ModifierMask, XkbKeymap};

use crate::capture::{event_time, HookScope, RawEvent};
use crate::modifiers::MODIFIERS;
use crate::pump::EventPump;

/// Wheel pseudo-buttons in the core protocol.
const WHEEL_UP: u16 = 4;
const WHEEL_DOWN: u16 = 5;
const WHEEL_LEFT: u16 = 6;
const WHEEL_RIGHT: u16 = 7;

/// Scroll notches per wheel pseudo-click.
const WHEEL_STEP: u16 = 1;

struct StopHandle {
    control: *mut x11::xlib::Display,
    context: ffi::XRecordContext,
}

// The control display is only touched under the mutex.
unsafe impl Send for StopHandle {}

static STOP: Mutex<Option<StopHandle>> = Mutex::new(None);

/// Per-session state handed to the record callback.
struct Session {
    pump: EventPump,
    keymap: XkbKeymap,
    scope: HookScope,
    /// Control-connection display used for lookups inside the callback.
    helper: *mut x11::xlib::Display,
}

/// Installs the RECORD hook and blocks until [`stop`].
pub fn run(scope: HookScope, pump: EventPump) -> Result<(), HookError> {
    // SAFETY: plain Xlib setup calls; every resource acquired here is
    // released on every exit path below.
    unsafe {
        XInitThreads();

        let control = XOpenDisplay(ptr::null());
        if control.is_null() {
            return Err(HookError::XOpenDisplay);
        }
        let data = XOpenDisplay(ptr::null());
        if data.is_null() {
            XCloseDisplay(control);
            return Err(HookError::XOpenDisplay);
        }

        let teardown = |context: Option<ffi::XRecordContext>| {
            if let Some(context) = context {
                ffi::XRecordFreeContext(control, context);
            }
            XCloseDisplay(data);
            XCloseDisplay(control);
        };

        let mut major: c_int = 0;
        let mut minor: c_int = 0;
        if ffi::XRecordQueryVersion(control, &mut major, &mut minor) == 0 {
            teardown(None);
            return Err(HookError::XRecordNotFound);
        }
        debug!(major, minor, "X RECORD extension available");

        let range = ffi::XRecordAllocRange();
        if range.is_null() {
            teardown(None);
            return Err(HookError::XRecordAllocRange);
        }
        (*range).device_events.first = KeyPress as c_uchar;
        (*range).device_events.last = MotionNotify as c_uchar;

        let mut clients: ffi::XRecordClientSpec = ffi::XRECORD_ALL_CLIENTS;
        let mut ranges = [range];
        let context = ffi::XRecordCreateContext(
            control,
            0,
            &mut clients,
            1,
            ranges.as_mut_ptr(),
            1,
        );
        if context == 0 {
            XFree(range as *mut _);
            teardown(None);
            return Err(HookError::XRecordCreateContext);
        }

        // The data connection must observe the context before enabling it.
        XSync(control, 0);

        let mut supported = 0;
        ffi::XkbSetDetectableAutoRepeat(control, 1, &mut supported);
        if supported == 0 {
            debug!("detectable autorepeat is not supported by this server");
        }

        let keymap = resolve_session_keymap(control);
        initialize_modifiers(control);

        *STOP.lock().expect("stop handle lock poisoned") = Some(StopHandle { control, context });

        let mut session = Session {
            pump,
            keymap,
            scope,
            helper: control,
        };
        session.pump.hook_enabled(event_time(0));

        // Blocks for the lifetime of the session; the callback fires on
        // this thread.
        let enabled = ffi::XRecordEnableContext(
            data,
            context,
            Some(record_callback),
            &mut session as *mut Session as *mut c_char,
        );

        session.pump.hook_disabled(event_time(0));
        *STOP.lock().expect("stop handle lock poisoned") = None;

        XFree(range as *mut _);
        teardown(Some(context));

        if enabled == 0 {
            return Err(HookError::XRecordEnableContext);
        }
    }

    Ok(())
}

/// Disables the record context, unblocking the hook thread.
pub fn stop() -> Result<(), HookError> {
    let guard = STOP.lock().expect("stop handle lock poisoned");
    match guard.as_ref() {
        Some(handle) => {
            // SAFETY: the control display stays open until the hook thread
            // clears the handle, which happens only after enable returns.
            unsafe {
                ffi::XRecordDisableContext(handle.control, handle.context);
                XFlush(handle.control);
            }
            Ok(())
        }
        None => Err(HookError::Failure),
    }
}

unsafe extern "C" fn record_callback(closure: *mut c_char, data: *mut ffi::XRecordInterceptData) {
    if data.is_null() {
        return;
    }
    let intercept = &*data;
    if intercept.category != ffi::XRECORD_FROM_SERVER || intercept.data.is_null() {
        ffi::XRecordFreeData(data);
        return;
    }

    let session = &mut *(closure as *mut Session);
    let time = event_time(intercept.server_time);

    // Wire-format device event: type/detail, then the keyButtonPointer
    // payload at fixed offsets.
    let bytes = std::slice::from_raw_parts(intercept.data, (intercept.data_len as usize) * 4);
    if bytes.len() >= 32 {
        let kind = (bytes[0] & 0x7F) as c_int;
        let detail = bytes[1];
        let root_x = i16::from_ne_bytes([bytes[20], bytes[21]]);
        let root_y = i16::from_ne_bytes([bytes[22], bytes[23]]);
        let state = u16::from_ne_bytes([bytes[28], bytes[29]]);

        dispatch_wire_event(session, kind, detail, root_x, root_y, state, time);
    }

    ffi::XRecordFreeData(data);
}

fn dispatch_wire_event(
    session: &mut Session,
    kind: c_int,
    detail: u8,
    x: i16,
    y: i16,
    state: u16,
    time: u64,
) {
    match kind {
        k if k == KeyPress && session.scope.keyboard() => {
            let key = session.keymap.keycode_to_key(detail);
            let chars = unicode::resolve_press(session.helper, detail, state, time);
            session.pump.feed(RawEvent::KeyDown {
                key,
                rawcode: detail as u16,
                chars,
                time,
            });
        }
        k if k == KeyRelease && session.scope.keyboard() => {
            let key = session.keymap.keycode_to_key(detail);
            session.pump.feed(RawEvent::KeyUp {
                key,
                rawcode: detail as u16,
                time,
            });
        }
        k if k == ButtonPress && session.scope.mouse() => {
            match classify_button(session.helper, detail) {
                ButtonKind::Button(button) => {
                    session.pump.feed(RawEvent::ButtonDown { button, x, y, time });
                }
                ButtonKind::Wheel(rotation, direction) => {
                    session.pump.feed(RawEvent::Wheel {
                        x,
                        y,
                        rotation,
                        delta: WHEEL_STEP,
                        scroll: WheelScroll::Unit,
                        direction,
                        time,
                    });
                }
            }
        }
        k if k == ButtonRelease && session.scope.mouse() => {
            if let ButtonKind::Button(button) = classify_button(session.helper, detail) {
                session.pump.feed(RawEvent::ButtonUp { button, x, y, time });
            }
            // Wheel pseudo-buttons already reported on press.
        }
        k if k == MotionNotify && session.scope.mouse() => {
            session.pump.feed(RawEvent::Motion { x, y, time });
        }
        _ => {}
    }
}

enum ButtonKind {
    Button(u16),
    Wheel(i16, WheelDirection),
}

/// Applies the server's pointer mapping, the X11 2↔3 button swap, and the
/// wheel pseudo-button classification.
fn classify_button(dpy: *mut x11::xlib::Display, detail: u8) -> ButtonKind {
    let mut map = [0u8; 32];
    // SAFETY: dpy is the live control display.
    let map_size = unsafe { XGetPointerMapping(dpy, map.as_mut_ptr(), map.len() as c_int) };

    let mut button = detail as u16;
    if detail >= 1 && (detail as c_int) <= map_size {
        button = map[detail as usize - 1] as u16;
    }

    match button {
        WHEEL_UP => ButtonKind::Wheel(WHEEL_STEP as i16, WheelDirection::Vertical),
        WHEEL_DOWN => ButtonKind::Wheel(-(WHEEL_STEP as i16), WheelDirection::Vertical),
        WHEEL_LEFT => ButtonKind::Wheel(-(WHEEL_STEP as i16), WheelDirection::Horizontal),
        WHEEL_RIGHT => ButtonKind::Wheel(WHEEL_STEP as i16, WheelDirection::Horizontal),
        // Middle and right are numbered opposite to the other platforms.
        2 => ButtonKind::Button(3),
        3 => ButtonKind::Button(2),
        8 => ButtonKind::Button(MOUSE_BUTTON4),
        9 => ButtonKind::Button(MOUSE_BUTTON5),
        other => ButtonKind::Button(other),
    }
}

/// Binds the Xkb name table against the server.
///
/// Also used by the synthesis engine for its own connection.
pub(crate) fn resolve_session_keymap(dpy: *mut x11::xlib::Display) -> XkbKeymap {
    // SAFETY: dpy is live; the keyboard description is freed before return.
    unsafe {
        let desc = ffi::XkbGetMap(dpy, ffi::XKB_ALL_COMPONENTS_MASK, ffi::XKB_USE_CORE_KBD);
        if desc.is_null() {
            warn!("XkbGetMap failed; key translation will be empty");
            return XkbKeymap::unbound();
        }

        if ffi::XkbGetNames(dpy, ffi::XKB_ALL_NAMES_MASK, desc) != 0
            || (*desc).names.is_null()
            || (*(*desc).names).keys.is_null()
        {
            warn!("XkbGetNames failed; key translation will be empty");
            ffi::XkbFreeKeyboard(desc, ffi::XKB_ALL_COMPONENTS_MASK, 1);
            return XkbKeymap::unbound();
        }

        let names = (*desc).names;
        let min = (*desc).min_key_code;
        let max = (*desc).max_key_code;

        let pairs = (min..max).map(|keycode| {
            let raw = (*(*names).keys.add(keycode as usize)).name;
            let name = [raw[0] as u8, raw[1] as u8, raw[2] as u8, raw[3] as u8];
            (keycode, name)
        });
        let keymap = XkbKeymap::resolve(pairs);

        ffi::XkbFreeKeyboard(desc, ffi::XKB_ALL_COMPONENTS_MASK, 1);
        keymap
    }
}

/// Seeds the modifier state from the live keyboard, pointer and lock LEDs.
fn initialize_modifiers(dpy: *mut x11::xlib::Display) {
    MODIFIERS.reset();

    // SAFETY: dpy is live; all out-params are stack locals.
    unsafe {
        let mut keymap = [0i8; 32];
        XQueryKeymap(dpy, keymap.as_mut_ptr());

        let key_held = |keysym: c_uint| -> bool {
            let keycode = XKeysymToKeycode(dpy, keysym as u64);
            keycode != 0 && (keymap[(keycode / 8) as usize] as u8 & (1u8 << (keycode % 8))) != 0
        };

        let root = XDefaultRootWindow(dpy);
        let mut root_return = 0;
        let mut child_return = 0;
        let mut root_x: c_int = 0;
        let mut root_y: c_int = 0;
        let mut win_x: c_int = 0;
        let mut win_y: c_int = 0;
        let mut mask: c_uint = 0;
        let pointer_known = XQueryPointer(
            dpy,
            root,
            &mut root_return,
            &mut child_return,
            &mut root_x,
            &mut root_y,
            &mut win_x,
            &mut win_y,
            &mut mask,
        ) != 0;

        // The pointer mask narrows which sides to probe; without it every
        // modifier key is probed directly.
        let probe = |check_mask: c_uint, left: c_uint, right: c_uint, lm: ModifierMask, rm: ModifierMask| {
            if !pointer_known || (mask & check_mask) != 0 {
                if key_held(left) {
                    MODIFIERS.set(lm);
                }
                if key_held(right) {
                    MODIFIERS.set(rm);
                }
            }
        };
        probe(ShiftMask, XK_Shift_L, XK_Shift_R, ModifierMask::SHIFT_L, ModifierMask::SHIFT_R);
        probe(ControlMask, XK_Control_L, XK_Control_R, ModifierMask::CTRL_L, ModifierMask::CTRL_R);
        probe(Mod1Mask, XK_Alt_L, XK_Alt_R, ModifierMask::ALT_L, ModifierMask::ALT_R);
        probe(Mod4Mask, XK_Super_L, XK_Super_R, ModifierMask::META_L, ModifierMask::META_R);

        if pointer_known {
            for (bit, button_mask) in [
                (Button1Mask, ModifierMask::BUTTON1),
                (Button2Mask, ModifierMask::BUTTON2),
                (Button3Mask, ModifierMask::BUTTON3),
                (Button4Mask, ModifierMask::BUTTON4),
                (Button5Mask, ModifierMask::BUTTON5),
            ] {
                if mask & bit != 0 {
                    MODIFIERS.set(button_mask);
                }
            }
        }

        let mut leds: c_uint = 0;
        if ffi::XkbGetIndicatorState(dpy, ffi::XKB_USE_CORE_KBD, &mut leds) == 0 {
            if leds & 0x01 != 0 {
                MODIFIERS.set(ModifierMask::CAPS_LOCK);
            }
            if leds & 0x02 != 0 {
                MODIFIERS.set(ModifierMask::NUM_LOCK);
            }
            if leds & 0x04 != 0 {
                MODIFIERS.set(ModifierMask::SCROLL_LOCK);
            }
        } else {
            warn!("XkbGetIndicatorState failed; lock state unknown");
        }
    }
}
