//! macOS capture backend: a session-level `CGEventTap`.
//!
//! `run` creates the tap, attaches its run-loop source to the calling
//! thread's `CFRunLoop`, and runs the loop until [`stop`] stops it from
//! another thread.  The tap callback decodes each `CGEvent`, translates
//! the key code, resolves typed characters on the main queue, and feeds
//! the pump; a consumed verdict returns `None` from the callback so the
//! event dies in the tap.
//!
//! Requires the Accessibility permission; `run` fails with
//! [`HookError::AxApiDisabled`] when the process is not trusted.  When the
//! OS disables the tap for being slow (`TapDisabledByTimeout`) it is
//! re-enabled on the spot.

pub mod main_thread;
pub mod unicode;

use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

use core_foundation::base::{Boolean, TCFType};
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop};
use core_foundation_sys::runloop::CFRunLoopStop;
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions,
    CGEventTapPlacement, CGEventType, EventField,
};

use tracing::{debug, warn};

use tapwire_core::event::{WheelDirection, WheelScroll};
use tapwire_core::{HookError, KeyMapper, ModifierMask, VirtualKey};

use crate::capture::{epoch_millis, HookScope, RawEvent};
use crate::modifiers::MODIFIERS;
use crate::pump::EventPump;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> Boolean;
    fn CGEventTapEnable(tap: *mut c_void, enable: bool);

    fn CGEventSourceKeyState(state: i32, keycode: u16) -> bool;
    fn CGEventSourceButtonState(state: i32, button: u32) -> bool;
    fn CGEventSourceFlagsState(state: i32) -> u64;
}

/// `kCGEventSourceStateCombinedSessionState`.
const COMBINED_SESSION_STATE: i32 = 0;

/// Hook thread's run loop, for cross-thread stop.
static RUN_LOOP: AtomicUsize = AtomicUsize::new(0);
/// Tap mach port, for re-enabling after an OS timeout.
static TAP_PORT: AtomicUsize = AtomicUsize::new(0);

struct Session {
    pump: EventPump,
}

/// Creates the event tap and runs the loop until [`stop`].
pub fn run(scope: HookScope, pump: EventPump) -> Result<(), HookError> {
    // SAFETY: a plain query with no arguments.
    if unsafe { AXIsProcessTrusted() } == 0 {
        warn!("accessibility permission has not been granted");
        return Err(HookError::AxApiDisabled);
    }

    let mut interest = Vec::new();
    if scope.keyboard() {
        interest.extend([
            CGEventType::KeyDown,
            CGEventType::KeyUp,
            CGEventType::FlagsChanged,
        ]);
    }
    if scope.mouse() {
        interest.extend([
            CGEventType::LeftMouseDown,
            CGEventType::LeftMouseUp,
            CGEventType::RightMouseDown,
            CGEventType::RightMouseUp,
            CGEventType::OtherMouseDown,
            CGEventType::OtherMouseUp,
            CGEventType::MouseMoved,
            CGEventType::LeftMouseDragged,
            CGEventType::RightMouseDragged,
            CGEventType::OtherMouseDragged,
            CGEventType::ScrollWheel,
        ]);
    }

    let session = RefCell::new(Session { pump });

    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::Default,
        interest,
        |_proxy, event_type, event| handle_event(&session, event_type, event),
    )
    .map_err(|_| HookError::CreateEventTap)?;

    // SAFETY: source creation and loop attachment follow the documented
    // tap lifecycle; the loop runs on this thread only.
    unsafe {
        let loop_source = tap
            .mach_port
            .create_runloop_source(0)
            .map_err(|_| HookError::CreateRunLoopSource)?;

        TAP_PORT.store(
            tap.mach_port.as_concrete_TypeRef() as usize,
            Ordering::SeqCst,
        );

        let run_loop = CFRunLoop::get_current();
        RUN_LOOP.store(run_loop.as_concrete_TypeRef() as usize, Ordering::SeqCst);
        run_loop.add_source(&loop_source, kCFRunLoopCommonModes);

        tap.enable();

        initialize_modifiers(scope);
        session.borrow_mut().pump.hook_enabled(epoch_millis());

        CFRunLoop::run_current();

        session.borrow_mut().pump.hook_disabled(epoch_millis());
        // Dropping the tap and its source below detaches them from the
        // (already stopped) loop.
    }

    RUN_LOOP.store(0, Ordering::SeqCst);
    TAP_PORT.store(0, Ordering::SeqCst);
    Ok(())
}

/// Stops the hook thread's run loop; callable from any thread.
pub fn stop() -> Result<(), HookError> {
    let run_loop = RUN_LOOP.load(Ordering::SeqCst);
    if run_loop == 0 {
        return Err(HookError::GetRunLoop);
    }
    // SAFETY: CFRunLoopStop is documented as thread-safe; the loop ref
    // stays valid until the hook thread clears the slot after exiting.
    unsafe {
        CFRunLoopStop(run_loop as *mut _);
    }
    Ok(())
}

fn handle_event(
    session: &RefCell<Session>,
    event_type: CGEventType,
    event: &CGEvent,
) -> Option<CGEvent> {
    // The OS disables taps whose callbacks are too slow; recover.
    if matches!(
        event_type,
        CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput
    ) {
        warn!(?event_type, "event tap disabled; re-enabling");
        let port = TAP_PORT.load(Ordering::SeqCst);
        if port != 0 {
            // SAFETY: the mach port outlives the session.
            unsafe { CGEventTapEnable(port as *mut c_void, true) };
        }
        return Some(event.clone());
    }

    let time = epoch_millis();
    let mut guard = session.borrow_mut();
    let Session { pump } = &mut *guard;

    let consumed = match event_type {
        CGEventType::KeyDown => {
            let keycode =
                event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
            pump.feed(RawEvent::KeyDown {
                key: KeyMapper::macos_kvk_to_key(keycode),
                rawcode: keycode,
                chars: unicode::resolve_press(event),
                time,
            })
        }
        CGEventType::KeyUp => {
            let keycode =
                event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
            pump.feed(RawEvent::KeyUp {
                key: KeyMapper::macos_kvk_to_key(keycode),
                rawcode: keycode,
                time,
            })
        }
        CGEventType::FlagsChanged => {
            let keycode =
                event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
            flags_changed(pump, keycode, time)
        }

        CGEventType::LeftMouseDown => button_event(pump, event, 1, true, time),
        CGEventType::LeftMouseUp => button_event(pump, event, 1, false, time),
        CGEventType::RightMouseDown => button_event(pump, event, 2, true, time),
        CGEventType::RightMouseUp => button_event(pump, event, 2, false, time),
        CGEventType::OtherMouseDown => {
            let button = other_button_number(event);
            button_event(pump, event, button, true, time)
        }
        CGEventType::OtherMouseUp => {
            let button = other_button_number(event);
            button_event(pump, event, button, false, time)
        }

        CGEventType::MouseMoved
        | CGEventType::LeftMouseDragged
        | CGEventType::RightMouseDragged
        | CGEventType::OtherMouseDragged => {
            let location = event.location();
            pump.feed(RawEvent::Motion {
                x: location.x as i16,
                y: location.y as i16,
                time,
            })
        }

        CGEventType::ScrollWheel => scroll_event(pump, event, time),

        other => {
            debug!(?other, "unhandled tap event type");
            false
        }
    };

    if consumed {
        None
    } else {
        Some(event.clone())
    }
}

fn button_event(
    pump: &mut EventPump,
    event: &CGEvent,
    button: u16,
    press: bool,
    time: u64,
) -> bool {
    let location = event.location();
    let raw = if press {
        RawEvent::ButtonDown {
            button,
            x: location.x as i16,
            y: location.y as i16,
            time,
        }
    } else {
        RawEvent::ButtonUp {
            button,
            x: location.x as i16,
            y: location.y as i16,
            time,
        }
    };
    pump.feed(raw)
}

/// CoreGraphics numbers other buttons 2 (center), 3, 4…; shift into the
/// 1-based space with middle at 3.
fn other_button_number(event: &CGEvent) -> u16 {
    let number = event.get_integer_value_field(EventField::MOUSE_EVENT_BUTTON_NUMBER);
    (number as u16) + 1
}

fn scroll_event(pump: &mut EventPump, event: &CGEvent, time: u64) -> bool {
    let location = event.location();
    let continuous =
        event.get_integer_value_field(EventField::SCROLL_WHEEL_EVENT_IS_CONTINUOUS) != 0;
    let scroll = if continuous {
        WheelScroll::Block
    } else {
        WheelScroll::Unit
    };

    let vertical = event.get_integer_value_field(EventField::SCROLL_WHEEL_EVENT_DELTA_AXIS_1);
    let horizontal = event.get_integer_value_field(EventField::SCROLL_WHEEL_EVENT_DELTA_AXIS_2);

    let mut consumed = false;
    for (delta, direction) in [
        (vertical, WheelDirection::Vertical),
        (horizontal, WheelDirection::Horizontal),
    ] {
        if delta != 0 {
            consumed |= pump.feed(RawEvent::Wheel {
                x: location.x as i16,
                y: location.y as i16,
                rotation: delta as i16,
                delta: 1,
                scroll,
                direction,
                time,
            });
        }
    }
    consumed
}

/// A modifier flag transition is a synthetic press or release: press when
/// the key's bit is not yet in our mask, release when it is.  Lock keys
/// report a press/release pair per toggle.
fn flags_changed(pump: &mut EventPump, keycode: u16, time: u64) -> bool {
    let key = KeyMapper::macos_kvk_to_key(keycode);

    if key == VirtualKey::CapsLock {
        let down = pump.feed(RawEvent::KeyDown {
            key,
            rawcode: keycode,
            chars: Vec::new(),
            time,
        });
        let up = pump.feed(RawEvent::KeyUp {
            key,
            rawcode: keycode,
            time,
        });
        return down | up;
    }

    let Some(mask) = key.modifier_mask() else {
        return false;
    };

    if MODIFIERS.snapshot().contains(mask) {
        pump.feed(RawEvent::KeyUp {
            key,
            rawcode: keycode,
            time,
        })
    } else {
        pump.feed(RawEvent::KeyDown {
            key,
            rawcode: keycode,
            chars: Vec::new(),
            time,
        })
    }
}

/// Seeds the modifier mask from combined session key/button/flag state.
fn initialize_modifiers(scope: HookScope) {
    MODIFIERS.reset();

    // SAFETY: state queries against the combined session source.
    unsafe {
        if scope.keyboard() {
            let keys: [(u16, ModifierMask); 8] = [
                (0x38, ModifierMask::SHIFT_L), // kVK_Shift
                (0x3C, ModifierMask::SHIFT_R),
                (0x3B, ModifierMask::CTRL_L),
                (0x3E, ModifierMask::CTRL_R),
                (0x3A, ModifierMask::ALT_L),
                (0x3D, ModifierMask::ALT_R),
                (0x37, ModifierMask::META_L),
                (0x36, ModifierMask::META_R),
            ];
            for (keycode, mask) in keys {
                if CGEventSourceKeyState(COMBINED_SESSION_STATE, keycode) {
                    MODIFIERS.set(mask);
                }
            }

            if CGEventSourceFlagsState(COMBINED_SESSION_STATE)
                & CGEventFlags::CGEventFlagAlphaShift.bits()
                != 0
            {
                MODIFIERS.set(ModifierMask::CAPS_LOCK);
            }
            // The platform exposes no num/scroll lock state.
        }

        if scope.mouse() {
            let buttons: [(u32, ModifierMask); 5] = [
                (0, ModifierMask::BUTTON1),
                (1, ModifierMask::BUTTON2),
                (2, ModifierMask::BUTTON3),
                (3, ModifierMask::BUTTON4),
                (4, ModifierMask::BUTTON5),
            ];
            for (button, mask) in buttons {
                if CGEventSourceButtonState(COMBINED_SESSION_STATE, button) {
                    MODIFIERS.set(mask);
                }
            }
        }
    }
}
