//! macOS event synthesis through CoreGraphics event creation.
//!
//! Key injections carry an explicit flag mask: the OS applies exactly the
//! flags set on the synthesized event, so the engine keeps its own shadow
//! of which modifiers it has synthesized down — independent of the capture
//! side's modifier state, which tracks *physical* keys.  Keypad keys also
//! set the numeric-pad flag.
//!
//! Mouse motion remembers the most recent synthesized press so that moves
//! between a press and its release go out as drag events of the right
//! button, matching what real hardware produces.

use std::ffi::c_void;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use core_foundation::base::{CFRelease, CFTypeRef, TCFType};
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTapLocation, CGEventType, CGMouseButton, EventField,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

use tracing::warn;

use tapwire_core::event::{
    EventKind, MouseData, VirtualEvent, WheelDirection, WheelScroll, MOUSE_BUTTON1, MOUSE_BUTTON2,
    MOUSE_NOBUTTON,
};
use tapwire_core::{HookError, KeyMapper, VirtualKey};

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn CGEventCreateScrollWheelEvent(
        source: CFTypeRef,
        units: i32,
        wheel_count: u32,
        wheel1: i32,
        wheel2: i32,
    ) -> *mut c_void;
    fn CGEventPost(location: u32, event: *mut c_void);
}

/// `kCGScrollEventUnitPixel` / `kCGScrollEventUnitLine`.
const SCROLL_UNIT_PIXEL: i32 = 0;
const SCROLL_UNIT_LINE: i32 = 1;
/// `kCGHIDEventTap`.
const HID_EVENT_TAP: u32 = 0;

/// Flags the engine has synthesized down; applied to every injected key.
static SYNTH_FLAGS: AtomicU64 = AtomicU64::new(0);
/// Motion event type to use for plain moves (drag while a synthesized
/// button is down).
static MOTION_TYPE: AtomicU32 = AtomicU32::new(CGEventType::MouseMoved as u32);
static MOTION_BUTTON: AtomicU32 = AtomicU32::new(CGMouseButton::Left as u32);

fn event_source() -> Result<CGEventSource, HookError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| HookError::OutOfMemory)
}

/// Injects one event; see the module docs for the flag handling.
pub fn post_event(event: &VirtualEvent) -> Result<(), HookError> {
    match &event.kind {
        EventKind::KeyPressed(data) => post_key(data.key, true),
        EventKind::KeyReleased(data) => post_key(data.key, false),

        EventKind::MousePressed(data) => post_button(data, true, false),
        EventKind::MouseReleased(data) => post_button(data, false, false),
        EventKind::MousePressedIgnoreCoords(data) => post_button(data, true, true),
        EventKind::MouseReleasedIgnoreCoords(data) => post_button(data, false, true),

        EventKind::MouseMoved(data) | EventKind::MouseDragged(data) => {
            post_motion(CGPoint::new(data.x as f64, data.y as f64), data.clicks)
        }
        EventKind::MouseMovedRelativeToCursor(data) => {
            let cursor = current_location()?;
            post_motion(
                CGPoint::new(cursor.x + data.x as f64, cursor.y + data.y as f64),
                data.clicks,
            )
        }

        EventKind::MouseWheel(wheel) => post_wheel(wheel.scroll, wheel.direction, wheel.rotation),

        _ => {
            warn!(kind = ?event.kind, "ignoring unsynthesizable event");
            Err(HookError::Failure)
        }
    }
}

/// Types the whole string as one press/release pair carrying the Unicode
/// payload.
pub fn post_text(text: &str) -> Result<(), HookError> {
    let units: Vec<u16> = text.encode_utf16().collect();

    let down = CGEvent::new_keyboard_event(event_source()?, 0, true)
        .map_err(|_| HookError::OutOfMemory)?;
    let up = CGEvent::new_keyboard_event(event_source()?, 0, false)
        .map_err(|_| HookError::OutOfMemory)?;

    down.set_string_from_utf16_unchecked(&units);
    up.set_string_from_utf16_unchecked(&units);

    down.post(CGEventTapLocation::Session);
    up.post(CGEventTapLocation::Session);
    Ok(())
}

fn post_key(key: VirtualKey, press: bool) -> Result<(), HookError> {
    update_synth_flags(key, press);

    let keycode = KeyMapper::key_to_macos_kvk(key).ok_or_else(|| {
        warn!(?key, "no macOS key code for key");
        HookError::Failure
    })?;

    let mut flags = CGEventFlags::from_bits_truncate(SYNTH_FLAGS.load(Ordering::Acquire));
    if is_keypad(key) {
        flags |= CGEventFlags::CGEventFlagNumericPad;
    }

    let source = event_source()?;
    let event = CGEvent::new_keyboard_event(source, keycode, press)
        .map_err(|_| HookError::OutOfMemory)?;
    event.set_flags(flags);
    event.post(CGEventTapLocation::HID);
    Ok(())
}

fn post_button(data: &MouseData, press: bool, ignore_coords: bool) -> Result<(), HookError> {
    if data.button == MOUSE_NOBUTTON {
        warn!("no button specified for mouse injection");
        return Err(HookError::Failure);
    }

    let (event_type, button, drag_type) = if data.button == MOUSE_BUTTON1 {
        if press {
            (
                CGEventType::LeftMouseDown,
                CGMouseButton::Left,
                CGEventType::LeftMouseDragged,
            )
        } else {
            (
                CGEventType::LeftMouseUp,
                CGMouseButton::Left,
                CGEventType::MouseMoved,
            )
        }
    } else if data.button == MOUSE_BUTTON2 {
        if press {
            (
                CGEventType::RightMouseDown,
                CGMouseButton::Right,
                CGEventType::RightMouseDragged,
            )
        } else {
            (
                CGEventType::RightMouseUp,
                CGMouseButton::Right,
                CGEventType::MouseMoved,
            )
        }
    } else if press {
        (
            CGEventType::OtherMouseDown,
            CGMouseButton::Center,
            CGEventType::OtherMouseDragged,
        )
    } else {
        (
            CGEventType::OtherMouseUp,
            CGMouseButton::Center,
            CGEventType::MouseMoved,
        )
    };

    MOTION_TYPE.store(drag_type as u32, Ordering::Release);
    MOTION_BUTTON.store(button as u32, Ordering::Release);

    let point = if ignore_coords {
        current_location()?
    } else {
        CGPoint::new(data.x as f64, data.y as f64)
    };

    let source = event_source()?;
    let event = CGEvent::new_mouse_event(source, event_type, point, button)
        .map_err(|_| HookError::OutOfMemory)?;
    if data.clicks != 0 {
        event.set_integer_value_field(EventField::MOUSE_EVENT_CLICK_STATE, data.clicks as i64);
    }
    event.post(CGEventTapLocation::HID);
    Ok(())
}

fn post_motion(point: CGPoint, clicks: u16) -> Result<(), HookError> {
    let event_type = motion_type();
    let button = motion_button();

    let source = event_source()?;
    let event = CGEvent::new_mouse_event(source, event_type, point, button)
        .map_err(|_| HookError::OutOfMemory)?;
    if clicks != 0 {
        event.set_integer_value_field(EventField::MOUSE_EVENT_CLICK_STATE, clicks as i64);
    }
    event.post(CGEventTapLocation::HID);
    Ok(())
}

fn post_wheel(
    scroll: WheelScroll,
    direction: WheelDirection,
    rotation: i16,
) -> Result<(), HookError> {
    let units = match scroll {
        WheelScroll::Block => SCROLL_UNIT_LINE,
        WheelScroll::Unit => SCROLL_UNIT_PIXEL,
    };
    let (wheel1, wheel2) = match direction {
        WheelDirection::Vertical => (rotation as i32, 0),
        WheelDirection::Horizontal => (0, rotation as i32),
    };

    let source = event_source()?;
    // SAFETY: the created event is posted and released before the source
    // goes away.
    unsafe {
        let event = CGEventCreateScrollWheelEvent(
            source.as_concrete_TypeRef() as CFTypeRef,
            units,
            2,
            wheel1,
            wheel2,
        );
        if event.is_null() {
            return Err(HookError::OutOfMemory);
        }
        CGEventPost(HID_EVENT_TAP, event);
        CFRelease(event as CFTypeRef);
    }
    Ok(())
}

fn current_location() -> Result<CGPoint, HookError> {
    let source = event_source()?;
    CGEvent::new(source)
        .map(|event| event.location())
        .map_err(|_| HookError::Failure)
}

fn update_synth_flags(key: VirtualKey, press: bool) {
    let flag = match key {
        VirtualKey::ShiftLeft | VirtualKey::ShiftRight => CGEventFlags::CGEventFlagShift,
        VirtualKey::ControlLeft | VirtualKey::ControlRight => CGEventFlags::CGEventFlagControl,
        VirtualKey::MetaLeft | VirtualKey::MetaRight => CGEventFlags::CGEventFlagCommand,
        VirtualKey::AltLeft | VirtualKey::AltRight => CGEventFlags::CGEventFlagAlternate,
        _ => return,
    };
    if press {
        SYNTH_FLAGS.fetch_or(flag.bits(), Ordering::AcqRel);
    } else {
        SYNTH_FLAGS.fetch_and(!flag.bits(), Ordering::AcqRel);
    }
}

fn is_keypad(key: VirtualKey) -> bool {
    matches!(
        key,
        VirtualKey::Kp0
            | VirtualKey::Kp1
            | VirtualKey::Kp2
            | VirtualKey::Kp3
            | VirtualKey::Kp4
            | VirtualKey::Kp5
            | VirtualKey::Kp6
            | VirtualKey::Kp7
            | VirtualKey::Kp8
            | VirtualKey::Kp9
            | VirtualKey::NumLock
            | VirtualKey::KpEnter
            | VirtualKey::KpMultiply
            | VirtualKey::KpAdd
            | VirtualKey::KpSeparator
            | VirtualKey::KpSubtract
            | VirtualKey::KpDivide
            | VirtualKey::KpDecimal
            | VirtualKey::KpEquals
            | VirtualKey::KpClear
    )
}

fn motion_type() -> CGEventType {
    match MOTION_TYPE.load(Ordering::Acquire) {
        value if value == CGEventType::LeftMouseDragged as u32 => CGEventType::LeftMouseDragged,
        value if value == CGEventType::RightMouseDragged as u32 => CGEventType::RightMouseDragged,
        value if value == CGEventType::OtherMouseDragged as u32 => CGEventType::OtherMouseDragged,
        _ => CGEventType::MouseMoved,
    }
}

fn motion_button() -> CGMouseButton {
    match MOTION_BUTTON.load(Ordering::Acquire) {
        value if value == CGMouseButton::Right as u32 => CGMouseButton::Right,
        value if value == CGMouseButton::Center as u32 => CGMouseButton::Center,
        _ => CGMouseButton::Left,
    }
}
