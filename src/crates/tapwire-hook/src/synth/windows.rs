//! Windows event synthesis through `SendInput`.
//!
//! Key injections map the virtual key back to its VK code and scan code;
//! mouse injections normalize coordinates into the `[0, 65535]` absolute
//! virtual-desktop space using the live system metrics and the cached
//! most-negative monitor origin.  Text injection marks every UTF-16 unit
//! `KEYEVENTF_UNICODE` and ships the whole string (down strokes, then up
//! strokes) in one `SendInput` batch.

use tracing::warn;

use windows::Win32::UI::Input::KeyboardAndMouse::{
    MapVirtualKeyW, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE,
    KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE,
    MAP_VIRTUAL_KEY_TYPE, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_HWHEEL, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE,
    MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_VIRTUALDESK, MOUSEEVENTF_WHEEL,
    MOUSEEVENTF_XDOWN, MOUSEEVENTF_XUP, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, XBUTTON1, XBUTTON2,
};
use windows::Win32::Foundation::POINT;

use tapwire_core::event::{
    EventKind, MouseData, VirtualEvent, WheelData, WheelDirection, MOUSE_BUTTON1, MOUSE_BUTTON2,
    MOUSE_BUTTON3, MOUSE_BUTTON4, MOUSE_BUTTON5, MOUSE_NOBUTTON,
};
use tapwire_core::geometry::VirtualScreen;
use tapwire_core::{HookError, KeyMapper};

use crate::capture::windows::monitor;

/// `MAPVK_VK_TO_VSC_EX`.
const VK_TO_VSC_EX: MAP_VIRTUAL_KEY_TYPE = MAP_VIRTUAL_KEY_TYPE(4);

/// Injects one event; see the module docs for the per-kind mapping.
pub fn post_event(event: &VirtualEvent) -> Result<(), HookError> {
    let input = match &event.kind {
        EventKind::KeyPressed(data) => keyboard_input(data.key, false)?,
        EventKind::KeyReleased(data) => keyboard_input(data.key, true)?,

        EventKind::MousePressed(data) => {
            post_move(data.x, data.y)?;
            button_input(data, true)?
        }
        EventKind::MouseReleased(data) => {
            post_move(data.x, data.y)?;
            button_input(data, false)?
        }
        EventKind::MousePressedIgnoreCoords(data) => button_input(data, true)?,
        EventKind::MouseReleasedIgnoreCoords(data) => button_input(data, false)?,

        EventKind::MouseMoved(data) | EventKind::MouseDragged(data) => {
            move_input(data.x as i32, data.y as i32)
        }
        EventKind::MouseMovedRelativeToCursor(data) => {
            let mut cursor = POINT::default();
            // SAFETY: out-param is a stack local.
            unsafe {
                let _ = GetCursorPos(&mut cursor);
            }
            move_input(cursor.x + data.x as i32, cursor.y + data.y as i32)
        }

        EventKind::MouseWheel(wheel) => wheel_input(wheel),

        // Typed, clicked and lifecycle events have no native injection.
        _ => {
            warn!(kind = ?event.kind, "ignoring unsynthesizable event");
            return Err(HookError::Failure);
        }
    };

    send(&[input])
}

/// Types `text` as a single `SendInput` batch of Unicode strokes.
pub fn post_text(text: &str) -> Result<(), HookError> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut inputs = Vec::with_capacity(units.len() * 2);

    for &unit in &units {
        inputs.push(unicode_input(unit, false));
    }
    for &unit in &units {
        inputs.push(unicode_input(unit, true));
    }

    send(&inputs)
}

fn send(inputs: &[INPUT]) -> Result<(), HookError> {
    // SAFETY: inputs are fully initialized stack/heap data.
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        warn!(sent, expected = inputs.len(), "SendInput failed");
        return Err(HookError::Failure);
    }
    Ok(())
}

fn keyboard_input(key: tapwire_core::VirtualKey, release: bool) -> Result<INPUT, HookError> {
    let vk = KeyMapper::key_to_windows_vk(key).ok_or_else(|| {
        warn!(?key, "no VK code for key");
        HookError::Failure
    })?;

    // SAFETY: pure translation query.
    let scan = unsafe { MapVirtualKeyW(vk as u32, VK_TO_VSC_EX) } as u16;

    let mut flags = if release {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };
    if scan & 0xFF00 != 0 {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    Ok(INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    })
}

fn unicode_input(unit: u16, release: bool) -> INPUT {
    let mut flags = KEYEVENTF_UNICODE;
    if release {
        flags |= KEYEVENTF_KEYUP;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(0),
                wScan: unit,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn button_input(data: &MouseData, press: bool) -> Result<INPUT, HookError> {
    let (flags, mouse_data): (MOUSE_EVENT_FLAGS, i32) = match (data.button, press) {
        (MOUSE_NOBUTTON, _) => {
            warn!("no button specified for mouse injection");
            return Err(HookError::Failure);
        }
        (MOUSE_BUTTON1, true) => (MOUSEEVENTF_LEFTDOWN, 0),
        (MOUSE_BUTTON1, false) => (MOUSEEVENTF_LEFTUP, 0),
        (MOUSE_BUTTON2, true) => (MOUSEEVENTF_RIGHTDOWN, 0),
        (MOUSE_BUTTON2, false) => (MOUSEEVENTF_RIGHTUP, 0),
        (MOUSE_BUTTON3, true) => (MOUSEEVENTF_MIDDLEDOWN, 0),
        (MOUSE_BUTTON3, false) => (MOUSEEVENTF_MIDDLEUP, 0),
        (MOUSE_BUTTON4, true) => (MOUSEEVENTF_XDOWN, XBUTTON1 as i32),
        (MOUSE_BUTTON4, false) => (MOUSEEVENTF_XUP, XBUTTON1 as i32),
        (MOUSE_BUTTON5, true) => (MOUSEEVENTF_XDOWN, XBUTTON2 as i32),
        (MOUSE_BUTTON5, false) => (MOUSEEVENTF_XUP, XBUTTON2 as i32),
        (other, true) => (MOUSEEVENTF_XDOWN, (other - 3) as i32),
        (other, false) => (MOUSEEVENTF_XUP, (other - 3) as i32),
    };

    Ok(mouse_input(0, 0, mouse_data, flags))
}

fn move_input(x: i32, y: i32) -> INPUT {
    let (abs_x, abs_y) = virtual_screen().to_absolute(x, y);
    mouse_input(
        abs_x,
        abs_y,
        0,
        MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK,
    )
}

fn wheel_input(wheel: &WheelData) -> INPUT {
    let amount = wheel.rotation as i32 * wheel.delta as i32;
    match wheel.direction {
        WheelDirection::Vertical => mouse_input(0, 0, amount, MOUSEEVENTF_WHEEL),
        WheelDirection::Horizontal => mouse_input(0, 0, amount, MOUSEEVENTF_HWHEEL),
    }
}

fn mouse_input(dx: i32, dy: i32, mouse_data: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: mouse_data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Moves the cursor before a coordinate-carrying press or release.
fn post_move(x: i16, y: i16) -> Result<(), HookError> {
    send(&[move_input(x as i32, y as i32)])
}

fn virtual_screen() -> VirtualScreen {
    // SAFETY: pure metric queries.
    let (width, height) = unsafe {
        (
            GetSystemMetrics(SM_CXVIRTUALSCREEN),
            GetSystemMetrics(SM_CYVIRTUALSCREEN),
        )
    };
    let (left, top) = monitor::largest_negative();
    VirtualScreen {
        width: width.max(0) as u16,
        height: height.max(0) as u16,
        left,
        top,
    }
}
