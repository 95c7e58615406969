//! Windows capture backend: low-level keyboard and mouse hooks.
//!
//! `run` installs `WH_KEYBOARD_LL` / `WH_MOUSE_LL` on the calling thread
//! and pumps messages until `WM_QUIT`.  An invisible message window on the
//! same thread receives `WM_DISPLAYCHANGE` (refreshing the monitor-origin
//! cache) and `WM_CLOSE`/`WM_DESTROY` for shutdown.  Hook callbacks decode
//! the native structs, translate through the VK table, resolve typed
//! characters, and feed the pump; a consumed verdict returns a non-zero
//! hook result so downstream hooks and applications never see the event.
//!
//! The callbacks must finish quickly — Windows silently evicts low-level
//! hooks whose callbacks exceed the system timeout.

pub mod monitor;
pub mod unicode;

use std::cell::RefCell;
use std::sync::atomic::{AtomicIsize, AtomicU32, Ordering};

use tracing::{debug, warn};

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::GetKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    PostMessageW, PostQuitMessage, PostThreadMessageW, RegisterClassExW, SetWindowsHookExW,
    ShowWindow, SystemParametersInfoW, TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK,
    KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS, LLKHF_EXTENDED, MSG, MSLLHOOKSTRUCT,
    SPI_GETWHEELSCROLLLINES, SW_HIDE, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS, WH_KEYBOARD_LL,
    WH_MOUSE_LL, WM_CLOSE, WM_DESTROY, WM_DISPLAYCHANGE, WM_KEYDOWN, WM_KEYUP,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEHWHEEL, WM_MOUSEMOVE,
    WM_MOUSEWHEEL, WM_NCXBUTTONDOWN, WM_NCXBUTTONUP, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP,
    WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP, WNDCLASSEXW, WS_DISABLED,
    WS_EX_NOACTIVATE, XBUTTON1, XBUTTON2,
};

use tapwire_core::event::{WheelDirection, WheelScroll};
use tapwire_core::{HookError, KeyMapper, ModifierMask};

use crate::capture::{event_time, HookScope, RawEvent};
use crate::modifiers::MODIFIERS;
use crate::pump::EventPump;

const WHEEL_DELTA: u16 = 120;
/// `SPI_GETWHEELSCROLLLINES` sentinel for page scrolling.
const WHEEL_PAGESCROLL: u32 = u32::MAX;

static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);
static INVISIBLE_HWND: AtomicIsize = AtomicIsize::new(0);

thread_local! {
    /// The pump lives on the hook thread; the extern callbacks reach it
    /// through this slot.
    static PUMP: RefCell<Option<EventPump>> = const { RefCell::new(None) };
}

/// Installs the requested hooks and pumps messages until stopped.
pub fn run(scope: HookScope, pump: EventPump) -> Result<(), HookError> {
    // SAFETY: Win32 setup on the calling thread; every resource acquired
    // is released before returning.
    unsafe {
        HOOK_THREAD_ID.store(GetCurrentThreadId(), Ordering::SeqCst);

        let module = GetModuleHandleW(None).map_err(|_| HookError::GetModuleHandle)?;
        let instance = windows::Win32::Foundation::HINSTANCE(module.0);
        let hwnd = create_invisible_window(instance)?;
        INVISIBLE_HWND.store(hwnd.0, Ordering::SeqCst);

        let keyboard_hook = if scope.keyboard() {
            match SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) {
                Ok(hook) => Some(hook),
                Err(error) => {
                    warn!(?error, "WH_KEYBOARD_LL installation failed");
                    let _ = DestroyWindow(hwnd);
                    return Err(HookError::SetWindowsHookEx);
                }
            }
        } else {
            None
        };

        let mouse_hook = if scope.mouse() {
            match SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) {
                Ok(hook) => Some(hook),
                Err(error) => {
                    warn!(?error, "WH_MOUSE_LL installation failed");
                    unhook(keyboard_hook);
                    let _ = DestroyWindow(hwnd);
                    return Err(HookError::SetWindowsHookEx);
                }
            }
        } else {
            None
        };

        initialize_modifiers(scope);
        PUMP.with(|slot| *slot.borrow_mut() = Some(pump));
        PUMP.with(|slot| {
            if let Some(pump) = slot.borrow_mut().as_mut() {
                // Windows has no hook-started callback; fake it here.
                pump.hook_enabled(event_time(0));
            }
        });
        debug!(?scope, "low-level hooks installed");

        let mut message = MSG::default();
        while GetMessageW(&mut message, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&message);
            DispatchMessageW(&message);
        }

        unhook(keyboard_hook);
        unhook(mouse_hook);

        PUMP.with(|slot| {
            if let Some(pump) = slot.borrow_mut().as_mut() {
                pump.hook_disabled(event_time(0));
            }
            *slot.borrow_mut() = None;
        });
        INVISIBLE_HWND.store(0, Ordering::SeqCst);
        HOOK_THREAD_ID.store(0, Ordering::SeqCst);
    }

    Ok(())
}

/// Asks the hook thread to drain and exit; callable from any thread.
pub fn stop() -> Result<(), HookError> {
    let hwnd = HWND(INVISIBLE_HWND.load(Ordering::SeqCst));
    let thread_id = HOOK_THREAD_ID.load(Ordering::SeqCst);
    if hwnd.0 == 0 || thread_id == 0 {
        return Err(HookError::Failure);
    }

    // SAFETY: posting to a window/thread that may already be gone is
    // harmless; failure maps to the generic error.
    unsafe {
        PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)).map_err(|_| HookError::Failure)?;
        PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0))
            .map_err(|_| HookError::Failure)?;
    }
    Ok(())
}

unsafe fn unhook(hook: Option<HHOOK>) {
    if let Some(hook) = hook {
        let _ = UnhookWindowsHookEx(hook);
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match message {
        WM_CLOSE => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        WM_DISPLAYCHANGE => {
            monitor::refresh();
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, message, wparam, lparam),
    }
}

unsafe fn create_invisible_window(
    instance: windows::Win32::Foundation::HINSTANCE,
) -> Result<HWND, HookError> {
    let class_name: Vec<u16> = "tapwire-hook\0".encode_utf16().collect();

    let class = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(window_proc),
        hInstance: instance,
        lpszClassName: PCWSTR(class_name.as_ptr()),
        ..Default::default()
    };
    // Re-registration after a previous session reports "class exists";
    // that is fine.
    let _ = RegisterClassExW(&class);

    let window_name: Vec<u16> = "tapwire display change monitor\0".encode_utf16().collect();
    let hwnd = CreateWindowExW(
        WS_EX_NOACTIVATE,
        PCWSTR(class_name.as_ptr()),
        PCWSTR(window_name.as_ptr()),
        WS_DISABLED,
        0,
        0,
        1,
        1,
        None,
        None,
        instance,
        None,
    );
    if hwnd.0 == 0 {
        return Err(HookError::CreateInvisibleWindow);
    }
    ShowWindow(hwnd, SW_HIDE);
    Ok(hwnd)
}

/// Seeds the modifier mask from live key state.
unsafe fn initialize_modifiers(scope: HookScope) {
    MODIFIERS.reset();

    // The high-order bit of GetKeyState marks a held key.
    let held = |vk: i32| GetKeyState(vk) < 0;

    if scope.keyboard() {
        let keys: [(i32, ModifierMask); 11] = [
            (0xA0, ModifierMask::SHIFT_L),  // VK_LSHIFT
            (0xA1, ModifierMask::SHIFT_R),  // VK_RSHIFT
            (0xA2, ModifierMask::CTRL_L),   // VK_LCONTROL
            (0xA3, ModifierMask::CTRL_R),   // VK_RCONTROL
            (0xA4, ModifierMask::ALT_L),    // VK_LMENU
            (0xA5, ModifierMask::ALT_R),    // VK_RMENU
            (0x5B, ModifierMask::META_L),   // VK_LWIN
            (0x5C, ModifierMask::META_R),   // VK_RWIN
            (0x90, ModifierMask::NUM_LOCK),
            (0x14, ModifierMask::CAPS_LOCK),
            (0x91, ModifierMask::SCROLL_LOCK),
        ];
        for (vk, mask) in keys {
            if held(vk) {
                MODIFIERS.set(mask);
            }
        }
    }

    if scope.mouse() {
        let buttons: [(i32, ModifierMask); 5] = [
            (0x01, ModifierMask::BUTTON1), // VK_LBUTTON
            (0x02, ModifierMask::BUTTON2), // VK_RBUTTON
            (0x04, ModifierMask::BUTTON3), // VK_MBUTTON
            (0x05, ModifierMask::BUTTON4), // VK_XBUTTON1
            (0x06, ModifierMask::BUTTON5), // VK_XBUTTON2
        ];
        for (vk, mask) in buttons {
            if held(vk) {
                MODIFIERS.set(mask);
            }
        }
    }
}

fn feed(raw: RawEvent) -> bool {
    PUMP.with(|slot| {
        slot.borrow_mut()
            .as_mut()
            .map(|pump| pump.feed(raw))
            .unwrap_or(false)
    })
}

/// Low-level keyboard hook callback; runs on the hook thread.
unsafe extern "system" fn keyboard_hook_proc(
    ncode: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let mut consumed = false;

    if ncode == HC_ACTION as i32 {
        let keyboard = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        let vk = keyboard.vkCode as u16;
        let extended = (keyboard.flags & LLKHF_EXTENDED) != KBDLLHOOKSTRUCT_FLAGS(0);
        let key = KeyMapper::windows_vk_to_key(vk, extended);
        let time = event_time(keyboard.time as u64);

        consumed = match wparam.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => feed(RawEvent::KeyDown {
                key,
                rawcode: vk,
                chars: unicode::resolve_press(keyboard.vkCode, keyboard.scanCode),
                time,
            }),
            WM_KEYUP | WM_SYSKEYUP => feed(RawEvent::KeyUp {
                key,
                rawcode: vk,
                time,
            }),
            other => {
                debug!(message = other, "unhandled keyboard hook message");
                false
            }
        };
    }

    if ncode < 0 || !consumed {
        CallNextHookEx(None, ncode, wparam, lparam)
    } else {
        LRESULT(1)
    }
}

/// Low-level mouse hook callback; runs on the hook thread.
unsafe extern "system" fn mouse_hook_proc(ncode: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let mut consumed = false;

    if ncode == HC_ACTION as i32 {
        let mouse = &*(lparam.0 as *const MSLLHOOKSTRUCT);
        let x = mouse.pt.x as i16;
        let y = mouse.pt.y as i16;
        let time = event_time(mouse.time as u64);
        let high_word = (mouse.mouseData >> 16) as u16;

        consumed = match wparam.0 as u32 {
            WM_LBUTTONDOWN => feed(RawEvent::ButtonDown { button: 1, x, y, time }),
            WM_LBUTTONUP => feed(RawEvent::ButtonUp { button: 1, x, y, time }),
            WM_RBUTTONDOWN => feed(RawEvent::ButtonDown { button: 2, x, y, time }),
            WM_RBUTTONUP => feed(RawEvent::ButtonUp { button: 2, x, y, time }),
            WM_MBUTTONDOWN => feed(RawEvent::ButtonDown { button: 3, x, y, time }),
            WM_MBUTTONUP => feed(RawEvent::ButtonUp { button: 3, x, y, time }),

            WM_XBUTTONDOWN | WM_NCXBUTTONDOWN => feed(RawEvent::ButtonDown {
                button: xbutton_number(high_word),
                x,
                y,
                time,
            }),
            WM_XBUTTONUP | WM_NCXBUTTONUP => feed(RawEvent::ButtonUp {
                button: xbutton_number(high_word),
                x,
                y,
                time,
            }),

            WM_MOUSEMOVE => feed(RawEvent::Motion { x, y, time }),

            WM_MOUSEWHEEL => {
                let (scroll, delta) = wheel_profile();
                feed(RawEvent::Wheel {
                    x,
                    y,
                    rotation: (high_word as i16) / WHEEL_DELTA as i16,
                    delta,
                    scroll,
                    direction: WheelDirection::Vertical,
                    time,
                })
            }
            WM_MOUSEHWHEEL => {
                let (scroll, delta) = wheel_profile();
                feed(RawEvent::Wheel {
                    x,
                    y,
                    rotation: (high_word as i16) / WHEEL_DELTA as i16,
                    delta,
                    scroll,
                    direction: WheelDirection::Horizontal,
                    time,
                })
            }

            other => {
                warn!(message = other, "unhandled mouse hook message");
                false
            }
        };
    }

    if ncode < 0 || !consumed {
        CallNextHookEx(None, ncode, wparam, lparam)
    } else {
        LRESULT(1)
    }
}

/// Extra buttons: XBUTTON1/2 are buttons 4 and 5; anything beyond keeps
/// its decoded index shifted past the three standard buttons.
fn xbutton_number(high_word: u16) -> u16 {
    if high_word == XBUTTON1 {
        4
    } else if high_word == XBUTTON2 {
        5
    } else {
        high_word + 3
    }
}

/// Scroll granularity: lines per notch, or page scrolling.
fn wheel_profile() -> (WheelScroll, u16) {
    let mut lines: u32 = 3;
    // SAFETY: out-param is a stack local.
    unsafe {
        let _ = SystemParametersInfoW(
            SPI_GETWHEELSCROLLLINES,
            0,
            Some(&mut lines as *mut u32 as *mut _),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        );
    }
    if lines == WHEEL_PAGESCROLL {
        (WheelScroll::Block, 1)
    } else {
        (WheelScroll::Unit, lines as u16)
    }
}
