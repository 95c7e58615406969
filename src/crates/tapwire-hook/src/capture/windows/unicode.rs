//! Typed-character resolution via `ToUnicodeEx`.
//!
//! The lookup runs against the keyboard layout of the foreground window's
//! thread (falling back to the hook thread's own layout) so the resolved
//! character matches what the focused application would have received.
//! The translate-only flag bits keep the call from mutating kernel
//! keyboard state, which would otherwise corrupt dead-key composition for
//! the real keystroke.

use tracing::warn;

use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, GetKeyboardLayout, GetKeyboardState, ToUnicodeEx,
};
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId};

/// No Alt handling: keeps editors from treating Alt+navigation as input.
const FLAG_NO_ALT: u32 = 1 << 0;
/// Do not change keyboard state (Windows 10 1607+).
const FLAG_NO_STATE_CHANGE: u32 = 1 << 2;

/// Resolves the UTF-16 units a key press would type, or empty for
/// non-character keys.
pub fn resolve_press(vk: u32, scancode: u32) -> Vec<u16> {
    // SAFETY: plain state queries; all buffers are stack locals.
    unsafe {
        let focus_thread = GetWindowThreadProcessId(GetForegroundWindow(), None);
        let mut layout = GetKeyboardLayout(focus_thread);
        if layout.is_invalid() {
            layout = GetKeyboardLayout(0);
        }

        // Forces GetKeyboardState to refresh its snapshot.
        let _ = GetKeyState(0);

        let mut state = [0u8; 256];
        if GetKeyboardState(&mut state).is_err() {
            warn!("GetKeyboardState failed; no typed character");
            return Vec::new();
        }

        let mut buffer = [0u16; 8];
        let written = ToUnicodeEx(
            vk,
            scancode,
            &state,
            &mut buffer,
            FLAG_NO_ALT | FLAG_NO_STATE_CHANGE,
            layout,
        );
        if written > 0 {
            buffer[..written as usize].to_vec()
        } else {
            // Negative results are dead keys; nothing typed yet.
            Vec::new()
        }
    }
}
