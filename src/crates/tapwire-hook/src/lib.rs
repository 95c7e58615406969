//! # tapwire-hook
//!
//! OS-level keyboard and mouse hooking from userland: install a low-level
//! input hook, observe every physical keyboard and pointer event the OS
//! delivers, optionally consume events before applications see them, and
//! inject synthetic events and text back into the input stream.
//!
//! Capture backends per platform:
//!
//! - **Windows** — `WH_KEYBOARD_LL` / `WH_MOUSE_LL` low-level hooks driven
//!   by a message loop on the hook thread;
//! - **macOS** — a session-level `CGEventTap` on the hook thread's run
//!   loop (requires the Accessibility permission);
//! - **X11** — the RECORD extension, decoding the raw wire event stream.
//!
//! ```no_run
//! use tapwire_core::event::EventKind;
//!
//! tapwire_hook::set_dispatch_handler(|event| {
//!     if let EventKind::KeyPressed(key) = &event.kind {
//!         println!("pressed {:?} (mask {:?})", key.key, event.mask);
//!     }
//!     false // let the event through
//! });
//! tapwire_hook::run().expect("hook failed");
//! ```
//!
//! The handler runs **synchronously on the hook thread**: the OS blocks
//! input delivery while it executes, and Windows/macOS evict hooks whose
//! callbacks stall.  Keep handlers fast and defer real work elsewhere.
//!
//! Exactly one session is active per process; `run` blocks the calling
//! thread until [`stop`] is called from another thread.

pub mod capture;
pub mod metrics;
pub mod modifiers;
pub mod pump;
pub mod session;
pub mod synth;

pub use metrics::{
    auto_repeat_delay, auto_repeat_rate, multi_click_time, pointer_acceleration_multiplier,
    pointer_acceleration_threshold, pointer_sensitivity, screen_info, ScreenInfo,
};
pub use modifiers::current_modifiers;
pub use session::{clear_dispatch_handler, run, run_keyboard, run_mouse, set_dispatch_handler, stop};
pub use synth::{post_event, post_text, post_text_delay, set_post_text_delay};

// Re-export the event model so handler code only needs this crate.
pub use tapwire_core::{
    event, EventKind, HookError, KeyboardData, ModifierMask, MouseData, VirtualEvent, VirtualKey,
    WheelData, WheelDirection, WheelScroll, CHAR_UNDEFINED,
};
