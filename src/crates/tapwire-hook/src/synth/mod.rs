//! Event and text synthesis: virtual events translated back into native
//! input injections.
//!
//! `post_event` accepts the same [`VirtualEvent`] shape capture produces,
//! plus the three injection-only variants (press/release without the
//! implicit move, and cursor-relative motion).  Synthesized events re-enter
//! the OS input pipeline; a running hook session will observe them again as
//! fresh capture events — loopback is not suppressed, callers guard
//! against echo themselves.
//!
//! `post_text` types a whole string, independent of the key map where the
//! platform allows it.

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "windows")]
pub mod windows;
#[cfg(target_os = "linux")]
pub mod x11;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tapwire_core::event::VirtualEvent;
use tapwire_core::HookError;

/// Default inter-character delay for X11 text injection.
const DEFAULT_POST_TEXT_DELAY_NS: u64 = 50_000_000;

static POST_TEXT_DELAY_NS: AtomicU64 = AtomicU64::new(DEFAULT_POST_TEXT_DELAY_NS);

/// Delay between injected characters during X11 text injection.
///
/// Other platforms batch the whole string and ignore this value.
pub fn post_text_delay() -> Duration {
    Duration::from_nanos(POST_TEXT_DELAY_NS.load(Ordering::Relaxed))
}

/// Sets the X11 inter-character text injection delay.
pub fn set_post_text_delay(delay: Duration) {
    POST_TEXT_DELAY_NS.store(delay.as_nanos() as u64, Ordering::Relaxed);
}

/// Injects one synthetic event into the OS input stream.
pub fn post_event(event: &VirtualEvent) -> Result<(), HookError> {
    platform_post_event(event)
}

/// Types `text` into the OS input stream.
///
/// The string is injected as UTF-16; supplementary-plane characters reach
/// a capturing session as surrogate-pair typed events.
pub fn post_text(text: &str) -> Result<(), HookError> {
    if text.is_empty() {
        return Err(HookError::EmptyText);
    }
    platform_post_text(text)
}

#[cfg(target_os = "linux")]
fn platform_post_event(event: &VirtualEvent) -> Result<(), HookError> {
    x11::post_event(event)
}

#[cfg(target_os = "linux")]
fn platform_post_text(text: &str) -> Result<(), HookError> {
    x11::post_text(text)
}

#[cfg(target_os = "macos")]
fn platform_post_event(event: &VirtualEvent) -> Result<(), HookError> {
    macos::post_event(event)
}

#[cfg(target_os = "macos")]
fn platform_post_text(text: &str) -> Result<(), HookError> {
    macos::post_text(text)
}

#[cfg(target_os = "windows")]
fn platform_post_event(event: &VirtualEvent) -> Result<(), HookError> {
    windows::post_event(event)
}

#[cfg(target_os = "windows")]
fn platform_post_text(text: &str) -> Result<(), HookError> {
    windows::post_text(text)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn platform_post_event(_event: &VirtualEvent) -> Result<(), HookError> {
    Err(HookError::Failure)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn platform_post_text(_text: &str) -> Result<(), HookError> {
    Err(HookError::Failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_text_rejects_empty_input() {
        assert_eq!(post_text(""), Err(HookError::EmptyText));
    }

    #[test]
    fn test_post_text_delay_round_trips() {
        let original = post_text_delay();
        set_post_text_delay(Duration::from_millis(5));
        assert_eq!(post_text_delay(), Duration::from_millis(5));
        set_post_text_delay(original);
    }

    #[test]
    fn test_default_delay_is_fifty_milliseconds() {
        assert_eq!(DEFAULT_POST_TEXT_DELAY_NS, 50_000_000);
    }
}
