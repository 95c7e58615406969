//! Session lifecycle: the single hook session per process.
//!
//! `run` installs the platform hook on the **calling thread** and blocks
//! there until `stop` is called from any thread.  Exactly one session may
//! be active at a time; a second `run` fails immediately.  The dispatch
//! handler must be installed before `run`; it is retained across sessions
//! until replaced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use tapwire_core::event::VirtualEvent;
use tapwire_core::HookError;

use crate::capture::HookScope;
use crate::modifiers::MODIFIERS;
use crate::pump::{DispatchHandler, EventPump, DEFAULT_MULTI_CLICK_MS};

static HANDLER: Mutex<Option<DispatchHandler>> = Mutex::new(None);
static RUNNING: AtomicBool = AtomicBool::new(false);

/// Installs the event handler called for every captured event.
///
/// The handler runs synchronously on the hook thread; returning `true`
/// consumes the event so the OS never delivers it downstream.  Installing a
/// handler replaces any previous one.
pub fn set_dispatch_handler(handler: impl FnMut(&VirtualEvent) -> bool + Send + 'static) {
    *HANDLER.lock().expect("dispatch handler lock poisoned") = Some(Box::new(handler));
}

/// Removes the installed handler; subsequent events pass through unseen.
pub fn clear_dispatch_handler() {
    *HANDLER.lock().expect("dispatch handler lock poisoned") = None;
}

/// Captures keyboard and mouse events until [`stop`] is called.
pub fn run() -> Result<(), HookError> {
    run_scope(HookScope::All)
}

/// Captures keyboard events only.
pub fn run_keyboard() -> Result<(), HookError> {
    run_scope(HookScope::Keyboard)
}

/// Captures mouse events only.
pub fn run_mouse() -> Result<(), HookError> {
    run_scope(HookScope::Mouse)
}

fn run_scope(scope: HookScope) -> Result<(), HookError> {
    if RUNNING.swap(true, Ordering::AcqRel) {
        warn!("a hook session is already active");
        return Err(HookError::Failure);
    }

    debug!(?scope, "starting hook session");

    // The pump borrows the handler per event so the user can install it
    // once and run any number of consecutive sessions.
    let pump = EventPump::new(
        Box::new(|event: &VirtualEvent| {
            match HANDLER.lock() {
                Ok(mut guard) => guard.as_mut().map(|handler| handler(event)).unwrap_or(false),
                Err(_) => false,
            }
        }),
        &MODIFIERS,
        crate::metrics::multi_click_time().unwrap_or(DEFAULT_MULTI_CLICK_MS as i64) as u64,
    );

    let result = backend_run(scope, pump);

    MODIFIERS.reset();
    RUNNING.store(false, Ordering::Release);
    debug!(?result, "hook session ended");
    result
}

/// Stops the active session; callable from any thread.
///
/// The blocked `run` call returns once the backend has drained and torn
/// down its native resources.
pub fn stop() -> Result<(), HookError> {
    if !RUNNING.load(Ordering::Acquire) {
        return Err(HookError::Failure);
    }
    backend_stop()
}

#[cfg(target_os = "linux")]
fn backend_run(scope: HookScope, pump: EventPump) -> Result<(), HookError> {
    crate::capture::x11::run(scope, pump)
}

#[cfg(target_os = "macos")]
fn backend_run(scope: HookScope, pump: EventPump) -> Result<(), HookError> {
    crate::capture::macos::run(scope, pump)
}

#[cfg(target_os = "windows")]
fn backend_run(scope: HookScope, pump: EventPump) -> Result<(), HookError> {
    crate::capture::windows::run(scope, pump)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn backend_run(_scope: HookScope, _pump: EventPump) -> Result<(), HookError> {
    Err(HookError::Failure)
}

#[cfg(target_os = "linux")]
fn backend_stop() -> Result<(), HookError> {
    crate::capture::x11::stop()
}

#[cfg(target_os = "macos")]
fn backend_stop() -> Result<(), HookError> {
    crate::capture::macos::stop()
}

#[cfg(target_os = "windows")]
fn backend_stop() -> Result<(), HookError> {
    crate::capture::windows::stop()
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn backend_stop() -> Result<(), HookError> {
    Err(HookError::Failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_without_a_session_fails() {
        assert_eq!(stop(), Err(HookError::Failure));
    }

    #[test]
    fn test_handler_can_be_replaced_and_cleared() {
        set_dispatch_handler(|_| false);
        assert!(HANDLER.lock().unwrap().is_some());
        set_dispatch_handler(|_| true);
        clear_dispatch_handler();
        assert!(HANDLER.lock().unwrap().is_none());
    }
}
