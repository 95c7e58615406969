//! Synchronous main-queue marshaling.
//!
//! The Text Input Source APIs must run on the process main run loop;
//! calling them from the event-tap thread raises TSM errors and can
//! corrupt input state.  When the hook thread is not the main thread the
//! closure is shipped to the main dispatch queue with `dispatch_sync_f`,
//! which blocks the caller until the closure has run — the same
//! synchronous handoff the capture pipeline needs anyway, with the OS
//! owning the queue discipline.

use std::ffi::c_void;

extern "C" {
    static _dispatch_main_q: u8;
    fn dispatch_sync_f(
        queue: *const u8,
        context: *mut c_void,
        work: unsafe extern "C" fn(*mut c_void),
    );
}

unsafe extern "C" fn trampoline<F: FnOnce()>(context: *mut c_void) {
    let slot = &mut *(context as *mut Option<F>);
    if let Some(work) = slot.take() {
        work();
    }
}

/// Runs `work` on the main queue and waits for it to finish.
///
/// Runs inline when already on the main thread (dispatching to the main
/// queue from the main thread would deadlock).  The closure never outlives
/// this call, so borrowed captures are sound even though they cross a
/// thread boundary.
pub fn run_sync<F: FnOnce()>(work: F) {
    // SAFETY: pthread_main_np has no preconditions.
    if unsafe { libc::pthread_main_np() } != 0 {
        work();
        return;
    }

    let mut slot = Some(work);
    // SAFETY: dispatch_sync_f blocks until the trampoline has consumed the
    // slot; the stack frame outlives the call.
    unsafe {
        dispatch_sync_f(
            &_dispatch_main_q as *const u8,
            &mut slot as *mut Option<F> as *mut c_void,
            trampoline::<F>,
        );
    }
}
