//! Cached most-negative virtual-screen origin.
//!
//! Absolute mouse injection needs the distance between the virtual
//! desktop's top-left corner and the primary monitor's origin.  The cache
//! is filled lazily on first use and rescanned whenever the invisible
//! message window receives `WM_DISPLAYCHANGE`.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO};

static LEFT: AtomicI32 = AtomicI32::new(0);
static TOP: AtomicI32 = AtomicI32::new(0);
static ENUMERATED: AtomicBool = AtomicBool::new(false);

unsafe extern "system" fn visit_monitor(
    monitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    _lparam: LPARAM,
) -> BOOL {
    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    if GetMonitorInfoW(monitor, &mut info).as_bool() {
        LEFT.fetch_min(info.rcMonitor.left, Ordering::AcqRel);
        TOP.fetch_min(info.rcMonitor.top, Ordering::AcqRel);
    }
    BOOL(1)
}

/// Rescans the monitor arrangement.
///
/// The extents are reset first: a monitor that moved out of negative
/// space must not leave a stale offset behind.
pub fn refresh() {
    LEFT.store(0, Ordering::Release);
    TOP.store(0, Ordering::Release);

    // SAFETY: the callback touches only atomics.
    unsafe {
        let _ = EnumDisplayMonitors(HDC::default(), None, Some(visit_monitor), LPARAM(0));
    }
    ENUMERATED.store(true, Ordering::Release);
}

/// `(left, top)` of the most-negative monitor origin; `(0, 0)` when no
/// monitor extends into negative space.
pub fn largest_negative() -> (i32, i32) {
    if !ENUMERATED.load(Ordering::Acquire) {
        refresh();
    }
    (LEFT.load(Ordering::Acquire), TOP.load(Ordering::Acquire))
}
