//! System input metrics and the minimal monitor report.
//!
//! Thin passthroughs over the platform settings APIs.  `None` means the
//! host does not expose the value (or the query failed); callers pick
//! their own defaults.

/// One monitor rectangle in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub number: u8,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

/// Keyboard auto-repeat rate (characters per second scale on Windows,
/// repeat interval in milliseconds on X11).
pub fn auto_repeat_rate() -> Option<i64> {
    platform::auto_repeat_rate()
}

/// Delay before keyboard auto-repeat starts, in milliseconds.
pub fn auto_repeat_delay() -> Option<i64> {
    platform::auto_repeat_delay()
}

/// Pointer acceleration multiplier.
pub fn pointer_acceleration_multiplier() -> Option<i64> {
    platform::pointer_acceleration_multiplier()
}

/// Pointer acceleration threshold.
pub fn pointer_acceleration_threshold() -> Option<i64> {
    platform::pointer_acceleration_threshold()
}

/// Pointer sensitivity.
pub fn pointer_sensitivity() -> Option<i64> {
    platform::pointer_sensitivity()
}

/// Double/triple-click interval in milliseconds.
pub fn multi_click_time() -> Option<i64> {
    platform::multi_click_time()
}

/// Monitor rectangles of the current session.
pub fn screen_info() -> Vec<ScreenInfo> {
    platform::screen_info()
}

#[cfg(target_os = "linux")]
mod platform {
    use super::ScreenInfo;
    use crate::synth::x11 as helper;

    pub fn auto_repeat_rate() -> Option<i64> {
        helper::auto_repeat().map(|(_, interval)| interval as i64)
    }

    pub fn auto_repeat_delay() -> Option<i64> {
        helper::auto_repeat().map(|(timeout, _)| timeout as i64)
    }

    pub fn pointer_acceleration_multiplier() -> Option<i64> {
        helper::pointer_control().map(|(numerator, denominator, _)| {
            if denominator != 0 {
                (numerator / denominator) as i64
            } else {
                numerator as i64
            }
        })
    }

    pub fn pointer_acceleration_threshold() -> Option<i64> {
        helper::pointer_control().map(|(_, _, threshold)| threshold as i64)
    }

    pub fn pointer_sensitivity() -> Option<i64> {
        helper::pointer_control().map(|(numerator, _, _)| numerator as i64)
    }

    pub fn multi_click_time() -> Option<i64> {
        // The core protocol has no multi-click interval; sessions fall back
        // to the engine default.
        None
    }

    pub fn screen_info() -> Vec<ScreenInfo> {
        match helper::display_size() {
            Some((width, height)) => vec![ScreenInfo {
                number: 0,
                x: 0,
                y: 0,
                width,
                height,
            }],
            None => Vec::new(),
        }
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use super::ScreenInfo;
    use std::ffi::c_void;

    use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
    use windows::Win32::Graphics::Gdi::{
        EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO,
    };
    use windows::Win32::UI::Input::KeyboardAndMouse::GetDoubleClickTime;
    use windows::Win32::UI::WindowsAndMessaging::{
        SystemParametersInfoW, SPI_GETKEYBOARDDELAY, SPI_GETKEYBOARDSPEED, SPI_GETMOUSE,
        SPI_GETMOUSESPEED, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
    };

    fn spi_u32(action: windows::Win32::UI::WindowsAndMessaging::SYSTEM_PARAMETERS_INFO_ACTION) -> Option<u32> {
        let mut value: u32 = 0;
        // SAFETY: value outlives the call; no update flags are set.
        unsafe {
            SystemParametersInfoW(
                action,
                0,
                Some(&mut value as *mut u32 as *mut c_void),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
            .ok()?;
        }
        Some(value)
    }

    pub fn auto_repeat_rate() -> Option<i64> {
        spi_u32(SPI_GETKEYBOARDSPEED).map(i64::from)
    }

    pub fn auto_repeat_delay() -> Option<i64> {
        spi_u32(SPI_GETKEYBOARDDELAY).map(i64::from)
    }

    fn mouse_params() -> Option<[i32; 3]> {
        let mut values = [0i32; 3];
        // SAFETY: the buffer is three ints as SPI_GETMOUSE requires.
        unsafe {
            SystemParametersInfoW(
                SPI_GETMOUSE,
                0,
                Some(values.as_mut_ptr() as *mut c_void),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
            .ok()?;
        }
        Some(values)
    }

    pub fn pointer_acceleration_multiplier() -> Option<i64> {
        mouse_params().map(|values| values[2] as i64)
    }

    pub fn pointer_acceleration_threshold() -> Option<i64> {
        mouse_params().map(|values| values[0] as i64)
    }

    pub fn pointer_sensitivity() -> Option<i64> {
        spi_u32(SPI_GETMOUSESPEED).map(i64::from)
    }

    pub fn multi_click_time() -> Option<i64> {
        // SAFETY: no arguments.
        Some(unsafe { GetDoubleClickTime() } as i64)
    }

    pub fn screen_info() -> Vec<ScreenInfo> {
        unsafe extern "system" fn collect(
            monitor: HMONITOR,
            _hdc: HDC,
            _rect: *mut RECT,
            lparam: LPARAM,
        ) -> BOOL {
            let screens = &mut *(lparam.0 as *mut Vec<ScreenInfo>);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if GetMonitorInfoW(monitor, &mut info).as_bool() {
                let rect = info.rcMonitor;
                screens.push(ScreenInfo {
                    number: screens.len() as u8,
                    x: rect.left as i16,
                    y: rect.top as i16,
                    width: (rect.right - rect.left) as u16,
                    height: (rect.bottom - rect.top) as u16,
                });
            }
            BOOL(1)
        }

        let mut screens: Vec<ScreenInfo> = Vec::new();
        // SAFETY: the callback only runs during this call; the vec outlives
        // it.
        unsafe {
            let _ = EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(collect),
                LPARAM(&mut screens as *mut Vec<ScreenInfo> as isize),
            );
        }
        screens
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::ScreenInfo;

    use core_graphics::display::CGDisplay;

    pub fn auto_repeat_rate() -> Option<i64> {
        // The modern API surface exposes repeat settings only through user
        // defaults; not queried here.
        None
    }

    pub fn auto_repeat_delay() -> Option<i64> {
        None
    }

    pub fn pointer_acceleration_multiplier() -> Option<i64> {
        None
    }

    pub fn pointer_acceleration_threshold() -> Option<i64> {
        None
    }

    pub fn pointer_sensitivity() -> Option<i64> {
        None
    }

    pub fn multi_click_time() -> Option<i64> {
        None
    }

    pub fn screen_info() -> Vec<ScreenInfo> {
        let mut screens = Vec::new();
        if let Ok(ids) = CGDisplay::active_displays() {
            for (index, id) in ids.into_iter().enumerate() {
                let bounds = CGDisplay::new(id).bounds();
                screens.push(ScreenInfo {
                    number: index as u8,
                    x: bounds.origin.x as i16,
                    y: bounds.origin.y as i16,
                    width: bounds.size.width as u16,
                    height: bounds.size.height as u16,
                });
            }
        }
        screens
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod platform {
    use super::ScreenInfo;

    pub fn auto_repeat_rate() -> Option<i64> {
        None
    }
    pub fn auto_repeat_delay() -> Option<i64> {
        None
    }
    pub fn pointer_acceleration_multiplier() -> Option<i64> {
        None
    }
    pub fn pointer_acceleration_threshold() -> Option<i64> {
        None
    }
    pub fn pointer_sensitivity() -> Option<i64> {
        None
    }
    pub fn multi_click_time() -> Option<i64> {
        None
    }
    pub fn screen_info() -> Vec<ScreenInfo> {
        Vec::new()
    }
}
