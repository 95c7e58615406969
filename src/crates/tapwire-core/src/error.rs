//! Stable error taxonomy shared by the engine and its consumers.
//!
//! Every variant carries a stable numeric code so bindings and logs can
//! refer to failures across versions.  Codes are grouped: 0x2X for X11
//! setup, 0x3X for Windows setup, 0x4X for macOS setup.

use thiserror::Error;

/// Errors surfaced by hook setup, synthesis and text injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("unspecified hook failure")]
    Failure,
    #[error("allocation failed")]
    OutOfMemory,
    #[error("no text supplied for text injection")]
    EmptyText,

    #[error("could not connect to the X server")]
    XOpenDisplay,
    #[error("the X RECORD extension is not available")]
    XRecordNotFound,
    #[error("failed to allocate the X RECORD range")]
    XRecordAllocRange,
    #[error("failed to create the X RECORD context")]
    XRecordCreateContext,
    #[error("failed to enable the X RECORD context")]
    XRecordEnableContext,
    #[error("failed to query the X RECORD context")]
    XRecordGetContext,

    #[error("SetWindowsHookEx failed")]
    SetWindowsHookEx,
    #[error("could not resolve the module handle")]
    GetModuleHandle,
    #[error("failed to create the invisible message window")]
    CreateInvisibleWindow,

    #[error("the accessibility API is disabled; grant accessibility permission")]
    AxApiDisabled,
    #[error("failed to create the event tap")]
    CreateEventTap,
    #[error("failed to create the run-loop source")]
    CreateRunLoopSource,
    #[error("failed to acquire the run loop")]
    GetRunLoop,
    #[error("failed to create the run-loop observer")]
    CreateRunLoopObserver,
}

/// Numeric code for a successful operation.
pub const SUCCESS_CODE: u8 = 0x00;

impl HookError {
    /// Stable numeric code for this failure.
    pub const fn code(&self) -> u8 {
        match self {
            HookError::Failure => 0x01,
            HookError::OutOfMemory => 0x02,
            HookError::EmptyText => 0x03,

            HookError::XOpenDisplay => 0x20,
            HookError::XRecordNotFound => 0x21,
            HookError::XRecordAllocRange => 0x22,
            HookError::XRecordCreateContext => 0x23,
            HookError::XRecordEnableContext => 0x24,
            HookError::XRecordGetContext => 0x25,

            HookError::SetWindowsHookEx => 0x30,
            HookError::GetModuleHandle => 0x31,
            HookError::CreateInvisibleWindow => 0x32,

            HookError::AxApiDisabled => 0x40,
            HookError::CreateEventTap => 0x41,
            HookError::CreateRunLoopSource => 0x42,
            HookError::GetRunLoop => 0x43,
            HookError::CreateRunLoopObserver => 0x44,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        // Arrange: the published code table
        let table: &[(HookError, u8)] = &[
            (HookError::Failure, 0x01),
            (HookError::OutOfMemory, 0x02),
            (HookError::EmptyText, 0x03),
            (HookError::XOpenDisplay, 0x20),
            (HookError::XRecordNotFound, 0x21),
            (HookError::XRecordAllocRange, 0x22),
            (HookError::XRecordCreateContext, 0x23),
            (HookError::XRecordEnableContext, 0x24),
            (HookError::XRecordGetContext, 0x25),
            (HookError::SetWindowsHookEx, 0x30),
            (HookError::GetModuleHandle, 0x31),
            (HookError::CreateInvisibleWindow, 0x32),
            (HookError::AxApiDisabled, 0x40),
            (HookError::CreateEventTap, 0x41),
            (HookError::CreateRunLoopSource, 0x42),
            (HookError::GetRunLoop, 0x43),
            (HookError::CreateRunLoopObserver, 0x44),
        ];

        // Act / Assert
        for &(error, code) in table {
            assert_eq!(error.code(), code, "{error:?} should map to 0x{code:02X}");
        }
        assert_eq!(SUCCESS_CODE, 0x00);
    }

    #[test]
    fn test_display_messages_are_human_readable() {
        assert_eq!(
            HookError::XOpenDisplay.to_string(),
            "could not connect to the X server"
        );
        assert_eq!(HookError::SetWindowsHookEx.to_string(), "SetWindowsHookEx failed");
    }
}
