//! # tapwire-core
//!
//! Platform-independent foundation of the tapwire input hooking library:
//! the virtual event model, modifier masks, the key code translation
//! tables for Windows, macOS and X11, UTF-16 text plumbing, virtual-screen
//! coordinate math, and the stable error taxonomy.
//!
//! This crate has no OS dependencies; everything in it is exercised by unit
//! tests on every host.  The `tapwire-hook` crate layers the platform
//! capture backends, the dispatcher and the synthesis engine on top.
//!
//! - **`event`** – [`VirtualEvent`] and its payloads: the single
//!   normalized shape every native keyboard/mouse event is collapsed into
//!   before it reaches a dispatch handler, and the shape synthetic events
//!   are described in.
//! - **`keymap`** – the [`VirtualKey`] identifier space and the three
//!   native translation tables.
//! - **`text`** – UTF-16/UTF-8 conversion used by typed-character
//!   resolution and text injection.
//! - **`geometry`** – the `[0, 65535]` absolute coordinate normalization
//!   Windows mouse injection requires.
//! - **`error`** – [`HookError`] with stable numeric codes.

pub mod error;
pub mod event;
pub mod geometry;
pub mod keymap;
pub mod text;

pub use error::HookError;
pub use event::{
    EventKind, KeyboardData, ModifierMask, MouseData, VirtualEvent, WheelData, WheelDirection,
    WheelScroll,
};
pub use keymap::{KeyMapper, VirtualKey, XkbKeymap, CHAR_UNDEFINED};
