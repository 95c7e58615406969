//! Local declarations for the RECORD and XTest extensions and the Xkb
//! keyboard description.
//!
//! The symbols live in `libXtst`/`libX11`, which are linked directly; the
//! packaged bindings gate these behind pkg-config files (`xtst.pc`) that
//! many systems do not ship, so the handful of entry points the engine
//! needs is declared here instead.  Struct layouts follow `XKBstr.h` and
//! `record.h`.

#![allow(non_snake_case)]

use libc::{c_char, c_int, c_uchar, c_uint, c_ulong, c_ushort, c_void};
use x11::xlib::{Atom, Bool, Display, KeyCode, KeySym, Status, Time, XKeyEvent, XIC, XID};

pub const XKB_USE_CORE_KBD: c_uint = 0x0100;
pub const XKB_ALL_COMPONENTS_MASK: c_uint = 0xFF;
pub const XKB_ALL_NAMES_MASK: c_uint = 0x3FFF;

pub const XRECORD_FROM_SERVER: c_int = 0;
/// `XRecordAllClients` client spec.
pub const XRECORD_ALL_CLIENTS: XRecordClientSpec = 3;

pub type XRecordClientSpec = c_ulong;
pub type XRecordContext = c_ulong;

#[repr(C)]
pub struct XkbKeyNameRec {
    pub name: [c_char; 4],
}

#[repr(C)]
pub struct XkbKeyAliasRec {
    pub real: [c_char; 4],
    pub alias: [c_char; 4],
}

#[repr(C)]
pub struct XkbNamesRec {
    pub keycodes: Atom,
    pub geometry: Atom,
    pub symbols: Atom,
    pub types: Atom,
    pub compat: Atom,
    pub vmods: [Atom; 16],
    pub indicators: [Atom; 32],
    pub groups: [Atom; 4],
    pub keys: *mut XkbKeyNameRec,
    pub key_aliases: *mut XkbKeyAliasRec,
    pub radio_groups: *mut Atom,
    pub phys_symbols: Atom,
    pub num_keys: c_uchar,
    pub num_key_aliases: c_uchar,
    pub num_rg: c_ushort,
}

#[repr(C)]
pub struct XkbDescRec {
    pub dpy: *mut Display,
    pub flags: c_ushort,
    pub device_spec: c_ushort,
    pub min_key_code: KeyCode,
    pub max_key_code: KeyCode,
    pub ctrls: *mut c_void,
    pub server: *mut c_void,
    pub map: *mut c_void,
    pub indicators: *mut c_void,
    pub names: *mut XkbNamesRec,
    pub compat: *mut c_void,
    pub geom: *mut c_void,
}

#[repr(C)]
pub struct XRecordRange8 {
    pub first: c_uchar,
    pub last: c_uchar,
}

#[repr(C)]
pub struct XRecordRange16 {
    pub first: c_ushort,
    pub last: c_ushort,
}

#[repr(C)]
pub struct XRecordExtRange {
    pub ext_major: XRecordRange8,
    pub ext_minor: XRecordRange16,
}

#[repr(C)]
pub struct XRecordRange {
    pub core_requests: XRecordRange8,
    pub core_replies: XRecordRange8,
    pub ext_requests: XRecordExtRange,
    pub ext_replies: XRecordExtRange,
    pub delivered_events: XRecordRange8,
    pub device_events: XRecordRange8,
    pub errors: XRecordRange8,
    pub client_started: Bool,
    pub client_died: Bool,
}

#[repr(C)]
pub struct XRecordInterceptData {
    pub id_base: XID,
    pub server_time: Time,
    pub client_seq: c_ulong,
    pub category: c_int,
    pub client_swapped: Bool,
    pub data: *mut c_uchar,
    pub data_len: c_ulong,
}

pub type XRecordInterceptProc =
    unsafe extern "C" fn(closure: *mut c_char, data: *mut XRecordInterceptData);

#[link(name = "Xtst")]
extern "C" {
    pub fn XRecordQueryVersion(dpy: *mut Display, major: *mut c_int, minor: *mut c_int)
        -> Status;
    pub fn XRecordAllocRange() -> *mut XRecordRange;
    pub fn XRecordCreateContext(
        dpy: *mut Display,
        datum_flags: c_int,
        clients: *mut XRecordClientSpec,
        nclients: c_int,
        ranges: *mut *mut XRecordRange,
        nranges: c_int,
    ) -> XRecordContext;
    pub fn XRecordEnableContext(
        dpy: *mut Display,
        context: XRecordContext,
        callback: Option<XRecordInterceptProc>,
        closure: *mut c_char,
    ) -> Status;
    pub fn XRecordDisableContext(dpy: *mut Display, context: XRecordContext) -> Status;
    pub fn XRecordFreeContext(dpy: *mut Display, context: XRecordContext) -> Status;
    pub fn XRecordFreeData(data: *mut XRecordInterceptData);

    pub fn XTestFakeKeyEvent(
        dpy: *mut Display,
        keycode: c_uint,
        is_press: Bool,
        delay: c_ulong,
    ) -> c_int;
    pub fn XTestFakeButtonEvent(
        dpy: *mut Display,
        button: c_uint,
        is_press: Bool,
        delay: c_ulong,
    ) -> c_int;
    pub fn XTestFakeMotionEvent(
        dpy: *mut Display,
        screen: c_int,
        x: c_int,
        y: c_int,
        delay: c_ulong,
    ) -> c_int;
}

#[link(name = "X11")]
extern "C" {
    pub fn XkbGetMap(dpy: *mut Display, which: c_uint, device_spec: c_uint) -> *mut XkbDescRec;
    pub fn XkbGetNames(dpy: *mut Display, which: c_uint, desc: *mut XkbDescRec) -> Status;
    pub fn XkbFreeKeyboard(desc: *mut XkbDescRec, which: c_uint, free_all: Bool);
    pub fn XkbGetIndicatorState(
        dpy: *mut Display,
        device_spec: c_uint,
        state: *mut c_uint,
    ) -> Status;
    pub fn XkbGetAutoRepeatRate(
        dpy: *mut Display,
        device_spec: c_uint,
        timeout: *mut c_uint,
        interval: *mut c_uint,
    ) -> Bool;
    pub fn XkbSetDetectableAutoRepeat(
        dpy: *mut Display,
        detectable: Bool,
        supported: *mut Bool,
    ) -> Bool;

    // Declared in Xlib.h behind X_HAVE_UTF8_STRING.
    pub fn Xutf8LookupString(
        ic: XIC,
        event: *mut XKeyEvent,
        buffer_return: *mut c_char,
        bytes_buffer: c_int,
        keysym_return: *mut KeySym,
        status_return: *mut Status,
    ) -> c_int;
}
